//! hcilink Hardware Abstraction Layer
//!
//! This crate defines the two interfaces the HCI host core needs from the
//! board: a packet transport (typically SPI with a data-ready line) and a
//! way to mask that line's interrupt while shared state is being touched.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  hcilink-core (pool, reader, requests)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  hcilink-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ SPI transport │       │  EXTI / NVIC  │
//! │  (board BSP)  │       │   IRQ mask    │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`transport::HciTransport`] - Packet read/write over the link
//! - [`line::NotificationLine`] - Data-ready interrupt suppression

#![no_std]
#![deny(unsafe_code)]

pub mod line;
pub mod transport;

pub use line::{Masked, NotificationLine};
pub use transport::HciTransport;
