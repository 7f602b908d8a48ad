//! Host-side HCI transport core
//!
//! This crate sits between a Bluetooth controller's packet transport and
//! the host stack above it:
//!
//! - Fixed pool of receive buffers and a FIFO receive queue
//! - Reader task that drains the controller when the data-ready line fires
//! - Synchronous command/response engine with timeouts
//! - Generic drain of unsolicited events
//!
//! # Usage
//!
//! ```ignore
//! static HCI: StaticCell<Hci<CriticalSectionRawMutex, SpiLink, ExtiLine>> = StaticCell::new();
//! let hci = HCI.init(Hci::new(link, line, HciConfig::default()));
//!
//! // Data-ready IRQ: hci.on_hardware_signal()
//! spawner.must_spawn(reader(hci.initialize().unwrap()));
//!
//! let mut version = [0u8; 8];
//! let n = hci.send_request(&Request::new(READ_LOCAL_VERSION, &[]), &mut version)?;
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

mod trace;

pub mod config;
pub mod deadline;
pub mod drain;
pub mod error;
pub mod hci;
pub mod pool;
pub mod reader;
pub mod request;

pub use config::HciConfig;
pub use deadline::Deadline;
pub use drain::EventHandler;
pub use error::HciError;
pub use hci::Hci;
pub use pool::{PoolStats, DEFAULT_POOL_SIZE};
pub use reader::{DrainStop, HciReader};
pub use request::{Expect, Request};

pub use hcilink_hal as hal;
pub use hcilink_protocol as protocol;
