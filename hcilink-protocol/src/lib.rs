//! HCI wire protocol
//!
//! This crate defines the packet layout spoken between the host and a
//! Bluetooth controller over its HCI link. Only the generic layers are
//! covered: the packet-type marker, command headers, and event headers.
//! Command-specific parameters are opaque byte slices.
//!
//! # Packet Overview
//!
//! Commands (host → controller):
//! ```text
//! ┌──────┬────────────┬──────┬─────────────┐
//! │ 0x01 │ OPCODE(LE) │ PLEN │ PARAMS      │
//! │ 1B   │ 2B         │ 1B   │ 0–255B      │
//! └──────┴────────────┴──────┴─────────────┘
//! ```
//!
//! Events (controller → host):
//! ```text
//! ┌──────┬──────┬──────┬─────────────┐
//! │ 0x04 │ CODE │ PLEN │ PARAMS      │
//! │ 1B   │ 1B   │ 1B   │ PLEN bytes  │
//! └──────┴──────┴──────┴─────────────┘
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod event;
pub mod packet;

pub use command::{CommandHeader, Opcode, MAX_PARAMS_SIZE};
pub use event::{Event, EventPacket};
pub use packet::{verify, PacketError, VerifyError, EVENT_PACKET, COMMAND_PACKET, PACKET_SIZE};
