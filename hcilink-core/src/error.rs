//! Error types for the HCI core

use hcilink_protocol::{PacketError, VerifyError};

/// Errors reported by the HCI core
///
/// Only the request-level variants (`ProtocolMismatch`, `DeviceError`,
/// `DeviceFatal`, `Timeout`, `PayloadTooLarge`, `Transport`) ever reach a
/// caller of [`crate::Hci::send_request`]. The pool, queue, and validation
/// variants are handled inside the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HciError {
    /// No free buffer in the packet pool
    PoolExhausted,
    /// Receive queue has no packets
    QueueEmpty,
    /// Received packet is malformed
    ValidationFailed(VerifyError),
    /// Controller acknowledged a different opcode than the one sent
    ProtocolMismatch,
    /// Controller rejected the command with this status
    DeviceError(u8),
    /// Controller reported a hardware error
    DeviceFatal,
    /// No matching response before the deadline
    Timeout,
    /// Command parameters exceed 255 bytes
    PayloadTooLarge,
    /// Command could not be written to the transport
    Transport,
}

impl From<VerifyError> for HciError {
    fn from(e: VerifyError) -> Self {
        HciError::ValidationFailed(e)
    }
}

impl From<PacketError> for HciError {
    fn from(e: PacketError) -> Self {
        match e {
            PacketError::PayloadTooLarge => HciError::PayloadTooLarge,
            PacketError::Invalid(v) => HciError::ValidationFailed(v),
            PacketError::Truncated => HciError::ValidationFailed(VerifyError::LengthMismatch),
        }
    }
}
