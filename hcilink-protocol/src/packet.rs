//! Packet framing constants and receive-side verification.
//!
//! Every packet starts with a one-byte type marker. Events then carry a
//! two-byte header (event code, parameter length) followed by exactly
//! `length` parameter bytes.

/// Packet type marker: HCI command (host → controller)
pub const COMMAND_PACKET: u8 = 0x01;

/// Packet type marker: HCI event (controller → host)
pub const EVENT_PACKET: u8 = 0x04;

/// Size of the packet type marker
pub const PACKET_TYPE_SIZE: usize = 1;

/// Event header size (event code + parameter length)
pub const EVENT_HEADER_SIZE: usize = 2;

/// Command header size (opcode + parameter length)
pub const COMMAND_HEADER_SIZE: usize = 3;

/// Size of each receive buffer
pub const PACKET_SIZE: usize = 128;

/// Offset of the packet type marker
const TYPE_OFFSET: usize = 0;

/// Offset of the event parameter length
const PARAM_LEN_OFFSET: usize = 2;

/// Offset where event parameters start
pub const EVENT_PARAMS_OFFSET: usize = PACKET_TYPE_SIZE + EVENT_HEADER_SIZE;

/// Reasons a received packet fails verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VerifyError {
    /// First byte is not the event marker
    WrongType,
    /// Declared parameter length disagrees with the bytes received
    LengthMismatch,
}

/// Errors that can occur while encoding or decoding packets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacketError {
    /// Command parameters exceed 255 bytes
    PayloadTooLarge,
    /// Packet failed framing checks
    Invalid(VerifyError),
    /// Event parameters too short for the event's fixed fields
    Truncated,
}

impl From<VerifyError> for PacketError {
    fn from(e: VerifyError) -> Self {
        PacketError::Invalid(e)
    }
}

/// Verify that a received packet is a well-formed event
///
/// The packet must start with [`EVENT_PACKET`] and its declared parameter
/// length must equal `packet.len() - 3`. A packet too short to carry the
/// length byte counts as a length mismatch.
pub fn verify(packet: &[u8]) -> Result<(), VerifyError> {
    if packet.get(TYPE_OFFSET) != Some(&EVENT_PACKET) {
        return Err(VerifyError::WrongType);
    }

    let declared = packet
        .get(PARAM_LEN_OFFSET)
        .copied()
        .ok_or(VerifyError::LengthMismatch)? as usize;

    if declared != packet.len() - EVENT_PARAMS_OFFSET {
        return Err(VerifyError::LengthMismatch);
    }

    Ok(())
}
