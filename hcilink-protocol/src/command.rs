//! Command opcodes and command packet encoding
//!
//! An opcode packs the 6-bit opcode group (OGF) and the 10-bit command
//! field (OCF) into 16 bits: `(ogf << 10) | ocf`. It travels little-endian.

use crate::packet::{PacketError, COMMAND_HEADER_SIZE, COMMAND_PACKET, PACKET_TYPE_SIZE};

/// Maximum command parameter length (fits the one-byte PLEN field)
pub const MAX_PARAMS_SIZE: usize = 255;

/// Size of the type marker plus command header
pub const COMMAND_PREFIX_SIZE: usize = PACKET_TYPE_SIZE + COMMAND_HEADER_SIZE;

const OCF_MASK: u16 = 0x03FF;

/// Packed command opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Opcode(u16);

impl Opcode {
    /// Build an opcode from its group and command fields
    ///
    /// OCF bits above the low ten are dropped, OGF bits above the low six
    /// shift out of the word.
    pub const fn new(ogf: u16, ocf: u16) -> Self {
        Self((ocf & OCF_MASK) | (ogf << 10))
    }

    /// Decode an opcode echoed in an event (little-endian)
    pub const fn from_le_bytes(bytes: [u8; 2]) -> Self {
        Self(u16::from_le_bytes(bytes))
    }

    /// Opcode group field
    pub const fn ogf(self) -> u16 {
        self.0 >> 10
    }

    /// Opcode command field
    pub const fn ocf(self) -> u16 {
        self.0 & OCF_MASK
    }

    /// Packed 16-bit value
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Wire representation
    pub const fn to_le_bytes(self) -> [u8; 2] {
        self.0.to_le_bytes()
    }
}

/// Header preceding command parameters on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandHeader {
    /// Command opcode
    pub opcode: Opcode,
    /// Parameter length
    pub plen: u8,
}

impl CommandHeader {
    /// Create a header for `params`
    pub fn new(opcode: Opcode, params: &[u8]) -> Result<Self, PacketError> {
        let plen = u8::try_from(params.len()).map_err(|_| PacketError::PayloadTooLarge)?;
        Ok(Self { opcode, plen })
    }

    /// Encode the type marker and header
    ///
    /// Parameters follow separately so they can be written straight from
    /// the caller's slice.
    pub fn encode(&self) -> [u8; COMMAND_PREFIX_SIZE] {
        let [lo, hi] = self.opcode.to_le_bytes();
        [COMMAND_PACKET, lo, hi, self.plen]
    }
}
