//! Event packet views and header-level decoding
//!
//! Decoding stops at the generic layer: acknowledgement events expose the
//! echoed opcode and status, LE meta events their sub-event code, vendor
//! events their 16-bit event code. Everything past that stays raw bytes.

use crate::command::Opcode;
use crate::packet::{verify, PacketError, EVENT_PARAMS_OFFSET};

/// Event codes
pub mod code {
    /// Disconnection Complete
    pub const DISCONNECTION_COMPLETE: u8 = 0x05;
    /// Command Complete
    pub const COMMAND_COMPLETE: u8 = 0x0E;
    /// Command Status
    pub const COMMAND_STATUS: u8 = 0x0F;
    /// Hardware Error
    pub const HARDWARE_ERROR: u8 = 0x10;
    /// LE Meta (carries a sub-event code)
    pub const LE_META: u8 = 0x3E;
    /// Vendor specific
    pub const VENDOR: u8 = 0xFF;
}

/// Fixed fields of Command Complete before the return parameters
/// (ncmd + opcode)
pub const COMMAND_COMPLETE_HEADER_SIZE: usize = 3;

/// Size of Command Status parameters (status + ncmd + opcode)
pub const COMMAND_STATUS_SIZE: usize = 4;

/// Status value reported for success
pub const STATUS_SUCCESS: u8 = 0x00;

/// A verified event packet
///
/// Borrowed view over the raw bytes, including the type marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventPacket<'a> {
    raw: &'a [u8],
}

impl<'a> EventPacket<'a> {
    /// Verify `raw` and wrap it
    pub fn parse(raw: &'a [u8]) -> Result<Self, PacketError> {
        verify(raw)?;
        Ok(Self { raw })
    }

    /// Event code
    pub fn code(&self) -> u8 {
        self.raw[1]
    }

    /// Event parameters (everything after marker and header)
    pub fn params(&self) -> &'a [u8] {
        &self.raw[EVENT_PARAMS_OFFSET..]
    }

    /// Raw packet bytes including the type marker
    pub fn raw(&self) -> &'a [u8] {
        self.raw
    }

    /// Decode the event header fields
    pub fn decode(&self) -> Result<Event<'a>, PacketError> {
        Event::decode(self.code(), self.params())
    }
}

/// Header-level view of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event<'a> {
    /// A command finished; `return_params` are command specific
    CommandComplete {
        ncmd: u8,
        opcode: Opcode,
        return_params: &'a [u8],
    },
    /// A command was accepted or rejected
    CommandStatus { status: u8, ncmd: u8, opcode: Opcode },
    /// LE sub-event
    LeMeta { subevent: u8, data: &'a [u8] },
    /// Controller hardware failure
    HardwareError { code: u8 },
    /// Vendor-specific event
    Vendor { ecode: u16, data: &'a [u8] },
    /// Any other event code
    Other { code: u8, params: &'a [u8] },
}

impl<'a> Event<'a> {
    /// Decode an event from its code and parameters
    pub fn decode(event_code: u8, params: &'a [u8]) -> Result<Self, PacketError> {
        match event_code {
            code::COMMAND_COMPLETE => {
                if params.len() < COMMAND_COMPLETE_HEADER_SIZE {
                    return Err(PacketError::Truncated);
                }
                Ok(Event::CommandComplete {
                    ncmd: params[0],
                    opcode: Opcode::from_le_bytes([params[1], params[2]]),
                    return_params: &params[COMMAND_COMPLETE_HEADER_SIZE..],
                })
            }
            code::COMMAND_STATUS => {
                if params.len() < COMMAND_STATUS_SIZE {
                    return Err(PacketError::Truncated);
                }
                Ok(Event::CommandStatus {
                    status: params[0],
                    ncmd: params[1],
                    opcode: Opcode::from_le_bytes([params[2], params[3]]),
                })
            }
            code::LE_META => {
                let (&subevent, data) = params.split_first().ok_or(PacketError::Truncated)?;
                Ok(Event::LeMeta { subevent, data })
            }
            code::HARDWARE_ERROR => {
                let &code = params.first().ok_or(PacketError::Truncated)?;
                Ok(Event::HardwareError { code })
            }
            code::VENDOR => {
                if params.len() < 2 {
                    return Err(PacketError::Truncated);
                }
                Ok(Event::Vendor {
                    ecode: u16::from_le_bytes([params[0], params[1]]),
                    data: &params[2..],
                })
            }
            code => Ok(Event::Other { code, params }),
        }
    }

    /// Opcode echoed by acknowledgement events
    pub fn opcode(&self) -> Option<Opcode> {
        match self {
            Event::CommandComplete { opcode, .. } | Event::CommandStatus { opcode, .. } => {
                Some(*opcode)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::VerifyError;

    #[test]
    fn test_parse_command_complete() {
        let raw = [0x04, 0x0E, 0x07, 0x01, 0x02, 0x04, 0xAA, 0xBB, 0xCC, 0xDD];
        let packet = EventPacket::parse(&raw).unwrap();
        assert_eq!(packet.code(), code::COMMAND_COMPLETE);
        assert_eq!(packet.params(), &raw[3..]);
        assert_eq!(
            packet.decode().unwrap(),
            Event::CommandComplete {
                ncmd: 1,
                opcode: Opcode::new(0x01, 0x02),
                return_params: &[0xAA, 0xBB, 0xCC, 0xDD],
            }
        );
    }

    #[test]
    fn test_parse_command_status() {
        let raw = [0x04, 0x0F, 0x04, 0x01, 0x01, 0x02, 0x04];
        let event = EventPacket::parse(&raw).unwrap().decode().unwrap();
        assert_eq!(
            event,
            Event::CommandStatus {
                status: 0x01,
                ncmd: 1,
                opcode: Opcode::new(0x01, 0x02),
            }
        );
        assert_eq!(event.opcode(), Some(Opcode::new(0x01, 0x02)));
    }

    #[test]
    fn test_parse_le_meta() {
        // LE Connection Complete sub-event with two data bytes
        let raw = [0x04, 0x3E, 0x03, 0x01, 0x00, 0x40];
        let event = EventPacket::parse(&raw).unwrap().decode().unwrap();
        assert_eq!(event, Event::LeMeta { subevent: 0x01, data: &[0x00, 0x40] });
        assert_eq!(event.opcode(), None);
    }

    #[test]
    fn test_parse_vendor() {
        let raw = [0x04, 0xFF, 0x04, 0x01, 0x0C, 0x10, 0x00];
        let event = EventPacket::parse(&raw).unwrap().decode().unwrap();
        assert_eq!(event, Event::Vendor { ecode: 0x0C01, data: &[0x10, 0x00] });
    }

    #[test]
    fn test_parse_other() {
        let raw = [0x04, code::DISCONNECTION_COMPLETE, 0x04, 0x00, 0x40, 0x00, 0x13];
        let event = EventPacket::parse(&raw).unwrap().decode().unwrap();
        assert_eq!(
            event,
            Event::Other {
                code: code::DISCONNECTION_COMPLETE,
                params: &[0x00, 0x40, 0x00, 0x13],
            }
        );
    }

    #[test]
    fn test_truncated_acknowledgements() {
        let raw = [0x04, 0x0E, 0x02, 0x01, 0x02];
        assert_eq!(EventPacket::parse(&raw).unwrap().decode(), Err(PacketError::Truncated));

        let raw = [0x04, 0x0F, 0x03, 0x00, 0x01, 0x02];
        assert_eq!(EventPacket::parse(&raw).unwrap().decode(), Err(PacketError::Truncated));

        let raw = [0x04, 0x3E, 0x00];
        assert_eq!(EventPacket::parse(&raw).unwrap().decode(), Err(PacketError::Truncated));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(
            EventPacket::parse(&[0x02, 0x0E, 0x00]),
            Err(PacketError::Invalid(VerifyError::WrongType))
        );
        assert_eq!(
            EventPacket::parse(&[0x04, 0x0E, 0x05, 0x00]),
            Err(PacketError::Invalid(VerifyError::LengthMismatch))
        );
    }
}
