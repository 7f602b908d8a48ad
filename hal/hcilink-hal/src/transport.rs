//! Packet transport abstraction
//!
//! The transport moves whole HCI packets between host and controller. How a
//! packet is framed on the physical bus (SPI header handshakes, wake-up
//! sequences, UART H4 bytes) is the implementation's business.

/// Packet-oriented link to the controller
///
/// All methods take `&mut self`; the core serializes access, so
/// implementations do not need interior mutability.
pub trait HciTransport {
    /// Error type for transport operations
    type Error;

    /// Check whether the controller has data waiting to be read
    ///
    /// On SPI controllers this is usually the level of the IRQ pin.
    fn data_available(&mut self) -> bool;

    /// Read one packet into `buf`
    ///
    /// Returns the number of bytes read. `Ok(0)` means nothing could be
    /// read this time (bus busy, controller asleep) and is not an error.
    fn read_packet(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write one packet made of a header and a payload
    ///
    /// The two halves are sent back to back as a single packet so the
    /// caller does not need to assemble them in a scratch buffer.
    fn write(&mut self, header: &[u8], payload: &[u8]) -> Result<(), Self::Error>;
}

impl<T: HciTransport + ?Sized> HciTransport for &mut T {
    type Error = T::Error;

    fn data_available(&mut self) -> bool {
        T::data_available(self)
    }

    fn read_packet(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        T::read_packet(self, buf)
    }

    fn write(&mut self, header: &[u8], payload: &[u8]) -> Result<(), Self::Error> {
        T::write(self, header, payload)
    }
}
