//! Generic event consumption
//!
//! Packets left in the receive queue (unsolicited events, and anything a
//! request set aside) are handed to the application here, oldest first.

use embassy_sync::blocking_mutex::raw::RawMutex;

use hcilink_hal::{HciTransport, NotificationLine};
use hcilink_protocol::EventPacket;

use crate::hci::Hci;
use crate::pool::Packet;
use crate::trace::warn;

/// Application-side event consumer
pub trait EventHandler {
    /// Handle one event; may take as long as it likes
    fn on_event(&mut self, event: EventPacket<'_>);
}

impl<M, T, L, const N: usize> Hci<M, T, L, N>
where
    M: RawMutex,
    T: HciTransport,
    L: NotificationLine,
{
    /// Pass every queued event to `consumer`, then re-service the line
    ///
    /// The consumer runs with notifications enabled; the buffer stays out
    /// of the pool until it returns.
    pub fn drain_events(&self, mut consumer: impl FnMut(EventPacket<'_>)) {
        let mut packet = Packet::EMPTY;

        loop {
            let handle = self.with_packets(|packets| {
                let handle = packets.dequeue().ok()?;
                packet.clone_from(packets.packet(&handle));
                Some(handle)
            });
            let Some(handle) = handle else {
                break;
            };

            match EventPacket::parse(packet.as_bytes()) {
                Ok(event) => consumer(event),
                Err(e) => warn!("HCI queued packet failed to parse: {:?}", e),
            }

            self.with_packets(|packets| packets.release(handle));
        }

        self.service_pending();
    }

    /// [`Hci::drain_events`] with a handler object
    pub fn dispatch_events<H: EventHandler + ?Sized>(&self, handler: &mut H) {
        self.drain_events(|event| handler.on_event(event));
    }
}
