//! Reader task
//!
//! The reader is the only consumer of the transport's receive side. It
//! sleeps on the wake signal and, once woken, drains the controller:
//!
//! ```text
//!            wake signal
//!   WAITING ─────────────▶ DRAINING ──┐ data available, buffer free:
//!      ▲                      │  ▲     │ read, verify, queue or recycle
//!      │  no data / no buffer │  └─────┘
//!      └──────────────────────┘
//! ```
//!
//! Read failures and malformed packets end or skip a cycle without being
//! reported upward; the next wake retries.

use embassy_sync::blocking_mutex::raw::RawMutex;

use hcilink_hal::{HciTransport, NotificationLine};
use hcilink_protocol::{verify, PACKET_SIZE};

use crate::hci::Hci;
use crate::trace::{debug, info, trace, warn};

/// Why a drain cycle stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DrainStop {
    /// Controller has nothing more to send
    Idle,
    /// Every buffer is queued or in use
    PoolExhausted,
    /// Transport returned an error or no bytes
    ReadFailed,
}

/// Handle to the single reader task, obtained from [`Hci::initialize`]
pub struct HciReader<'a, M: RawMutex, T, L, const N: usize> {
    hci: &'a Hci<M, T, L, N>,
}

impl<'a, M, T, L, const N: usize> HciReader<'a, M, T, L, N>
where
    M: RawMutex,
    T: HciTransport,
    L: NotificationLine,
{
    pub(crate) fn new(hci: &'a Hci<M, T, L, N>) -> Self {
        Self { hci }
    }

    /// Run the reader; never returns
    ///
    /// Spawn this on an executor that can preempt request callers (an
    /// interrupt executor or a higher-priority thread), since
    /// [`Hci::send_request`] spins while it waits for the reader.
    pub async fn run(self) {
        info!("HCI reader started");
        loop {
            self.hci.wake.wait().await;
            let stop = self.hci.drain_cycle();
            trace!("HCI drain cycle stopped: {:?}", stop);
        }
    }

    /// Service a pending wake without waiting
    ///
    /// Returns `None` when no wake was pending.
    pub fn poll(&self) -> Option<DrainStop> {
        self.hci.wake.try_take().map(|()| self.hci.drain_cycle())
    }
}

impl<M, T, L, const N: usize> Hci<M, T, L, N>
where
    M: RawMutex,
    T: HciTransport,
    L: NotificationLine,
{
    /// Read everything the controller has, or until buffers run out
    pub(crate) fn drain_cycle(&self) -> DrainStop {
        let mut scratch = [0u8; PACKET_SIZE];

        while self.with_transport(|transport| transport.data_available()) {
            let mut handle = match self.with_packets(|packets| packets.acquire()) {
                Ok(handle) => handle,
                Err(_) => {
                    debug!("HCI packet pool exhausted, pausing reads");
                    return DrainStop::PoolExhausted;
                }
            };

            let len = match self.with_transport(|transport| transport.read_packet(&mut scratch)) {
                Ok(len) if len > 0 => len.min(PACKET_SIZE),
                _ => {
                    self.with_packets(|packets| packets.release(handle));
                    return DrainStop::ReadFailed;
                }
            };

            let bytes = &scratch[..len];
            let verdict = verify(bytes);
            self.with_packets(|packets| {
                if verdict.is_ok() {
                    packets.packet_mut(&mut handle).fill(bytes);
                    packets.enqueue(handle);
                } else {
                    packets.release(handle);
                }
            });

            if let Err(e) = verdict {
                warn!("HCI dropped malformed packet: {:?}", e);
            }
        }

        DrainStop::Idle
    }
}
