//! Synchronous command/response engine
//!
//! A request sends one command and then takes packets off the receive
//! queue until one of them answers it. Packets that are not the answer are
//! moved to a holding queue and put back at the head of the receive queue,
//! in their original order, when the request ends.
//!
//! Classification of each dequeued packet:
//!
//! | Event            | Outcome                                              |
//! |------------------|------------------------------------------------------|
//! | Command Status   | wrong opcode: `ProtocolMismatch`; awaited: copy;     |
//! |                  | failure status: `DeviceError`; success: set aside    |
//! | Command Complete | wrong opcode: `ProtocolMismatch`; else copy          |
//! | LE Meta          | awaited sub-event: copy; else set aside              |
//! | Hardware Error   | `DeviceFatal`                                        |
//! | anything else    | set aside                                            |

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::Duration;

use hcilink_hal::{HciTransport, NotificationLine};
use hcilink_protocol::event::{code, STATUS_SUCCESS};
use hcilink_protocol::{Event, EventPacket, Opcode};

use crate::deadline::Deadline;
use crate::error::HciError;
use crate::hci::Hci;
use crate::pool::{Packet, PacketList};
use crate::trace::{debug, error, trace, warn};

/// Which event completes a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Expect {
    /// Command Complete carrying the return parameters
    CommandComplete,
    /// Command Status (for commands that complete later via another event)
    CommandStatus,
    /// LE Meta event with this sub-event code
    LeMeta(u8),
}

/// One command and how to recognise its answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request<'a> {
    /// Command opcode
    pub opcode: Opcode,
    /// Command parameters
    pub params: &'a [u8],
    /// Event that answers the command
    pub expect: Expect,
    /// Send and return without waiting
    pub asynchronous: bool,
    /// Response timeout; `None` uses the configured default
    pub timeout: Option<Duration>,
}

impl<'a> Request<'a> {
    /// Request answered by Command Complete, default timeout
    pub fn new(opcode: Opcode, params: &'a [u8]) -> Self {
        Self {
            opcode,
            params,
            expect: Expect::CommandComplete,
            asynchronous: false,
            timeout: None,
        }
    }

    /// Wait for `expect` instead of Command Complete
    pub fn expect(mut self, expect: Expect) -> Self {
        self.expect = expect;
        self
    }

    /// Override the response timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Fire and forget
    pub fn asynchronous(mut self) -> Self {
        self.asynchronous = true;
        self
    }
}

/// Result of inspecting one dequeued packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    /// Packet answers the request
    Answer(Result<usize, HciError>),
    /// Packet belongs to someone else
    Unrelated,
}

/// What the poll loop does next
enum Step {
    Finished(Result<usize, HciError>),
    SetAside,
    /// Queue was drained by another consumer between peek and take
    Raced,
}

/// Copy as much of `src` as fits; the rest is dropped
fn copy_truncated(dst: &mut [u8], src: &[u8]) -> usize {
    let len = dst.len().min(src.len());
    dst[..len].copy_from_slice(&src[..len]);
    len
}

/// Decide whether `packet` answers `request`, copying the answer out
fn classify(packet: &Packet, request: &Request<'_>, response: &mut [u8]) -> Verdict {
    let Ok(packet) = EventPacket::parse(packet.as_bytes()) else {
        return Verdict::Unrelated;
    };
    // Fatal whatever its parameters say, even with none
    if packet.code() == code::HARDWARE_ERROR {
        return Verdict::Answer(Err(HciError::DeviceFatal));
    }
    let Ok(event) = packet.decode() else {
        return Verdict::Unrelated;
    };

    match event {
        Event::CommandStatus { status, opcode, .. } => {
            if opcode != request.opcode {
                Verdict::Answer(Err(HciError::ProtocolMismatch))
            } else if request.expect == Expect::CommandStatus {
                Verdict::Answer(Ok(copy_truncated(response, packet.params())))
            } else if status != STATUS_SUCCESS {
                Verdict::Answer(Err(HciError::DeviceError(status)))
            } else {
                Verdict::Unrelated
            }
        }
        Event::CommandComplete {
            opcode,
            return_params,
            ..
        } => {
            if opcode != request.opcode {
                Verdict::Answer(Err(HciError::ProtocolMismatch))
            } else {
                Verdict::Answer(Ok(copy_truncated(response, return_params)))
            }
        }
        Event::LeMeta { subevent, data } if request.expect == Expect::LeMeta(subevent) => {
            Verdict::Answer(Ok(copy_truncated(response, data)))
        }
        _ => Verdict::Unrelated,
    }
}

/// Packets a request has set aside
///
/// Dropping it splices them back onto the head of the receive queue, so
/// every exit from the poll loop restores them.
struct HoldingQueue<'a, M: RawMutex, T, L, const N: usize>
where
    T: HciTransport,
    L: NotificationLine,
{
    hci: &'a Hci<M, T, L, N>,
    list: PacketList,
}

impl<M: RawMutex, T: HciTransport, L: NotificationLine, const N: usize> Drop
    for HoldingQueue<'_, M, T, L, N>
{
    fn drop(&mut self) {
        if self.list.is_empty() {
            return;
        }
        let list = core::mem::take(&mut self.list);
        self.hci.with_packets(|packets| packets.restore_front(list));
    }
}

impl<M, T, L, const N: usize> Hci<M, T, L, N>
where
    M: RawMutex,
    T: HciTransport,
    L: NotificationLine,
{
    /// Send a command and wait for its answer
    ///
    /// On success returns the number of bytes copied into `response`:
    /// `min(response.len(), available)`. Longer answers are truncated
    /// silently. `response` contents are unspecified on error.
    ///
    /// Asynchronous requests return `Ok(0)` once the command is written.
    pub fn send_request(&self, request: &Request<'_>, response: &mut [u8]) -> Result<usize, HciError> {
        self.reserve_free_packets();
        self.send_command(request.opcode, request.params)?;

        if request.asynchronous {
            return Ok(0);
        }

        let timeout = request
            .timeout
            .unwrap_or_else(|| self.config.default_timeout());
        let deadline = Deadline::after(timeout);
        let mut held = HoldingQueue {
            hci: self,
            list: PacketList::new(),
        };

        loop {
            if !self.wait_for_packet(&deadline) {
                warn!("HCI request {:04x} timed out", request.opcode.raw());
                return Err(HciError::Timeout);
            }

            let step = self.with_packets(|packets| {
                let Ok(handle) = packets.dequeue() else {
                    return Step::Raced;
                };

                match classify(packets.packet(&handle), request, response) {
                    Verdict::Answer(result) => {
                        packets.release(handle);
                        Step::Finished(result)
                    }
                    Verdict::Unrelated => {
                        if packets.is_pool_empty() && packets.is_queue_empty() {
                            // Nowhere left to keep it without starving the reader
                            packets.release(handle);
                        } else {
                            packets.hold(&mut held.list, handle);
                        }
                        Step::SetAside
                    }
                }
            });

            match step {
                Step::Finished(Ok(len)) => {
                    trace!("HCI request {:04x} answered, {} bytes", request.opcode.raw(), len);
                    return Ok(len);
                }
                Step::Finished(Err(e)) => {
                    if e == HciError::DeviceFatal {
                        error!("HCI controller hardware error");
                    } else {
                        warn!("HCI request {:04x} failed: {:?}", request.opcode.raw(), e);
                    }
                    return Err(e);
                }
                Step::SetAside => self.service_pending(),
                Step::Raced => {}
            }
        }
    }

    /// Spin until the queue has a packet or the deadline passes
    fn wait_for_packet(&self, deadline: &Deadline) -> bool {
        loop {
            if deadline.expired() {
                return false;
            }
            if !self.queue_is_empty() {
                return true;
            }
            core::hint::spin_loop();
        }
    }

    /// Evict the oldest queued events until enough buffers are free
    ///
    /// Guarantees the reader somewhere to put the answer even when the
    /// queue is full of backlog.
    fn reserve_free_packets(&self) {
        let target = self.config.reserve_for(N);
        let evicted = self.with_packets(|packets| {
            let mut evicted = 0usize;
            while packets.pool_len() < target {
                let Ok(handle) = packets.dequeue() else {
                    break;
                };
                packets.release(handle);
                evicted += 1;
            }
            evicted
        });

        if evicted > 0 {
            debug!("HCI evicted {} queued events before request", evicted);
            self.service_pending();
        }
    }
}
