//! The HCI context object
//!
//! [`Hci`] owns the packet pool, the receive queue, the transport, and the
//! reader's wake signal. It is created once and shared by reference with
//! the interrupt handler, the reader task, and every caller.
//!
//! # Synchronization
//!
//! - Pool and queue are only touched inside [`Hci::with_packets`], which
//!   masks the data-ready interrupt and then takes the `M` lock.
//! - The transport has its own `M` lock and is never used with the
//!   interrupt masked.
//! - The interrupt handler only calls [`Hci::on_hardware_signal`].
//!
//! `M` is the caller-side mutual exclusion. Use `NoopRawMutex` when only
//! one task issues commands, `CriticalSectionRawMutex` when several
//! threads or executors may.
//!
//! The transport lock uses the same `M`. With `CriticalSectionRawMutex`
//! that means every `read_packet` and `write` runs inside a global
//! critical section, with all interrupts disabled for the length of the
//! bus transfer, not only the data-ready line. Keep transfers short, or
//! use `NoopRawMutex` with a single command-issuing task.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use portable_atomic::{AtomicBool, Ordering};

use hcilink_hal::{HciTransport, NotificationLine};
use hcilink_protocol::{CommandHeader, Opcode};

use crate::config::HciConfig;
use crate::error::HciError;
use crate::pool::{PacketStore, PoolStats, DEFAULT_POOL_SIZE};
use crate::reader::HciReader;
use crate::trace::{debug, trace, warn};

/// HCI transport and command/response core
///
/// See the module docs for what `M` locks and for how long.
pub struct Hci<M: RawMutex, T, L, const N: usize = DEFAULT_POOL_SIZE> {
    pub(crate) line: L,
    pub(crate) transport: Mutex<M, RefCell<T>>,
    pub(crate) packets: Mutex<M, RefCell<PacketStore<N>>>,
    pub(crate) wake: Signal<M, ()>,
    reader_started: AtomicBool,
    pub(crate) config: HciConfig,
}

impl<M, T, L, const N: usize> Hci<M, T, L, N>
where
    M: RawMutex,
    T: HciTransport,
    L: NotificationLine,
{
    /// Create the core with every buffer free and the queue empty
    pub fn new(transport: T, line: L, config: HciConfig) -> Self {
        Self {
            line,
            transport: Mutex::new(RefCell::new(transport)),
            packets: Mutex::new(RefCell::new(PacketStore::new())),
            wake: Signal::new(),
            reader_started: AtomicBool::new(false),
            config,
        }
    }

    /// Hand out the reader task
    ///
    /// Returns `Some` on the first call only. Later calls return `None`
    /// and leave the pool and queue untouched, so calling this from more
    /// than one init path cannot start a second reader.
    pub fn initialize(&self) -> Option<HciReader<'_, M, T, L, N>> {
        if self.reader_started.swap(true, Ordering::AcqRel) {
            debug!("HCI reader already started");
            return None;
        }
        Some(HciReader::new(self))
    }

    /// Data-ready interrupt entry point
    ///
    /// Safe to call from interrupt context: it never blocks and performs no
    /// I/O. Bursts of calls before the reader runs collapse into one wake.
    pub fn on_hardware_signal(&self) {
        self.wake.signal(());
    }

    /// Re-service the data-ready line from task context
    ///
    /// A level-triggered line that stayed high while the pool was empty
    /// will not interrupt again; this wakes the reader so it looks anyway.
    pub fn service_pending(&self) {
        self.wake.signal(());
    }

    /// Check if the receive queue is empty
    pub fn queue_is_empty(&self) -> bool {
        self.with_packets(|packets| packets.is_queue_empty())
    }

    /// Current pool and queue occupancy
    pub fn stats(&self) -> PoolStats {
        self.with_packets(|packets| packets.stats())
    }

    /// Active configuration
    pub fn config(&self) -> &HciConfig {
        &self.config
    }

    /// Send a command without waiting for any response
    pub fn send_command(&self, opcode: Opcode, params: &[u8]) -> Result<(), HciError> {
        let header = CommandHeader::new(opcode, params)?.encode();

        if self.config.log_traffic {
            trace!("HCI <- {:02x} {:02x}", header, params);
        }

        self.with_transport(|transport| transport.write(&header, params))
            .map_err(|_| {
                warn!("HCI command write failed (opcode {:04x})", opcode.raw());
                HciError::Transport
            })
    }

    /// Run `f` on the pool and queue with the data-ready interrupt masked
    ///
    /// `f` must not block or call back into `with_packets`.
    pub(crate) fn with_packets<R>(&self, f: impl FnOnce(&mut PacketStore<N>) -> R) -> R {
        let _mask = self.line.masked();
        self.packets.lock(|packets| f(&mut packets.borrow_mut()))
    }

    pub(crate) fn with_transport<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        self.transport.lock(|transport| f(&mut transport.borrow_mut()))
    }
}
