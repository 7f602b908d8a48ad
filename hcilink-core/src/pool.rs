//! Packet pool and receive queue
//!
//! All receive buffers live in one fixed arena created at start-up. Each
//! slot carries an intrusive `next` link, and every list that can own a
//! buffer (the free pool, the receive queue, a request's holding queue) is
//! a [`PacketList`] threaded through those links.
//!
//! Ownership of a buffer is a [`PacketHandle`]. Handles cannot be cloned,
//! so a buffer is always in exactly one place: a list, or the hands of
//! whoever popped it. Pushing onto a list consumes the handle, popping
//! produces one.
//!
//! ```text
//!   arena:  [ 0 ][ 1 ][ 2 ][ 3 ][ 4 ]
//!   next:    ─┐    ┌─   ─┐   ·    ·
//!             └──▶ 1     └─▶ 3
//!   pool  = 0 → 1      queue = 2 → 3      in flight = 4
//! ```

use hcilink_protocol::PACKET_SIZE;

use crate::error::HciError;

/// Number of receive buffers when none is specified
pub const DEFAULT_POOL_SIZE: usize = 5;

/// One receive buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    data: [u8; PACKET_SIZE],
    len: usize,
}

impl Packet {
    /// An empty buffer
    pub const EMPTY: Packet = Packet {
        data: [0; PACKET_SIZE],
        len: 0,
    };

    /// Valid bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Number of valid bytes
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the buffer holds no bytes
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Replace the contents, truncating to the buffer size
    pub fn fill(&mut self, bytes: &[u8]) {
        let len = bytes.len().min(PACKET_SIZE);
        self.data[..len].copy_from_slice(&bytes[..len]);
        self.len = len;
    }
}

/// Exclusive ownership of one arena slot
#[derive(Debug, PartialEq, Eq)]
pub struct PacketHandle(u8);

impl PacketHandle {
    /// Arena slot this handle owns
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Singly linked list of arena slots
///
/// The links live in the [`PacketStore`]; a list only knows its ends.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PacketList {
    head: Option<u8>,
    tail: Option<u8>,
    len: u8,
}

impl PacketList {
    /// Create an empty list
    pub const fn new() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Number of buffers on the list
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Check if the list is empty
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    fn push_back(&mut self, links: &mut [Option<u8>], handle: PacketHandle) {
        let idx = handle.0;
        links[idx as usize] = None;
        match self.tail {
            Some(tail) => links[tail as usize] = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
        self.len += 1;
    }

    fn push_front(&mut self, links: &mut [Option<u8>], handle: PacketHandle) {
        let idx = handle.0;
        links[idx as usize] = self.head;
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
        self.len += 1;
    }

    fn pop_front(&mut self, links: &mut [Option<u8>]) -> Option<PacketHandle> {
        let idx = self.head?;
        self.head = links[idx as usize].take();
        if self.head.is_none() {
            self.tail = None;
        }
        self.len -= 1;
        Some(PacketHandle(idx))
    }

    /// Put all of `front` ahead of this list, keeping both orders
    fn prepend(&mut self, links: &mut [Option<u8>], front: PacketList) {
        let Some(front_tail) = front.tail else {
            return;
        };
        links[front_tail as usize] = self.head;
        if self.tail.is_none() {
            self.tail = Some(front_tail);
        }
        self.head = front.head;
        self.len += front.len;
    }
}

/// Snapshot of buffer accounting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PoolStats {
    /// Buffers in the free pool
    pub free: usize,
    /// Buffers waiting in the receive queue
    pub queued: usize,
}

/// Buffer arena with its free pool and receive queue
///
/// Not synchronized itself; [`crate::Hci`] only touches it with the
/// data-ready interrupt masked.
#[derive(Debug)]
pub struct PacketStore<const N: usize> {
    packets: [Packet; N],
    links: [Option<u8>; N],
    pool: PacketList,
    queue: PacketList,
}

impl<const N: usize> Default for PacketStore<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> PacketStore<N> {
    const CAPACITY_OK: () = assert!(N > 0 && N <= u8::MAX as usize, "pool size must be 1..=255");

    /// Create a store with every buffer in the free pool
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_OK;

        let mut store = Self {
            packets: [Packet::EMPTY; N],
            links: [None; N],
            pool: PacketList::new(),
            queue: PacketList::new(),
        };
        for idx in 0..N {
            store.pool.push_back(&mut store.links, PacketHandle(idx as u8));
        }
        store
    }

    /// Total number of buffers
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Take a buffer from the free pool
    pub fn acquire(&mut self) -> Result<PacketHandle, HciError> {
        self.pool
            .pop_front(&mut self.links)
            .ok_or(HciError::PoolExhausted)
    }

    /// Return a buffer to the free pool
    pub fn release(&mut self, handle: PacketHandle) {
        self.packets[handle.index()].len = 0;
        self.pool.push_front(&mut self.links, handle);
    }

    /// Append a buffer to the tail of the receive queue
    pub fn enqueue(&mut self, handle: PacketHandle) {
        self.queue.push_back(&mut self.links, handle);
    }

    /// Remove the oldest buffer from the receive queue
    pub fn dequeue(&mut self) -> Result<PacketHandle, HciError> {
        self.queue
            .pop_front(&mut self.links)
            .ok_or(HciError::QueueEmpty)
    }

    /// Append a buffer to a caller-owned list
    pub fn hold(&mut self, list: &mut PacketList, handle: PacketHandle) {
        list.push_back(&mut self.links, handle);
    }

    /// Move a caller-owned list to the head of the receive queue
    pub fn restore_front(&mut self, list: PacketList) {
        self.queue.prepend(&mut self.links, list);
    }

    /// Buffer owned by `handle`
    pub fn packet(&self, handle: &PacketHandle) -> &Packet {
        &self.packets[handle.index()]
    }

    /// Mutable buffer owned by `handle`
    pub fn packet_mut(&mut self, handle: &mut PacketHandle) -> &mut Packet {
        &mut self.packets[handle.index()]
    }

    /// Number of free buffers
    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }

    /// Number of queued buffers
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Check if the free pool is empty
    pub fn is_pool_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Check if the receive queue is empty
    pub fn is_queue_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Current accounting
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            free: self.pool.len(),
            queued: self.queue.len(),
        }
    }
}
