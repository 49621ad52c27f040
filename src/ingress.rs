//! Bounded ingress queue for received datagrams.
//!
//! Interrupt-driven platforms push raw datagrams from the RX path and the
//! cooperative loop drains them through [`Platform::poll_packets`]. Built on
//! `critical-section` and a `heapless` deque, so producer and consumer may
//! live on different priority levels.
//!
//! [`Platform::poll_packets`]: crate::Platform::poll_packets

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::{Deque, Vec};

/// Largest datagram the ingress path will accept.
pub const MAX_PACKET_LEN: usize = 2048;

/// One received datagram, tagged with the run index of its ingress port.
#[derive(Debug, Clone)]
pub struct RawPacket {
    pub run_index: u8,
    pub payload: Vec<u8, MAX_PACKET_LEN>,
}

impl RawPacket {
    /// Copy a datagram into an owned packet.
    ///
    /// Returns `None` when the datagram exceeds [`MAX_PACKET_LEN`].
    pub fn copy_from(run_index: u8, payload: &[u8]) -> Option<Self> {
        Some(Self {
            run_index,
            payload: Vec::from_slice(payload).ok()?,
        })
    }
}

/// Bounded, interrupt-safe queue of received datagrams.
pub struct PacketQueue<const DEPTH: usize> {
    inner: Mutex<RefCell<Deque<RawPacket, DEPTH>>>,
}

impl<const DEPTH: usize> PacketQueue<DEPTH> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Enqueue a datagram, returning it if the queue is full.
    pub fn try_push(&self, packet: RawPacket) -> Result<(), RawPacket> {
        critical_section::with(|cs| self.inner.borrow(cs).borrow_mut().push_back(packet))
    }

    /// Dequeue the oldest datagram.
    pub fn pop(&self) -> Option<RawPacket> {
        critical_section::with(|cs| self.inner.borrow(cs).borrow_mut().pop_front())
    }

    pub fn is_empty(&self) -> bool {
        critical_section::with(|cs| self.inner.borrow(cs).borrow().is_empty())
    }

    /// Drop all queued datagrams.
    pub fn clear(&self) {
        critical_section::with(|cs| self.inner.borrow(cs).borrow_mut().clear());
    }
}

impl<const DEPTH: usize> Default for PacketQueue<DEPTH> {
    fn default() -> Self {
        Self::new()
    }
}
