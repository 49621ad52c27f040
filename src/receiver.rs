//! Frame assembly from per-run datagrams.
//!
//! The sender slices each frame into one datagram per run; this module puts
//! them back together across reordering, loss, session restarts and frame-id
//! wraparound. All storage is inline and sized at compile time: the receiver
//! never allocates after construction.

use core::fmt::Write;

use embassy_time::Instant;
use heapless::String;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::config::DeviceConfig;
use crate::wire::{frame_id_newer, PacketHeader};

/// Number of in-flight assembly slots.
///
/// Two is enough for one frame mid-assembly plus one published frame.
pub const SLOT_COUNT: usize = 2;

/// Error latch capacity, bytes.
pub const ERROR_CAPACITY: usize = 128;

/// Counters drained into each heartbeat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceiverStats {
    /// Datagrams ingested, including rejected ones.
    pub rx_frames: u32,
    /// Slots that reached the expected run mask.
    pub complete_frames: u32,
    /// Frames actually handed to the driver.
    pub applied_frames: u32,
    /// Datagrams rejected for length or run index.
    pub drops_len: u32,
    /// Datagrams rejected for a non-newer frame id.
    pub drops_stale: u32,
}

impl ReceiverStats {
    /// Total rejected datagrams, as reported in heartbeats.
    pub const fn dropped(&self) -> u32 {
        self.drops_len + self.drops_stale
    }
}

/// One reusable assembly buffer.
#[derive(Debug)]
struct FrameSlot<const FRAME_BYTES: usize> {
    frame_id: u32,
    received_mask: u8,
    in_use: bool,
    rgb: [u8; FRAME_BYTES],
}

impl<const FRAME_BYTES: usize> FrameSlot<FRAME_BYTES> {
    const fn empty() -> Self {
        Self {
            frame_id: 0,
            received_mask: 0,
            in_use: false,
            rgb: [0; FRAME_BYTES],
        }
    }

    fn clear(&mut self) {
        self.frame_id = 0;
        self.received_mask = 0;
        self.in_use = false;
        self.rgb.fill(0);
    }

    fn claim(&mut self, frame_id: u32) {
        self.frame_id = frame_id;
        self.received_mask = 0;
        self.in_use = true;
        self.rgb.fill(0);
    }
}

/// Assembles per-run datagrams into whole frames.
///
/// `FRAME_BYTES` must equal [`DeviceConfig::frame_bytes`] for the supplied
/// configuration; `new` asserts this once at init.
#[derive(Debug)]
pub struct Receiver<const FRAME_BYTES: usize> {
    config: DeviceConfig,
    slots: [FrameSlot<FRAME_BYTES>; SLOT_COUNT],
    /// Slot holding a published frame, excluded from reuse until taken.
    ready: Option<usize>,
    current_session_id: u16,
    session_initialised: bool,
    last_applied_frame_id: u32,
    stats: ReceiverStats,
    error: Option<String<ERROR_CAPACITY>>,
}

impl<const FRAME_BYTES: usize> Receiver<FRAME_BYTES> {
    pub fn new(config: DeviceConfig) -> Self {
        assert!(
            config.frame_bytes() == FRAME_BYTES,
            "slot size does not match configured frame size"
        );
        Self {
            config,
            slots: core::array::from_fn(|_| FrameSlot::empty()),
            ready: None,
            current_session_id: 0,
            session_initialised: false,
            last_applied_frame_id: 0,
            stats: ReceiverStats::default(),
            error: None,
        }
    }

    /// Restore the freshly-constructed state, keeping the buffers.
    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }

    /// Ingest one datagram.
    ///
    /// Safe under any byte sequence of any length; malformed input becomes
    /// a counter, never an error. `run_index` is the ingress port index.
    pub fn handle_packet(&mut self, now: Instant, run_index: u8, bytes: &[u8]) {
        self.stats.rx_frames += 1;

        let run = run_index as usize;
        if run >= self.config.run_count || bytes.len() != self.config.packet_len(run) {
            self.stats.drops_len += 1;
            return;
        }
        let Some((header, rgb)) = PacketHeader::parse(bytes) else {
            self.stats.drops_len += 1;
            return;
        };

        if !self.session_initialised || header.session_id != self.current_session_id {
            self.enter_session(now, header.session_id);
        }

        if self.last_applied_frame_id != 0
            && !frame_id_newer(header.frame_id, self.last_applied_frame_id)
        {
            self.stats.drops_stale += 1;
            return;
        }

        let slot = self.claim_slot(header.frame_id);
        let offset = self.config.run_offset(run);
        self.slots[slot].rgb[offset..offset + rgb.len()].copy_from_slice(rgb);
        self.slots[slot].received_mask |= 1 << run;

        if self.slots[slot].received_mask == self.config.expected_mask() {
            self.stats.complete_frames += 1;
            if self.last_applied_frame_id == 0
                || frame_id_newer(header.frame_id, self.last_applied_frame_id)
            {
                self.ready = Some(slot);
                self.last_applied_frame_id = header.frame_id;
            }
            // The buffer stays readable through the reservation; the slot
            // itself is free for the next frame.
            self.slots[slot].in_use = false;
            self.slots[slot].received_mask = 0;
        }
    }

    /// Take the newest completed frame since the previous call, if any.
    ///
    /// Consuming clears the reservation, so the returned borrow must be
    /// displayed before the next `handle_packet`.
    pub fn take_ready_frame(&mut self) -> Option<&[u8; FRAME_BYTES]> {
        let slot = self.ready.take()?;
        self.stats.applied_frames += 1;
        Some(&self.slots[slot].rgb)
    }

    /// Drain and reset the heartbeat counters.
    pub fn drain_stats(&mut self) -> ReceiverStats {
        core::mem::take(&mut self.stats)
    }

    /// Take the latched error text, clearing the latch.
    pub fn take_error(&mut self) -> Option<String<ERROR_CAPACITY>> {
        self.error.take()
    }

    /// Begin a new session: latch the change, drop all in-flight frames.
    fn enter_session(&mut self, now: Instant, session_id: u16) {
        let mut text = String::new();
        let _ = write!(
            text,
            "{}: session change {} -> {}",
            now.as_millis(),
            self.current_session_id,
            session_id
        );
        self.error = Some(text);

        #[cfg(feature = "esp32-log")]
        println!(
            "[Receiver.handle_packet] session change {} -> {}",
            self.current_session_id, session_id
        );

        self.current_session_id = session_id;
        self.session_initialised = true;
        self.last_applied_frame_id = 0;
        self.ready = None;
        for slot in &mut self.slots {
            slot.clear();
        }
    }

    /// Find the slot assembling `frame_id`, or claim one for it.
    ///
    /// The published slot is never a candidate, so a pending ready frame
    /// cannot be overwritten by later traffic.
    fn claim_slot(&mut self, frame_id: u32) -> usize {
        for i in 0..SLOT_COUNT {
            if self.slots[i].in_use && self.slots[i].frame_id == frame_id {
                return i;
            }
        }

        for i in 0..SLOT_COUNT {
            if !self.slots[i].in_use && self.ready != Some(i) {
                self.slots[i].claim(frame_id);
                return i;
            }
        }

        // Every unreserved slot is mid-assembly: evict the modularly oldest.
        let victim = (0..SLOT_COUNT)
            .filter(|&i| self.ready != Some(i))
            .reduce(|oldest, i| {
                if frame_id_newer(self.slots[i].frame_id, self.slots[oldest].frame_id) {
                    oldest
                } else {
                    i
                }
            })
            .unwrap_or(0);
        self.slots[victim].claim(frame_id);
        victim
    }
}
