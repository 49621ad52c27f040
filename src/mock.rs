//! Host-test platform.
//!
//! Substitutes the embedded hardware behind [`Platform`] with simulated
//! time, packet injection and capture buffers, so the whole core can be
//! driven and observed from plain `#[test]` functions. Storage is
//! `heapless`, keeping the module `no_std`-clean like the rest of the
//! crate.

use embassy_time::Instant;
use heapless::{String, Vec};

use crate::config::MAX_STRIPS;
use crate::ingress::{PacketQueue, RawPacket};
use crate::status::JSON_CAPACITY;
use crate::{Platform, Rgb, BLACK};

/// LEDs tracked per strip by the mock framebuffer.
pub const MOCK_MAX_LEDS: usize = 64;

const QUEUE_DEPTH: usize = 32;
const HEARTBEAT_CAPACITY: usize = 16;
const HISTORY_CAPACITY: usize = 256;

/// Simulated platform for host tests.
pub struct MockPlatform {
    now_ms: u64,
    link_up: bool,
    leds_busy: bool,
    framebuffer: [[Rgb; MOCK_MAX_LEDS]; MAX_STRIPS],
    show_count: u32,
    packets: PacketQueue<QUEUE_DEPTH>,
    heartbeats: Vec<String<JSON_CAPACITY>, HEARTBEAT_CAPACITY>,
    status_led: bool,
    status_led_history: Vec<bool, HISTORY_CAPACITY>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            link_up: true,
            leds_busy: false,
            framebuffer: [[BLACK; MOCK_MAX_LEDS]; MAX_STRIPS],
            show_count: 0,
            packets: PacketQueue::new(),
            heartbeats: Vec::new(),
            status_led: false,
            status_led_history: Vec::new(),
        }
    }

    /// Jump the simulated clock to an absolute time.
    pub fn set_time(&mut self, ms: u64) {
        self.now_ms = ms;
    }

    /// Advance the simulated clock.
    pub fn advance(&mut self, ms: u64) {
        self.now_ms += ms;
    }

    /// Queue a datagram for the next `poll_packets` on channel `run_index`.
    ///
    /// Datagrams longer than the ingress bound are dropped, as the real
    /// receive path would drop them.
    pub fn inject_packet(&mut self, run_index: u8, bytes: &[u8]) {
        if let Some(packet) = RawPacket::copy_from(run_index, bytes) {
            let _ = self.packets.try_push(packet);
        }
    }

    /// Last pixel value written for `(strip, index)`.
    pub fn led(&self, strip: usize, index: usize) -> Rgb {
        if strip >= MAX_STRIPS || index >= MOCK_MAX_LEDS {
            return BLACK;
        }
        self.framebuffer[strip][index]
    }

    /// Number of `show()` kicks observed.
    pub fn show_count(&self) -> u32 {
        self.show_count
    }

    /// Every heartbeat datagram captured so far, in send order.
    pub fn heartbeats(&self) -> &[String<JSON_CAPACITY>] {
        &self.heartbeats
    }

    /// Current status-pin level.
    pub fn status_led(&self) -> bool {
        self.status_led
    }

    /// Every status-pin write observed, in order.
    pub fn status_led_history(&self) -> &[bool] {
        &self.status_led_history
    }

    pub fn set_link_up(&mut self, up: bool) {
        self.link_up = up;
    }

    /// Simulate a DMA transfer in flight.
    pub fn set_leds_busy(&mut self, busy: bool) {
        self.leds_busy = busy;
    }

    /// Zero the clock, captures and framebuffer.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for MockPlatform {
    fn now(&self) -> Instant {
        Instant::from_millis(self.now_ms)
    }

    fn delay_ms(&mut self, ms: u32) {
        self.now_ms += u64::from(ms);
    }

    fn delay_us(&mut self, us: u32) {
        // Sub-millisecond waits do not move the simulated clock.
        self.now_ms += u64::from(us / 1000);
    }

    fn link_up(&self) -> bool {
        self.link_up
    }

    fn local_ip(&self) -> &str {
        "10.10.0.3"
    }

    fn poll_packets(&mut self, mut handler: impl FnMut(u8, &[u8])) {
        while let Some(packet) = self.packets.pop() {
            handler(packet.run_index, &packet.payload);
        }
    }

    fn send_status(&mut self, payload: &[u8]) {
        let Ok(text) = core::str::from_utf8(payload) else {
            return;
        };
        let mut entry = String::new();
        if entry.push_str(text).is_ok() {
            let _ = self.heartbeats.push(entry);
        }
    }

    fn set_pixel(&mut self, strip: usize, index: usize, color: Rgb) {
        if strip >= MAX_STRIPS || index >= MOCK_MAX_LEDS {
            return;
        }
        self.framebuffer[strip][index] = color;
    }

    fn show(&mut self) {
        self.show_count += 1;
    }

    fn leds_busy(&self) -> bool {
        self.leds_busy
    }

    fn set_status_led(&mut self, on: bool) {
        self.status_led = on;
        let _ = self.status_led_history.push(on);
    }
}
