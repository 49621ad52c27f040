#![no_std]

pub mod activity;
pub mod config;
pub mod controller;
pub mod driver;
pub mod ingress;
pub mod mock;
pub mod receiver;
pub mod status;
pub mod wakeup;
pub mod wire;

pub use activity::ActivityLed;
pub use config::{DeviceConfig, MAX_STRIPS};
pub use controller::Controller;
pub use driver::StripDriver;
pub use ingress::{PacketQueue, RawPacket, MAX_PACKET_LEN};
pub use mock::MockPlatform;
pub use receiver::{Receiver, ReceiverStats, SLOT_COUNT};
pub use status::StatusReporter;
pub use wakeup::WakeupEffect;
pub use wire::{frame_id_newer, PacketHeader, HEADER_LEN};

pub use embassy_time::{Duration, Instant};

/// RGB pixel value, `smart-leds` byte order.
pub type Rgb = smart_leds::RGB8;

/// All-channels-off pixel.
pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

/// Hardware capability surface consumed by the firmware core.
///
/// Implement this trait once per board. The whole core is generic over it,
/// so the embedded build pays no dispatch cost and host tests substitute
/// [`mock::MockPlatform`]. Interrupts stay inside the implementation;
/// everything here is a polling call made from the cooperative loop.
pub trait Platform {
    /// Monotonic time since boot.
    fn now(&self) -> Instant;

    /// Busy-wait for `ms` milliseconds. Never called from the packet path.
    fn delay_ms(&mut self, ms: u32);

    /// Busy-wait for `us` microseconds. Never called from the packet path.
    fn delay_us(&mut self, us: u32);

    /// Whether the Ethernet link is up.
    fn link_up(&self) -> bool;

    /// Dotted-quad text of the device address, as reported in heartbeats.
    fn local_ip(&self) -> &str;

    /// Drain ready datagrams, invoking `handler(run_index, bytes)` once per
    /// datagram in arrival order.
    fn poll_packets(&mut self, handler: impl FnMut(u8, &[u8]));

    /// Fire-and-forget UDP datagram to the configured sender.
    fn send_status(&mut self, payload: &[u8]);

    /// Write one pixel into the drawing buffer.
    ///
    /// Out-of-range coordinates are silently ignored.
    fn set_pixel(&mut self, strip: usize, index: usize, color: Rgb);

    /// Kick a DMA transfer of the drawing buffer.
    fn show(&mut self);

    /// Whether a DMA transfer is still in flight.
    fn leds_busy(&self) -> bool;

    /// Drive the onboard status pin (active high).
    fn set_status_led(&mut self, on: bool);
}
