//! Loop glue: phase ordering and lifecycle.
//!
//! One [`Controller`] owns the platform and every component state value.
//! Each `poll` advances exactly one pass of the cooperative loop: the
//! wakeup walk runs to completion first, then network ingest, display,
//! heartbeat and activity LED in that order.

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::activity::ActivityLed;
use crate::config::DeviceConfig;
use crate::driver::StripDriver;
use crate::receiver::Receiver;
use crate::status::StatusReporter;
use crate::wakeup::WakeupEffect;
use crate::Platform;

/// The firmware core: one per device.
pub struct Controller<P: Platform, const FRAME_BYTES: usize> {
    config: DeviceConfig,
    platform: P,
    receiver: Receiver<FRAME_BYTES>,
    driver: StripDriver,
    wakeup: WakeupEffect,
    status: StatusReporter,
    activity: ActivityLed,
}

impl<P: Platform, const FRAME_BYTES: usize> Controller<P, FRAME_BYTES> {
    /// Bring the core up on an already-initialised platform.
    ///
    /// LEDs are pushed black before this returns.
    pub fn new(mut platform: P, config: DeviceConfig) -> Self {
        #[cfg(feature = "esp32-log")]
        println!(
            "[Controller.new] side {} up, {} runs",
            config.side_id, config.run_count
        );

        let driver = StripDriver::new(config, &mut platform);
        let now = platform.now();
        let wakeup = WakeupEffect::new(config, now);
        let receiver = Receiver::new(config);
        let status = StatusReporter::new(config, now);
        let activity = ActivityLed::new(&mut platform);

        Self {
            config,
            platform,
            receiver,
            driver,
            wakeup,
            status,
            activity,
        }
    }

    /// One pass of the cooperative loop.
    pub fn poll(&mut self) {
        let Self {
            platform,
            receiver,
            driver,
            wakeup,
            status,
            activity,
            ..
        } = self;

        if !wakeup.is_complete() {
            wakeup.poll(platform);
            return;
        }

        let now = platform.now();
        platform.poll_packets(|run_index, bytes| receiver.handle_packet(now, run_index, bytes));

        // The busy check precedes consumption: a frame completed while DMA
        // is in flight stays queued in the receiver until the next pass.
        if driver.ready_for_frames(platform.now()) && !driver.busy(platform) {
            if let Some(frame) = receiver.take_ready_frame() {
                driver.show_frame(platform, frame);
                activity.frame_displayed(platform);
            }
        }

        status.poll(platform, receiver);
        activity.poll(platform);
    }

    /// Whether the startup wakeup walk has finished.
    pub fn wakeup_complete(&self) -> bool {
        self.wakeup.is_complete()
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }
}
