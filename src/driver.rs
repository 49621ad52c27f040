//! Strip output on top of the DMA LED backend.
//!
//! The driver is stateless between frames: every displayed frame writes all
//! eight strips end to end, padding short runs and unused strips with black,
//! so a dropped packet can never leave a stale pixel lit past the next
//! delivered frame.

use embassy_time::{Duration, Instant};

use crate::config::{DeviceConfig, MAX_STRIPS};
use crate::{Platform, Rgb, BLACK};

/// Post-boot interval during which no frames are displayed.
///
/// Hides power-on garbage and gives the Ethernet link time to come up.
pub const STARTUP_BLACKOUT: Duration = Duration::from_millis(1000);

/// Translates assembled frames into per-strip pixel writes.
#[derive(Debug)]
pub struct StripDriver {
    config: DeviceConfig,
    boot: Instant,
}

impl StripDriver {
    /// Record the boot time and push an all-black frame.
    pub fn new<P: Platform>(config: DeviceConfig, platform: &mut P) -> Self {
        let driver = Self {
            config,
            boot: platform.now(),
        };
        driver.show_black(platform);
        driver
    }

    /// Display one assembled frame (`run 0 || run 1 || …`, 3 bytes per LED).
    ///
    /// The caller must have observed `busy() == false`.
    pub fn show_frame<P: Platform>(&self, platform: &mut P, rgb: &[u8]) {
        debug_assert_eq!(rgb.len(), self.config.frame_bytes());

        let max_leds = self.config.max_leds();
        for run in 0..self.config.run_count {
            let led_count = self.config.leds_per_run[run];
            let base = self.config.run_offset(run);
            for index in 0..led_count {
                let at = base + index * 3;
                platform.set_pixel(
                    run,
                    index,
                    Rgb {
                        r: rgb[at],
                        g: rgb[at + 1],
                        b: rgb[at + 2],
                    },
                );
            }
            for index in led_count..max_leds {
                platform.set_pixel(run, index, BLACK);
            }
        }
        for strip in self.config.run_count..MAX_STRIPS {
            for index in 0..max_leds {
                platform.set_pixel(strip, index, BLACK);
            }
        }
        platform.show();
    }

    /// Blank every strip and kick the transfer.
    pub fn show_black<P: Platform>(&self, platform: &mut P) {
        let max_leds = self.config.max_leds();
        for strip in 0..MAX_STRIPS {
            for index in 0..max_leds {
                platform.set_pixel(strip, index, BLACK);
            }
        }
        platform.show();
    }

    /// Whether a transfer is still in flight.
    pub fn busy<P: Platform>(&self, platform: &P) -> bool {
        platform.leds_busy()
    }

    /// Whether the startup blackout has elapsed.
    pub fn ready_for_frames(&self, now: Instant) -> bool {
        now.duration_since(self.boot) >= STARTUP_BLACKOUT
    }
}
