//! Startup self-test: walk every run with a warm-white sweep.
//!
//! Runs to completion before any network traffic is accepted, so a miswired
//! or dead run is visible at a glance. Each run lights for 200 ms with a
//! 50 ms dark gap between runs.

use embassy_time::{Duration, Instant};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::config::DeviceConfig;
use crate::{Platform, Rgb, BLACK};

/// Warm white at half brightness.
const WARM_WHITE: Rgb = Rgb {
    r: 128,
    g: 100,
    b: 64,
};

const RUN_LIGHT_DURATION: Duration = Duration::from_millis(200);
const GAP_BETWEEN_RUNS: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WakeupState {
    Idle,
    LightingRun,
    GapAfterRun,
    Complete,
}

/// The wakeup walk state machine.
#[derive(Debug)]
pub struct WakeupEffect {
    config: DeviceConfig,
    state: WakeupState,
    run: usize,
    state_started: Instant,
}

impl WakeupEffect {
    pub fn new(config: DeviceConfig, now: Instant) -> Self {
        Self {
            config,
            state: WakeupState::Idle,
            run: 0,
            state_started: now,
        }
    }

    /// Advance the walk. No-op once complete or while DMA is in flight.
    pub fn poll<P: Platform>(&mut self, platform: &mut P) {
        if self.state == WakeupState::Complete {
            return;
        }
        if platform.leds_busy() {
            return;
        }

        let now = platform.now();
        let elapsed = now.duration_since(self.state_started);

        match self.state {
            WakeupState::Idle => {
                for run in 0..self.config.run_count {
                    self.paint_run(platform, run, BLACK);
                }
                self.paint_run(platform, self.run, WARM_WHITE);
                platform.show();
                self.state = WakeupState::LightingRun;
                self.state_started = now;
            }
            WakeupState::LightingRun if elapsed >= RUN_LIGHT_DURATION => {
                self.paint_run(platform, self.run, BLACK);
                platform.show();
                self.run += 1;
                if self.run >= self.config.run_count {
                    self.state = WakeupState::Complete;
                    #[cfg(feature = "esp32-log")]
                    println!("[WakeupEffect.poll] walk complete");
                } else {
                    self.state = WakeupState::GapAfterRun;
                    self.state_started = now;
                }
            }
            WakeupState::GapAfterRun if elapsed >= GAP_BETWEEN_RUNS => {
                self.paint_run(platform, self.run, WARM_WHITE);
                platform.show();
                self.state = WakeupState::LightingRun;
                self.state_started = now;
            }
            _ => {}
        }
    }

    /// Whether the walk has finished.
    pub fn is_complete(&self) -> bool {
        self.state == WakeupState::Complete
    }

    fn paint_run<P: Platform>(&self, platform: &mut P, run: usize, color: Rgb) {
        for index in 0..self.config.leds_per_run[run] {
            platform.set_pixel(run, index, color);
        }
    }
}
