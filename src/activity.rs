//! Onboard activity LED.
//!
//! Blinks slowly while the device waits for its first frame, then goes dark
//! and only pulses briefly on every 60th displayed frame during the first
//! 600 frames. After that the pin stays dark.

use embassy_time::{Duration, Instant};

use crate::Platform;

const SLOW_BLINK_INTERVAL: Duration = Duration::from_millis(500);
const PULSE_EVERY_FRAMES: u32 = 60;
const PULSE_FRAME_LIMIT: u32 = 600;
const PULSE_WIDTH_US: u32 = 1000;

#[derive(Debug, Clone, Copy)]
enum ActivityState {
    /// Alive, no stream yet: slow blink.
    AwaitingStream { led_on: bool, last_toggle: Instant },
    /// Stream running: dark, with sparse frame pulses.
    Streaming { frames_displayed: u32 },
}

/// Activity LED state machine.
#[derive(Debug)]
pub struct ActivityLed {
    state: ActivityState,
}

impl ActivityLed {
    pub fn new<P: Platform>(platform: &mut P) -> Self {
        platform.set_status_led(false);
        Self {
            state: ActivityState::AwaitingStream {
                led_on: false,
                last_toggle: platform.now(),
            },
        }
    }

    /// Advance the slow blink. No-op once the stream has started.
    pub fn poll<P: Platform>(&mut self, platform: &mut P) {
        let ActivityState::AwaitingStream { led_on, last_toggle } = &mut self.state else {
            return;
        };
        let now = platform.now();
        if now.duration_since(*last_toggle) >= SLOW_BLINK_INTERVAL {
            *last_toggle = now;
            *led_on = !*led_on;
            platform.set_status_led(*led_on);
        }
    }

    /// Notification edge: one frame was just displayed.
    ///
    /// The pulse blocks for about a millisecond; this is the only blocking
    /// delay in the whole loop.
    pub fn frame_displayed<P: Platform>(&mut self, platform: &mut P) {
        if let ActivityState::AwaitingStream { .. } = self.state {
            platform.set_status_led(false);
            self.state = ActivityState::Streaming {
                frames_displayed: 0,
            };
        }
        let ActivityState::Streaming { frames_displayed } = &mut self.state else {
            return;
        };

        *frames_displayed += 1;
        if *frames_displayed <= PULSE_FRAME_LIMIT && frames_displayed.is_multiple_of(PULSE_EVERY_FRAMES)
        {
            platform.set_status_led(true);
            platform.delay_us(PULSE_WIDTH_US);
            platform.set_status_led(false);
        }
    }
}
