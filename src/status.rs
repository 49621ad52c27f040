//! 1 Hz JSON heartbeat to the sender.
//!
//! Each emission drains the receiver counters and the error latch into a
//! single-line document with a fixed key order, formatted into a bounded
//! scratch string and sent fire-and-forget. A stalled loop emits late
//! rather than replaying the backlog.

use core::fmt::{self, Write};

use embassy_time::{Duration, Instant};
use heapless::String;

use crate::config::DeviceConfig;
use crate::receiver::{Receiver, ReceiverStats};
use crate::Platform;

/// Nominal spacing between heartbeats.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(1000);

/// Heartbeat scratch capacity.
pub const JSON_CAPACITY: usize = 512;

/// The heartbeat ticker.
#[derive(Debug)]
pub struct StatusReporter {
    config: DeviceConfig,
    started: Instant,
    last_heartbeat: Instant,
}

impl StatusReporter {
    pub fn new(config: DeviceConfig, now: Instant) -> Self {
        Self {
            config,
            started: now,
            last_heartbeat: now,
        }
    }

    /// Emit a heartbeat if the interval has elapsed.
    pub fn poll<P: Platform, const FRAME_BYTES: usize>(
        &mut self,
        platform: &mut P,
        receiver: &mut Receiver<FRAME_BYTES>,
    ) {
        let now = platform.now();
        if now.duration_since(self.last_heartbeat) < HEARTBEAT_INTERVAL {
            return;
        }
        self.last_heartbeat = now;

        let stats = receiver.drain_stats();
        let error = receiver.take_error();

        let mut json = String::<JSON_CAPACITY>::new();
        // A full scratch buffer truncates the document, as snprintf would.
        let _ = self.write_heartbeat(&mut json, platform, now, &stats, error.as_deref());
        platform.send_status(json.as_bytes());
    }

    #[allow(clippy::cast_possible_truncation)]
    fn write_heartbeat<P: Platform>(
        &self,
        out: &mut String<JSON_CAPACITY>,
        platform: &P,
        now: Instant,
        stats: &ReceiverStats,
        error: Option<&str>,
    ) -> fmt::Result {
        write!(
            out,
            "{{\"id\":\"{}\",\"ip\":\"{}\",\"uptime_ms\":{},\"link\":{},\"runs\":{},\"leds\":[",
            self.config.side_id,
            platform.local_ip(),
            now.duration_since(self.started).as_millis() as u32,
            platform.link_up(),
            self.config.run_count
        )?;
        for run in 0..self.config.run_count {
            if run > 0 {
                out.write_char(',')?;
            }
            write!(out, "{}", self.config.leds_per_run[run])?;
        }
        write!(
            out,
            "],\"rx_frames\":{},\"complete\":{},\"applied\":{},\"dropped_frames\":{},\"errors\":[",
            stats.rx_frames,
            stats.complete_frames,
            stats.applied_frames,
            stats.dropped()
        )?;
        if let Some(error) = error {
            out.write_char('"')?;
            for c in error.chars() {
                if c == '"' || c == '\\' {
                    out.write_char('\\')?;
                }
                out.write_char(c)?;
            }
            out.write_char('"')?;
        }
        out.write_str("]}")
    }
}
