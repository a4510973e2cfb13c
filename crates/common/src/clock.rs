//! Session clock and frame pacing.
//!
//! Every timestamp a capture session handles is nanoseconds since the
//! session epoch. Live sources stamp frames from a [`SessionClock`];
//! recorded sources carry their own timestamps.

use std::time::Instant;

/// Nanoseconds per second.
pub const NANOS_PER_SEC: u64 = 1_000_000_000;

/// A monotonic clock anchored to the moment a capture session started.
#[derive(Debug, Clone)]
pub struct SessionClock {
    epoch: Instant,

    /// Wall-clock time at epoch (RFC 3339).
    epoch_wall: String,
}

impl SessionClock {
    /// Create a clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Nanoseconds elapsed since the session started.
    pub fn elapsed_ns(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }

    /// Seconds elapsed since the session started.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Wall-clock time at session start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }

    pub fn ns_to_secs(ns: u64) -> f64 {
        ns as f64 / NANOS_PER_SEC as f64
    }

    pub fn secs_to_ns(secs: f64) -> u64 {
        (secs.max(0.0) * NANOS_PER_SEC as f64) as u64
    }
}

/// Limits how often a per-frame computation runs.
///
/// Frames whose timestamp is closer than one interval to the last accepted
/// frame are skipped, so a source that delivers faster than the display
/// rate does not multiply classification work.
#[derive(Debug)]
pub struct RateController {
    target_interval_ns: u64,
    last_tick_ns: Option<u64>,
}

impl RateController {
    /// Create a controller targeting the given Hz rate.
    ///
    /// A rate of zero disables pacing: every tick fires.
    pub fn new(target_hz: u32) -> Self {
        let target_interval_ns = if target_hz == 0 {
            0
        } else {
            NANOS_PER_SEC / target_hz as u64
        };
        Self {
            target_interval_ns,
            last_tick_ns: None,
        }
    }

    /// Returns true and records the tick when `current_ns` is due.
    /// The first call always fires.
    ///
    /// Up to 10% early arrival is tolerated so sources running at exactly
    /// the target rate are not dropped to integer rounding.
    pub fn should_tick(&mut self, current_ns: u64) -> bool {
        let slack = self.target_interval_ns / 10;
        match self.last_tick_ns {
            Some(last)
                if current_ns.saturating_sub(last).saturating_add(slack)
                    < self.target_interval_ns =>
            {
                false
            }
            _ => {
                self.last_tick_ns = Some(current_ns);
                true
            }
        }
    }

    /// Forget the last tick so the next frame fires immediately.
    pub fn reset(&mut self) {
        self.last_tick_ns = None;
    }

    /// Target interval in nanoseconds.
    pub fn interval_ns(&self) -> u64 {
        self.target_interval_ns
    }
}
