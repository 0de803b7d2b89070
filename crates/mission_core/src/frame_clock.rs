//! Fixed-timestep accumulator that turns irregular host frames into simulation
//! ticks stamped with a virtual clock.

use std::time::Duration;

use crate::config::HostConfig;

const FALLBACK_MAX_FRAME_DELTA: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepPlan {
    pub ticks_to_run: u32,
    pub dropped_backlog: Duration,
}

#[derive(Debug, Clone)]
pub struct FrameClock {
    fixed_dt: Duration,
    max_frame_delta: Duration,
    max_ticks_per_frame: u32,
    accumulator: Duration,
    virtual_time: Duration,
}

impl FrameClock {
    pub fn new(target_tps: u32, max_frame_delta: Duration, max_ticks_per_frame: u32) -> Self {
        let target_tps = target_tps.max(1);
        let max_frame_delta = if max_frame_delta.is_zero() {
            FALLBACK_MAX_FRAME_DELTA
        } else {
            max_frame_delta
        };
        Self {
            fixed_dt: Duration::from_secs_f64(1.0 / target_tps as f64),
            max_frame_delta,
            max_ticks_per_frame: max_ticks_per_frame.max(1),
            accumulator: Duration::ZERO,
            virtual_time: Duration::ZERO,
        }
    }

    pub fn from_host_config(host: &HostConfig, max_frame_delta_ms: f64) -> Self {
        let max_frame_delta = if max_frame_delta_ms > 0.0 {
            Duration::try_from_secs_f64(max_frame_delta_ms / 1_000.0)
                .unwrap_or(FALLBACK_MAX_FRAME_DELTA)
        } else {
            FALLBACK_MAX_FRAME_DELTA
        };
        Self::new(host.target_tps, max_frame_delta, host.max_ticks_per_frame)
    }

    pub fn fixed_dt(&self) -> Duration {
        self.fixed_dt
    }

    /// Virtual milliseconds elapsed across all ticks handed out so far.
    pub fn now_ms(&self) -> f64 {
        self.virtual_time.as_secs_f64() * 1_000.0
    }

    /// Feeds one host frame into the accumulator. Backlog beyond
    /// `max_ticks_per_frame` is dropped rather than replayed.
    pub fn advance(&mut self, raw_frame_dt: Duration) -> StepPlan {
        let clamped = raw_frame_dt.min(self.max_frame_delta);
        let mut accumulator = self.accumulator.saturating_add(clamped);
        let mut ticks_to_run = 0u32;

        while accumulator >= self.fixed_dt && ticks_to_run < self.max_ticks_per_frame {
            accumulator = accumulator.saturating_sub(self.fixed_dt);
            ticks_to_run = ticks_to_run.saturating_add(1);
        }

        let dropped_backlog = if accumulator >= self.fixed_dt {
            std::mem::replace(&mut accumulator, Duration::ZERO)
        } else {
            Duration::ZERO
        };
        self.accumulator = accumulator;

        StepPlan {
            ticks_to_run,
            dropped_backlog,
        }
    }

    /// Advances virtual time by one fixed step and returns the new timestamp.
    pub fn next_tick_ms(&mut self) -> f64 {
        self.virtual_time = self.virtual_time.saturating_add(self.fixed_dt);
        self.now_ms()
    }
}
