//! Fixed-period interval clock.
//!
//! The dispatch loop promotes at most one queued match per interval. This
//! clock tells it when an interval boundary has passed and how much of the
//! current interval is left (for queue ETAs).

use std::time::Duration;

use rand::Rng;
use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// What to do when the owner polls the clock late.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntervalPolicy {
    /// Skip the missed boundaries and schedule the next one from now.
    /// A late wake-up never produces a burst of back-to-back ticks.
    #[default]
    Skip,
    /// Keep the original cadence. Missed boundaries fire one after another
    /// on subsequent polls until the clock has caught up.
    Drop,
}

/// Configuration for an [`IntervalTimer`].
#[derive(Debug, Clone)]
pub struct IntervalConfig {
    /// Length of one interval.
    pub period: Duration,
    /// Overrun handling policy.
    pub policy: IntervalPolicy,
    /// Random jitter (0–max µs) added to the *first* boundary only.
    pub initial_jitter_us: u64,
}

impl IntervalConfig {
    /// Shortest period the clock accepts.
    pub const MIN_PERIOD: Duration = Duration::from_millis(1);

    /// A config with the given period, no jitter, and the default policy.
    pub fn with_period(period: Duration) -> Self {
        Self {
            period,
            policy: IntervalPolicy::default(),
            initial_jitter_us: 0,
        }
    }

    /// Clamp out-of-range values. Called by [`IntervalTimer::new`].
    pub fn validated(mut self) -> Self {
        if self.period < Self::MIN_PERIOD {
            warn!(
                period_ms = self.period.as_secs_f64() * 1000.0,
                "interval period below minimum, clamping"
            );
            self.period = Self::MIN_PERIOD;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Tick info
// ---------------------------------------------------------------------------

/// Information about one interval boundary, returned by [`IntervalTimer::poll`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalInfo {
    /// Monotonically increasing tick number (starts at 1).
    pub tick: u64,
    /// `true` if the boundary was observed more than 10% of a period late.
    pub overrun: bool,
    /// Boundaries skipped because of the overrun (Skip policy only).
    pub ticks_skipped: u64,
}

/// Counters kept by the clock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntervalMetrics {
    pub total_ticks: u64,
    pub total_overruns: u64,
    pub total_skipped: u64,
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Fixed-period clock polled by its owner.
pub struct IntervalTimer {
    config: IntervalConfig,
    tick_count: u64,
    next_tick: Instant,
    metrics: IntervalMetrics,
}

impl IntervalTimer {
    /// Create a clock whose first boundary is one period (plus jitter) from now.
    pub fn new(config: IntervalConfig) -> Self {
        Self::starting_at(config, Instant::now())
    }

    /// Create a clock whose first boundary is one period (plus jitter) after `start`.
    pub fn starting_at(config: IntervalConfig, start: Instant) -> Self {
        let config = config.validated();
        let jitter = if config.initial_jitter_us > 0 {
            let us = rand::rng().random_range(0..config.initial_jitter_us);
            Duration::from_micros(us)
        } else {
            Duration::ZERO
        };

        debug!(
            period_ms = config.period.as_secs_f64() * 1000.0,
            policy = ?config.policy,
            "interval timer created"
        );

        Self {
            next_tick: start + config.period + jitter,
            config,
            tick_count: 0,
            metrics: IntervalMetrics::default(),
        }
    }

    /// When the next boundary is due.
    pub fn next_deadline(&self) -> Instant {
        self.next_tick
    }

    /// Time left until the next boundary, as seen at `now`.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.next_tick.saturating_duration_since(now)
    }

    /// Returns the boundary that has passed by `now`, if any.
    ///
    /// Call in a loop: with [`IntervalPolicy::Drop`] a late poll can owe
    /// several boundaries.
    pub fn poll(&mut self, now: Instant) -> Option<IntervalInfo> {
        if now < self.next_tick {
            return None;
        }

        let due = self.next_tick;
        let period = self.config.period;
        self.tick_count += 1;

        let late_by = now.saturating_duration_since(due);
        let overrun = late_by > period / 10;
        let mut ticks_skipped = 0u64;

        self.next_tick = match self.config.policy {
            IntervalPolicy::Skip => {
                if overrun {
                    ticks_skipped = (late_by.as_nanos() / period.as_nanos()) as u64;
                    if ticks_skipped > 0 {
                        warn!(
                            tick = self.tick_count,
                            skipped = ticks_skipped,
                            late_ms = late_by.as_secs_f64() * 1000.0,
                            "interval overrun, skipping ahead"
                        );
                    }
                }
                now + period
            }
            IntervalPolicy::Drop => {
                if overrun {
                    warn!(
                        tick = self.tick_count,
                        late_ms = late_by.as_secs_f64() * 1000.0,
                        "interval overrun, keeping cadence"
                    );
                }
                due + period
            }
        };

        if overrun {
            self.metrics.total_overruns += 1;
        }
        self.metrics.total_skipped += ticks_skipped;
        self.metrics.total_ticks += 1;

        trace!(tick = self.tick_count, overrun, "interval tick");

        Some(IntervalInfo {
            tick: self.tick_count,
            overrun,
            ticks_skipped,
        })
    }

    /// Sleep until the next boundary and return it.
    pub async fn wait_for_tick(&mut self) -> IntervalInfo {
        loop {
            time::sleep_until(self.next_tick).await;
            if let Some(info) = self.poll(Instant::now()) {
                return info;
            }
        }
    }

    pub fn period(&self) -> Duration {
        self.config.period
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn metrics(&self) -> &IntervalMetrics {
        &self.metrics
    }
}
