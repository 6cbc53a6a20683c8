//! Tick timing.
//!
//! [`Time`] is a resource updated at the start of every tick. [`TickBudget`]
//! is the per-tick wall-clock ceiling the widget factory checks between units
//! of work.

use std::time::{Duration, Instant};

/// Tick timing resource.
#[derive(Clone, Copy, Debug)]
pub struct Time {
    startup: Instant,
    tick_start: Instant,
    delta: Duration,
    elapsed: Duration,
    tick_count: u64,
}

impl Time {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            startup: now,
            tick_start: now,
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            tick_count: 0,
        }
    }

    pub(crate) fn update(&mut self) {
        let now = Instant::now();
        self.delta = now - self.tick_start;
        self.tick_start = now;
        self.elapsed = now - self.startup;
        self.tick_count += 1;
    }

    /// Duration of the previous tick.
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Time since startup.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

/// Cooperative per-tick time ceiling.
///
/// Started once per tick and asked before every unit of work whether the
/// ceiling has been reached. A unit already running is never interrupted, so
/// a tick overshoots by at most the cost of its last unit.
#[derive(Debug, Clone, Copy)]
pub struct TickBudget {
    ceiling: Duration,
    start: Instant,
}

impl TickBudget {
    pub fn start(ceiling: Duration) -> Self {
        Self {
            ceiling,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn ceiling(&self) -> Duration {
        self.ceiling
    }

    /// `true` once the elapsed time has reached the ceiling.
    pub fn exhausted(&self) -> bool {
        self.elapsed() >= self.ceiling
    }
}
