//! Simulation time model.
//!
//! Time advances in fixed steps.  `Tick` counts completed steps and
//! `SimClock` maps the count to simulated seconds:
//!
//!   elapsed_secs = tick * time_step
//!
//! Keeping the counter integral means the step index is exact even when the
//! float accumulation of `global_time` drifts.

use std::fmt;

use crate::error::{NavError, NavResult};

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation step counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Seconds per step.
    pub time_step:    f32,
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new(time_step: f32) -> Self {
        Self { time_step, current_tick: Tick::ZERO }
    }

    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = Tick(self.current_tick.0 + 1);
    }

    /// Simulated seconds since tick 0.
    #[inline]
    pub fn elapsed_secs(&self) -> f64 {
        self.current_tick.0 as f64 * self.time_step as f64
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2}s)", self.current_tick, self.elapsed_secs())
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level run configuration.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Seconds per step.  Must be positive and finite.
    pub time_step: f32,

    /// Total steps to simulate.
    pub total_ticks: u64,

    /// Master RNG seed for applications that jitter spawns or goals.
    pub seed: u64,

    /// Worker thread count passed to Rayon.  `None` uses all logical cores.
    pub num_threads: Option<usize>,

    /// Notify the observer's snapshot hook every N ticks.  0 disables it.
    pub output_interval_ticks: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            time_step:             0.1,
            total_ticks:           1_000,
            seed:                  0,
            num_threads:           None,
            output_interval_ticks: 10,
        }
    }
}

impl SimConfig {
    /// The tick at which the simulation ends (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }

    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.time_step)
    }

    pub fn validate(&self) -> NavResult<()> {
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            return Err(NavError::Config(format!(
                "time_step must be positive and finite, got {}",
                self.time_step
            )));
        }
        if self.num_threads == Some(0) {
            return Err(NavError::Config("num_threads must be at least 1".into()));
        }
        Ok(())
    }
}
