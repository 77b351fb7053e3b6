//! Per-tick values handed to every phase.

use nav_core::{SimClock, Tick};

/// Simulation time as seen by one tick.
///
/// Built from the clock at the start of each tick and passed by value to
/// whatever needs the step size or the current time; nothing reads a global.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SimContext {
    pub tick:        Tick,
    /// Seconds per step.
    pub time_step:   f32,
    /// Simulated seconds at the start of this tick.
    pub global_time: f64,
}

impl SimContext {
    pub fn from_clock(clock: &SimClock) -> Self {
        Self {
            tick:        clock.current_tick,
            time_step:   clock.time_step,
            global_time: clock.elapsed_secs(),
        }
    }
}
