//! Simulation observer trait for progress reporting and data collection.

use nav_agent::AgentStore;
use nav_core::Tick;
use nav_localizer::NavMeshLocalizer;

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: arrival counter
///
/// ```rust,ignore
/// struct Arrivals { stopped: usize }
///
/// impl SimObserver for Arrivals {
///     fn on_tick_end(&mut self, _tick: Tick, agents: &AgentStore) {
///         self.stopped = agents.agents.iter().filter(|a| a.vel.length_sq() < 1e-6).count();
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called at the end of each tick, after every agent has moved.
    fn on_tick_end(&mut self, _tick: Tick, _agents: &AgentStore) {}

    /// Called at snapshot intervals (every `config.output_interval_ticks` ticks).
    ///
    /// Provides read-only access to agent state and mesh locations so that
    /// output writers can record positions without the sim knowing about
    /// any specific output format.
    fn on_snapshot(
        &mut self,
        _tick:      Tick,
        _agents:    &AgentStore,
        _localizer: &NavMeshLocalizer,
    ) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want progress callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
