//! The `Sim` struct and its tick loop.

use std::sync::Arc;

use nav_agent::{AgentStore, NeighborLists};
use nav_core::{AgentId, SimClock, SimConfig, Vector2};
use nav_localizer::NavMeshLocalizer;
use nav_mesh::NavMesh;
use nav_orca::OrcaSolver;
use nav_path::Goal;
use nav_planner::PathPlanner;

use crate::context::SimContext;
use crate::velocity::VelocityComponent;
use crate::{SimObserver, SimResult};

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// `Sim` holds all simulation state and drives the five-phase tick loop:
///
/// 1. **Localize** (parallel with `parallel`): every agent's mesh location
///    and path progress is brought up to date with its position.
/// 2. **Steer** (parallel): each agent's [`VelocityComponent`] writes its
///    preferred velocity, planning a path on first use.
/// 3. **Sense** (parallel): neighbor lists are refilled from the navmesh
///    spatial query; occupancy is only read.
/// 4. **Avoid** (parallel): ORCA computes every new velocity from the state
///    all agents published last tick.  Results are collected, then written.
/// 5. **Integrate** (sequential): velocities and positions advance.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim {
    /// Global configuration (time step, total ticks, seed, …).
    pub config: SimConfig,

    /// Simulation clock: the current tick and elapsed seconds.
    pub clock: SimClock,

    /// Kinematic agent state, indexed by `AgentId`.
    pub agents: AgentStore,

    /// Per-agent neighbor lists, separated for the split-borrow pattern.
    pub neighbors: NeighborLists,

    /// Per-agent goals.  `None` leaves goal-driven agents standing.
    pub goals: Vec<Option<Goal>>,

    /// Per-agent preferred-velocity strategy.
    pub velocity: Vec<VelocityComponent>,

    pub mesh: Arc<NavMesh>,

    /// Route cache shared with the localizer.
    pub planner: Arc<PathPlanner>,

    /// Mesh locations, paths, and node occupancy.
    pub localizer: NavMeshLocalizer,
}

impl Sim {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run the simulation from the current tick to `config.end_tick()`.
    ///
    /// Calls observer hooks at every tick boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        while self.clock.current_tick < self.config.end_tick() {
            self.step(observer)?;
        }
        observer.on_sim_end(self.clock.current_tick);
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.step(observer)?;
        }
        Ok(())
    }

    /// Simulation time of the tick about to run.
    pub fn context(&self) -> SimContext {
        SimContext::from_clock(&self.clock)
    }

    /// Give `agent` a new goal.  Any path toward the old goal is dropped and
    /// a new one is planned on the next tick.
    pub fn set_goal(&mut self, agent: AgentId, goal: Goal) -> SimResult<()> {
        self.localizer.clear_path(agent)?;
        self.goals[agent.index()] = Some(goal);
        Ok(())
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let now = self.clock.current_tick;
        observer.on_tick_start(now);
        self.process_tick()?;
        observer.on_tick_end(now, &self.agents);
        if self.config.output_interval_ticks > 0
            && now.0.is_multiple_of(self.config.output_interval_ticks)
        {
            observer.on_snapshot(now, &self.agents, &self.localizer);
        }
        self.clock.advance();
        Ok(())
    }

    fn process_tick(&mut self) -> SimResult<()> {
        let ctx = self.context();

        // ── Phase 1: localize ─────────────────────────────────────────────
        self.localizer.update_all(&self.agents)?;

        // ── Phase 2: preferred velocities ─────────────────────────────────
        self.compute_pref_velocities(&ctx)?;

        // ── Phase 3: sense ────────────────────────────────────────────────
        self.sense();

        // ── Phase 4: avoid ────────────────────────────────────────────────
        //
        // Every agent reads the velocities all agents ended last tick with,
        // so the new ones are collected before any is written.
        let new_vels = self.compute_new_velocities(&ctx);
        for (agent, vel) in self.agents.agents.iter_mut().zip(new_vels) {
            agent.vel_new = vel;
        }

        // ── Phase 5: integrate ────────────────────────────────────────────
        for agent in &mut self.agents.agents {
            agent.integrate(ctx.time_step);
        }
        Ok(())
    }

    fn compute_pref_velocities(&mut self, ctx: &SimContext) -> SimResult<()> {
        // Explicit field borrows so the borrow checker sees disjoint access.
        let mesh      = &*self.mesh;
        let planner   = &*self.planner;
        let goals     = self.goals.as_slice();
        let velocity  = self.velocity.as_slice();
        let locations = self.localizer.locations_mut();
        let agents    = &mut self.agents.agents;

        #[cfg(not(feature = "parallel"))]
        {
            agents
                .iter_mut()
                .zip(locations.iter_mut())
                .zip(velocity)
                .zip(goals)
                .try_for_each(|(((agent, loc), comp), goal)| {
                    let mut pvel = agent.pref;
                    comp.set_pref_velocity(agent, goal.as_ref(), loc, mesh, planner, ctx, &mut pvel)?;
                    agent.pref = pvel;
                    Ok(())
                })
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            agents
                .par_iter_mut()
                .zip(locations.par_iter_mut())
                .zip(velocity.par_iter())
                .zip(goals.par_iter())
                .try_for_each(|(((agent, loc), comp), goal)| {
                    let mut pvel = agent.pref;
                    comp.set_pref_velocity(agent, goal.as_ref(), loc, mesh, planner, ctx, &mut pvel)?;
                    agent.pref = pvel;
                    Ok(())
                })
        }
    }

    fn sense(&mut self) {
        let agents    = &self.agents;
        let localizer = &self.localizer;
        let neighbors = &mut self.neighbors.inner;
        let query     = localizer.spatial_query(agents);

        #[cfg(not(feature = "parallel"))]
        {
            neighbors
                .iter_mut()
                .zip(&agents.agents)
                .zip(localizer.locations())
                .for_each(|((nbrs, agent), loc)| {
                    nbrs.start_query(agent, loc.node());
                    query.agent_query(nbrs);
                    query.obstacle_query(nbrs);
                });
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            neighbors
                .par_iter_mut()
                .zip(agents.agents.par_iter())
                .zip(localizer.locations().par_iter())
                .for_each(|((nbrs, agent), loc)| {
                    nbrs.start_query(agent, loc.node());
                    query.agent_query(nbrs);
                    query.obstacle_query(nbrs);
                });
        }
    }

    fn compute_new_velocities(&self, ctx: &SimContext) -> Vec<Vector2> {
        let agents    = &self.agents;
        let neighbors = &self.neighbors.inner;
        let mesh      = &*self.mesh;
        let time_step = ctx.time_step;

        #[cfg(not(feature = "parallel"))]
        {
            let mut solver = OrcaSolver::new();
            agents
                .agents
                .iter()
                .zip(neighbors)
                .map(|(agent, nbrs)| solver.compute_new_velocity(agent, nbrs, agents, mesh, time_step))
                .collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            agents
                .agents
                .par_iter()
                .zip(neighbors.par_iter())
                .map_init(OrcaSolver::new, |solver, (agent, nbrs)| {
                    solver.compute_new_velocity(agent, nbrs, agents, mesh, time_step)
                })
                .collect()
        }
    }
}
