//! Fluent builder for constructing a [`Sim`].

use std::sync::Arc;

use nav_agent::{AgentStore, NeighborLists};
use nav_core::{NavError, SimConfig};
use nav_localizer::NavMeshLocalizer;
use nav_mesh::NavMesh;
use nav_path::Goal;
use nav_planner::PathPlanner;

use crate::velocity::VelocityComponent;
use crate::{Sim, SimError, SimResult};

/// Fluent builder for [`Sim`].
///
/// # Required inputs
///
/// - [`SimConfig`]: time step, total ticks, seed, …
/// - [`AgentStore`] + [`NeighborLists`]: from [`nav_agent::AgentStoreBuilder`]
/// - `Arc<NavMesh>`: the walkable space
///
/// # Optional inputs (have defaults)
///
/// | Method           | Default                                  |
/// |------------------|------------------------------------------|
/// | `.goals(v)`      | No goals (goal-driven agents stand still) |
/// | `.velocity(v)`   | `VelocityComponent::nav_mesh()` for all  |
/// | `.planner(p)`    | A fresh `PathPlanner` over the mesh      |
///
/// # Example
///
/// ```rust,ignore
/// let (store, neighbors) = AgentStoreBuilder::new(n).positions(spawns).build();
/// let mut sim = SimBuilder::new(config, mesh, store, neighbors)
///     .goals(goals)
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder {
    config:    SimConfig,
    mesh:      Arc<NavMesh>,
    agents:    AgentStore,
    neighbors: NeighborLists,
    goals:     Option<Vec<Option<Goal>>>,
    velocity:  Option<Vec<VelocityComponent>>,
    planner:   Option<Arc<PathPlanner>>,
}

impl SimBuilder {
    /// Create a builder with all required inputs.
    pub fn new(
        config:    SimConfig,
        mesh:      Arc<NavMesh>,
        agents:    AgentStore,
        neighbors: NeighborLists,
    ) -> Self {
        Self {
            config,
            mesh,
            agents,
            neighbors,
            goals:    None,
            velocity: None,
            planner:  None,
        }
    }

    /// Supply per-agent goals (must be length `agent_count`).
    pub fn goals(mut self, goals: Vec<Option<Goal>>) -> Self {
        self.goals = Some(goals);
        self
    }

    /// Give every agent the same goal.
    pub fn goal_for_all(self, goal: Goal) -> Self {
        let n = self.agents.len();
        self.goals(vec![Some(goal); n])
    }

    /// Supply per-agent velocity strategies (must be length `agent_count`).
    pub fn velocity(mut self, velocity: Vec<VelocityComponent>) -> Self {
        self.velocity = Some(velocity);
        self
    }

    /// Share a planner (and its route cache) built for the same mesh.
    pub fn planner(mut self, planner: Arc<PathPlanner>) -> Self {
        self.planner = Some(planner);
        self
    }

    /// Validate inputs, build the localizer, locate every agent, and return
    /// a ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim> {
        self.config.validate()?;
        let agent_count = self.agents.len();

        // ── Validate and resolve optional inputs ──────────────────────────
        if self.neighbors.len() != agent_count {
            return Err(SimError::AgentCountMismatch {
                expected: agent_count,
                got:      self.neighbors.len(),
                what:     "neighbor lists",
            });
        }

        let goals = match self.goals {
            Some(g) => {
                if g.len() != agent_count {
                    return Err(SimError::AgentCountMismatch {
                        expected: agent_count,
                        got:      g.len(),
                        what:     "goals",
                    });
                }
                g
            }
            None => vec![None; agent_count],
        };

        let velocity = match self.velocity {
            Some(v) => {
                if v.len() != agent_count {
                    return Err(SimError::AgentCountMismatch {
                        expected: agent_count,
                        got:      v.len(),
                        what:     "velocity components",
                    });
                }
                v
            }
            None => vec![VelocityComponent::nav_mesh(); agent_count],
        };

        let planner = match self.planner {
            Some(p) => {
                if !Arc::ptr_eq(p.mesh(), &self.mesh) {
                    return Err(SimError::Config(NavError::Config(
                        "planner was built for a different mesh".into(),
                    )));
                }
                p
            }
            None => Arc::new(PathPlanner::new(Arc::clone(&self.mesh))),
        };

        #[cfg(feature = "parallel")]
        if let Some(n) = self.config.num_threads {
            if let Err(e) = rayon::ThreadPoolBuilder::new().num_threads(n).build_global() {
                log::debug!("keeping the existing rayon pool: {e}");
            }
        }

        // ── Locate every agent before the first tick ──────────────────────
        let mut localizer = NavMeshLocalizer::new(Arc::clone(&self.mesh), agent_count)
            .with_planner(Arc::clone(&planner));
        localizer.update_all(&self.agents)?;
        let unplaced = localizer.locations().iter().filter(|l| !l.node().is_valid()).count();
        if unplaced > 0 {
            log::warn!("{unplaced} of {agent_count} agents start off the navigation mesh");
        }
        log::info!(
            "simulation ready: {agent_count} agents on {} nodes, step {}s",
            self.mesh.node_count(),
            self.config.time_step
        );

        Ok(Sim {
            clock:     self.config.make_clock(),
            config:    self.config,
            agents:    self.agents,
            neighbors: self.neighbors,
            goals,
            velocity,
            mesh:      self.mesh,
            planner,
            localizer,
        })
    }
}
