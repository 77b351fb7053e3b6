//! Per-agent ORCA driver.

use nav_agent::{Agent, AgentStore, Neighborhood};
use nav_core::{Line, Vector2, left_of};
use nav_mesh::NavMesh;

use crate::lines::{agent_line, obstacle_line};
use crate::lp::{linear_program2, linear_program3};

/// Reusable half-plane buffer.
///
/// One solver per worker thread; `compute_new_velocity` clears and refills
/// the buffer for each agent so no allocation happens after warm-up.
#[derive(Debug, Default)]
pub struct OrcaSolver {
    lines:          Vec<Line>,
    num_obst_lines: usize,
}

impl OrcaSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines built by the most recent call; obstacle lines first.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Number of leading obstacle lines in [`lines`](Self::lines).
    pub fn num_obstacle_lines(&self) -> usize {
        self.num_obst_lines
    }

    /// Build the ORCA lines of `agent` from its neighborhood.  `agents` is
    /// the state every agent published at the end of the previous tick.
    pub fn compute_orca_lines(
        &mut self,
        agent: &Agent,
        nbrs: &Neighborhood,
        agents: &AgentStore,
        mesh: &NavMesh,
        time_step: f32,
    ) {
        self.lines.clear();

        let inv_tau_obst = 1.0 / agent.params.time_horizon_obst;
        for near in &nbrs.obstacles {
            let obst = mesh.obstacle(near.obstacle);
            let agent_on_right = left_of(obst.p0(), obst.p1(), agent.pos) < 0.0;
            let flip = !agent_on_right && obst.double_sided;
            obstacle_line(&mut self.lines, agent, obst, mesh, inv_tau_obst, flip);
        }
        self.num_obst_lines = self.lines.len();

        let inv_tau = 1.0 / agent.params.time_horizon;
        for near in &nbrs.agents {
            let other = agents.get(near.agent);
            self.lines.push(agent_line(agent, other, inv_tau, time_step));
        }
    }

    /// The admissible velocity closest to `agent`'s preferred velocity,
    /// never faster than its max speed.  Infeasible agent constraints are
    /// relaxed; obstacle constraints never are.
    pub fn compute_new_velocity(
        &mut self,
        agent: &Agent,
        nbrs: &Neighborhood,
        agents: &AgentStore,
        mesh: &NavMesh,
        time_step: f32,
    ) -> Vector2 {
        self.compute_orca_lines(agent, nbrs, agents, mesh, time_step);

        let max_speed = agent.max_speed();
        let pref_vel = agent.pref.preferred_velocity();
        let mut result = Vector2::ZERO;
        let line_fail = linear_program2(&self.lines, max_speed, pref_vel, false, &mut result);
        if line_fail < self.lines.len() {
            log::trace!("{} infeasible at line {line_fail}/{}", agent.id, self.lines.len());
            linear_program3(&self.lines, self.num_obst_lines, line_fail, max_speed, &mut result);
        }
        result
    }
}
