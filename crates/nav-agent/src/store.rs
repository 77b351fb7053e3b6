//! Agent storage: `AgentStore` (kinematic state) and `NeighborLists`.
//!
//! # Why two structs?
//!
//! The sense phase fills every agent's neighbor lists in parallel while
//! reading every agent's position.  Holding the lists outside the store lets
//! the tick loop take `&mut NeighborLists` and `&AgentStore` at once:
//!
//! ```ignore
//! let store: &AgentStore = &sim.store;
//! sim.neighbors.inner
//!     .par_iter_mut()
//!     .zip(store.agents.par_iter())
//!     .for_each(|(nbrs, agent)| query.fill(agent, nbrs));
//! ```

use nav_core::{AgentId, NavError, NavResult};

use crate::agent::Agent;
use crate::neighbors::Neighborhood;

// ── NeighborLists ─────────────────────────────────────────────────────────────

/// Per-agent neighbor lists, indexed by `AgentId`.
pub struct NeighborLists {
    pub inner: Vec<Neighborhood>,
}

impl NeighborLists {
    pub(crate) fn new(count: usize) -> Self {
        Self { inner: vec![Neighborhood::default(); count] }
    }

    #[inline]
    pub fn get(&self, agent: AgentId) -> &Neighborhood {
        &self.inner[agent.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, agent: AgentId) -> &mut Neighborhood {
        &mut self.inner[agent.index()]
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

// ── AgentStore ────────────────────────────────────────────────────────────────

/// Dense agent storage.  `AgentId(i)` is `agents[i]`.
pub struct AgentStore {
    pub agents: Vec<Agent>,
}

impl AgentStore {
    #[inline]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Iterator over all `AgentId`s in ascending index order.
    pub fn agent_ids(&self) -> impl Iterator<Item = AgentId> + use<> {
        (0..self.agents.len() as u32).map(AgentId)
    }

    #[inline]
    pub fn get(&self, id: AgentId) -> &Agent {
        &self.agents[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: AgentId) -> &mut Agent {
        &mut self.agents[id.index()]
    }

    /// Bounds-checked lookup for ids that come from outside the simulation.
    pub fn try_get(&self, id: AgentId) -> NavResult<&Agent> {
        self.agents.get(id.index()).ok_or(NavError::AgentNotFound(id))
    }

    pub fn try_get_mut(&mut self, id: AgentId) -> NavResult<&mut Agent> {
        self.agents.get_mut(id.index()).ok_or(NavError::AgentNotFound(id))
    }

    pub(crate) fn new(agents: Vec<Agent>) -> Self {
        Self { agents }
    }
}
