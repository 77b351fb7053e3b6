//! Fluent builder for constructing `AgentStore` + `NeighborLists` in one step.
//!
//! # Usage
//!
//! ```rust
//! use nav_agent::{AgentParams, AgentStoreBuilder};
//! use nav_core::Vector2;
//!
//! let (store, nbrs) = AgentStoreBuilder::new(3)
//!     .params(AgentParams { radius: 0.25, ..AgentParams::default() })
//!     .positions([Vector2::new(0.0, 0.0), Vector2::new(1.0, 0.0)])
//!     .build();
//!
//! assert_eq!(store.len(), 3);
//! assert_eq!(nbrs.len(), 3);
//! // Agents without an explicit position start at the origin.
//! assert_eq!(store.agents[2].pos, Vector2::ZERO);
//! ```

use nav_core::{AgentId, Vector2};

use crate::agent::{Agent, AgentParams};
use crate::store::{AgentStore, NeighborLists};

pub struct AgentStoreBuilder {
    count:     usize,
    params:    AgentParams,
    positions: Vec<Vector2>,
}

impl AgentStoreBuilder {
    pub fn new(count: usize) -> Self {
        Self { count, params: AgentParams::default(), positions: Vec::new() }
    }

    /// Parameters shared by every agent.  Individual agents can be tuned
    /// afterwards through `store.agents[i].params`.
    pub fn params(mut self, params: AgentParams) -> Self {
        self.params = params;
        self
    }

    /// Initial positions in `AgentId` order.  Extra positions are ignored.
    pub fn positions(mut self, positions: impl IntoIterator<Item = Vector2>) -> Self {
        self.positions = positions.into_iter().take(self.count).collect();
        self
    }

    pub fn build(self) -> (AgentStore, NeighborLists) {
        let agents = (0..self.count)
            .map(|i| {
                let pos = self.positions.get(i).copied().unwrap_or(Vector2::ZERO);
                Agent::new(AgentId(i as u32), pos, self.params)
            })
            .collect();
        (AgentStore::new(agents), NeighborLists::new(self.count))
    }
}
