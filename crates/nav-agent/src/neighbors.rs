//! Neighbor candidate lists and the proximity-filter protocol.
//!
//! Spatial queries discover candidates incrementally and hand each one to a
//! [`ProximityFilter`].  The filter decides whether to keep it and may
//! shrink the search range as its result set fills, letting the query stop
//! early.

use nav_core::{AgentId, NodeId, ObstacleId, Vector2};

use crate::agent::Agent;

/// Receiver for spatial-query candidates.
pub trait ProximityFilter {
    /// Centre of the query.
    fn query_point(&self) -> Vector2;

    /// Node believed to contain the query point, or `NodeId::INVALID` if
    /// unknown.
    fn query_node(&self) -> NodeId {
        NodeId::INVALID
    }

    /// Current squared search radius for agents.
    fn max_agent_range(&self) -> f32;

    /// Current squared search radius for obstacles.
    fn max_obstacle_range(&self) -> f32;

    fn filter_agent(&mut self, agent: AgentId, dist_sq: f32);

    fn filter_obstacle(&mut self, obstacle: ObstacleId, class: u32, dist_sq: f32);
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NearAgent {
    pub dist_sq: f32,
    pub agent:   AgentId,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NearObstacle {
    pub dist_sq:  f32,
    pub obstacle: ObstacleId,
}

// ── Neighborhood ──────────────────────────────────────────────────────────────

/// One agent's near-agent and near-obstacle lists, each sorted by ascending
/// squared distance.
#[derive(Clone, Debug, Default)]
pub struct Neighborhood {
    pub agents:    Vec<NearAgent>,
    pub obstacles: Vec<NearObstacle>,
    owner:         AgentId,
    point:         Vector2,
    node:          NodeId,
    max_neighbors: usize,
    range_sq:      f32,
    obstacle_set:  u32,
}

impl Neighborhood {
    /// Clear both lists and configure the filter for `agent` located in
    /// `node`.
    pub fn start_query(&mut self, agent: &Agent, node: NodeId) {
        self.agents.clear();
        self.obstacles.clear();
        self.owner = agent.id;
        self.point = agent.pos;
        self.node = node;
        self.max_neighbors = agent.params.max_neighbors;
        self.range_sq = agent.params.neighbor_dist * agent.params.neighbor_dist;
        self.obstacle_set = agent.params.obstacle_set;
    }

    #[inline]
    pub fn owner(&self) -> AgentId {
        self.owner
    }

    #[inline]
    fn is_full(&self) -> bool {
        self.agents.len() == self.max_neighbors
    }

    /// Sorted insert capped at `max_neighbors`; when full, a closer
    /// candidate evicts the farthest.
    pub fn insert_agent(&mut self, agent: AgentId, dist_sq: f32) {
        if agent == self.owner || self.max_neighbors == 0 {
            return;
        }
        if self.is_full() && dist_sq > self.max_agent_range() {
            return;
        }
        let entry = NearAgent { dist_sq, agent };
        if !self.is_full() {
            self.agents.push(entry);
        }
        let mut i = self.agents.len() - 1;
        while i != 0 && dist_sq < self.agents[i - 1].dist_sq {
            self.agents[i] = self.agents[i - 1];
            i -= 1;
        }
        self.agents[i] = entry;
    }

    /// Sorted insert of an obstacle whose class intersects the agent's
    /// obstacle set and which lies within the neighbor radius.
    pub fn insert_obstacle(&mut self, obstacle: ObstacleId, class: u32, dist_sq: f32) {
        if class & self.obstacle_set == 0 || dist_sq >= self.range_sq {
            return;
        }
        let at = self.obstacles.partition_point(|o| o.dist_sq <= dist_sq);
        self.obstacles.insert(at, NearObstacle { dist_sq, obstacle });
    }
}

impl ProximityFilter for Neighborhood {
    fn query_point(&self) -> Vector2 {
        self.point
    }

    fn query_node(&self) -> NodeId {
        self.node
    }

    fn max_agent_range(&self) -> f32 {
        match self.agents.last() {
            Some(last) if self.is_full() => last.dist_sq,
            _ => self.range_sq,
        }
    }

    fn max_obstacle_range(&self) -> f32 {
        self.range_sq
    }

    fn filter_agent(&mut self, agent: AgentId, dist_sq: f32) {
        self.insert_agent(agent, dist_sq);
    }

    fn filter_obstacle(&mut self, obstacle: ObstacleId, class: u32, dist_sq: f32) {
        self.insert_obstacle(obstacle, class, dist_sq);
    }
}
