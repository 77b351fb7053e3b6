//! Agent location tracking and node occupancy.

use std::collections::BTreeSet;
use std::sync::{Arc, RwLock, RwLockReadGuard};

use nav_agent::{Agent, AgentStore};
use nav_core::{AgentId, NodeId, Vector2};
use nav_mesh::NavMesh;
use nav_path::PortalPath;
use nav_planner::PathPlanner;

use crate::error::{LocalizerError, LocalizerResult};
use crate::query::NavMeshSpatialQuery;

/// Agents per node, plus one trailing slot for agents on no node.
pub type Occupants = Vec<BTreeSet<AgentId>>;

// ── NavMeshLocation ───────────────────────────────────────────────────────────

/// Where one agent is: a bare node, or the path it is following.
#[derive(Clone, Debug)]
pub enum NavMeshLocation {
    /// `NodeId::INVALID` until the agent has been found on the mesh.
    Node(NodeId),
    Path(Box<PortalPath>),
}

impl Default for NavMeshLocation {
    fn default() -> Self {
        NavMeshLocation::Node(NodeId::INVALID)
    }
}

impl NavMeshLocation {
    #[inline]
    pub fn node(&self) -> NodeId {
        match self {
            NavMeshLocation::Node(node) => *node,
            NavMeshLocation::Path(path) => path.current_node(),
        }
    }

    #[inline]
    pub fn is_path(&self) -> bool {
        matches!(self, NavMeshLocation::Path(_))
    }

    pub fn path(&self) -> Option<&PortalPath> {
        match self {
            NavMeshLocation::Path(path) => Some(&**path),
            NavMeshLocation::Node(_) => None,
        }
    }

    pub fn path_mut(&mut self) -> Option<&mut PortalPath> {
        match self {
            NavMeshLocation::Path(path) => Some(&mut **path),
            NavMeshLocation::Node(_) => None,
        }
    }

    /// Start following `path`.  Any previous path is dropped.
    pub fn set_path(&mut self, path: PortalPath) {
        *self = NavMeshLocation::Path(Box::new(path));
    }

    /// Stop following a path, keeping the node the path had reached.
    pub fn clear_path(&mut self) {
        if let NavMeshLocation::Path(path) = self {
            *self = NavMeshLocation::Node(path.current_node());
        }
    }
}

// ── NavMeshLocalizer ──────────────────────────────────────────────────────────

/// Tracks every agent's location on one mesh.
///
/// Locations are owned per agent and updated through `&mut self`, so the
/// per-agent work of [`update_all`](Self::update_all) splits across threads
/// without locking.  The occupancy sets are shared between agents and sit
/// behind an `RwLock`; writers hold it only while moving one id between two
/// sets.
pub struct NavMeshLocalizer {
    mesh:      Arc<NavMesh>,
    planner:   Arc<PathPlanner>,
    locations: Vec<NavMeshLocation>,
    occupants: RwLock<Occupants>,
}

impl NavMeshLocalizer {
    /// Localizer for `agent_count` agents, all initially unlocated, with a
    /// planner of its own.
    pub fn new(mesh: Arc<NavMesh>, agent_count: usize) -> Self {
        let planner = Arc::new(PathPlanner::new(Arc::clone(&mesh)));
        let occupants = vec![BTreeSet::new(); mesh.node_count() + 1];
        Self {
            mesh,
            planner,
            locations: vec![NavMeshLocation::default(); agent_count],
            occupants: RwLock::new(occupants),
        }
    }

    /// Share an existing planner (and its route cache) for replanning.
    pub fn with_planner(mut self, planner: Arc<PathPlanner>) -> Self {
        debug_assert!(Arc::ptr_eq(planner.mesh(), &self.mesh), "planner built for another mesh");
        self.planner = planner;
        self
    }

    #[inline]
    pub fn mesh(&self) -> &Arc<NavMesh> {
        &self.mesh
    }

    #[inline]
    pub fn planner(&self) -> &Arc<PathPlanner> {
        &self.planner
    }

    #[inline]
    pub fn agent_count(&self) -> usize {
        self.locations.len()
    }

    fn slot(&self, agent: AgentId) -> LocalizerResult<usize> {
        let i = agent.index();
        if i < self.locations.len() {
            Ok(i)
        } else {
            Err(LocalizerError::UnknownAgent { agent, count: self.locations.len() })
        }
    }

    // ── Updates ───────────────────────────────────────────────────────────

    /// Re-locate `agent` after it has moved and return its node.
    ///
    /// An agent on a path defers to the path, which may replan.  Otherwise
    /// the last known node is tested, then its neighbors, then the whole
    /// mesh.  An agent found nowhere keeps its previous node.
    pub fn update_location(&mut self, agent: &Agent) -> LocalizerResult<NodeId> {
        let i = self.slot(agent.id)?;
        locate(&mut self.locations[i], agent, &self.mesh, &self.planner, &self.occupants)
    }

    /// [`update_location`](Self::update_location) for every agent in the
    /// store.
    pub fn update_all(&mut self, agents: &AgentStore) -> LocalizerResult<()> {
        if agents.len() != self.locations.len() {
            return Err(LocalizerError::AgentCountMismatch {
                expected: self.locations.len(),
                got:      agents.len(),
            });
        }

        // Explicit field borrows so the borrow checker sees disjoint access.
        let mesh      = &*self.mesh;
        let planner   = &*self.planner;
        let occupants = &self.occupants;
        let locations = &mut self.locations;

        #[cfg(not(feature = "parallel"))]
        {
            locations
                .iter_mut()
                .zip(&agents.agents)
                .try_for_each(|(loc, agent)| locate(loc, agent, mesh, planner, occupants).map(drop))
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            locations
                .par_iter_mut()
                .zip(agents.agents.par_iter())
                .try_for_each(|(loc, agent)| locate(loc, agent, mesh, planner, occupants).map(drop))
        }
    }

    // ── Lookups ───────────────────────────────────────────────────────────

    /// Node containing `p`, found by searching the whole mesh.
    pub fn node_of_point(&self, p: Vector2) -> Option<NodeId> {
        self.mesh.find_node_blind(p, 0.0)
    }

    /// The node `agent` was last located in; `None` if it never has been.
    pub fn node_of_agent(&self, agent: AgentId) -> Option<NodeId> {
        self.locations
            .get(agent.index())
            .map(NavMeshLocation::node)
            .filter(|n| n.is_valid())
    }

    pub fn location(&self, agent: AgentId) -> Option<&NavMeshLocation> {
        self.locations.get(agent.index())
    }

    pub fn locations(&self) -> &[NavMeshLocation] {
        &self.locations
    }

    /// Mutable access to every location, for per-agent steering passes.
    ///
    /// Callers must not change the node a location reports; occupancy is
    /// reconciled only by the update and `set_*` methods.
    pub fn locations_mut(&mut self) -> &mut [NavMeshLocation] {
        &mut self.locations
    }

    pub fn path(&self, agent: AgentId) -> Option<&PortalPath> {
        self.locations.get(agent.index())?.path()
    }

    pub fn path_mut(&mut self, agent: AgentId) -> Option<&mut PortalPath> {
        self.locations.get_mut(agent.index())?.path_mut()
    }

    /// Read access to the occupancy sets.
    pub fn occupants(&self) -> RwLockReadGuard<'_, Occupants> {
        self.occupants.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Agents currently located in `node`.
    pub fn occupants_of(&self, node: NodeId) -> Vec<AgentId> {
        self.occupants().get(node.index()).map_or_else(Vec::new, |s| s.iter().copied().collect())
    }

    /// Neighbor queries over the current occupancy.
    pub fn spatial_query<'a>(&'a self, agents: &'a AgentStore) -> NavMeshSpatialQuery<'a> {
        NavMeshSpatialQuery::new(self, agents)
    }

    // ── Direct placement ──────────────────────────────────────────────────

    /// Place `agent` in `node`, dropping any path it was following.
    pub fn set_node(&mut self, agent: AgentId, node: NodeId) -> LocalizerResult<()> {
        let count = self.mesh.node_count();
        if node.index() >= count {
            return Err(LocalizerError::InvalidNode { node, count });
        }
        let i = self.slot(agent)?;
        let old = self.locations[i].node();
        self.locations[i] = NavMeshLocation::Node(node);
        if old != node {
            move_occupant(&self.occupants, agent, old, node, count);
        }
        Ok(())
    }

    /// Have `agent` follow `path` from now on.
    pub fn set_path(&mut self, agent: AgentId, path: PortalPath) -> LocalizerResult<()> {
        let i = self.slot(agent)?;
        let old = self.locations[i].node();
        let new = path.current_node();
        self.locations[i].set_path(path);
        if old != new {
            move_occupant(&self.occupants, agent, old, new, self.mesh.node_count());
        }
        Ok(())
    }

    /// Forget `agent`'s path; it stays located in the node the path reached.
    pub fn clear_path(&mut self, agent: AgentId) -> LocalizerResult<()> {
        let i = self.slot(agent)?;
        self.locations[i].clear_path();
        Ok(())
    }
}

// ── Per-agent update ──────────────────────────────────────────────────────────

fn locate(
    loc: &mut NavMeshLocation,
    agent: &Agent,
    mesh: &NavMesh,
    planner: &PathPlanner,
    occupants: &RwLock<Occupants>,
) -> LocalizerResult<NodeId> {
    let old = loc.node();
    let new = match loc {
        NavMeshLocation::Path(path) => path.update_location(agent, mesh, planner)?,
        NavMeshLocation::Node(node) => {
            let p = agent.pos;
            let found = if node.is_valid() {
                let curr = mesh.node(*node);
                if curr.contains_point(p) {
                    Some(*node)
                } else {
                    mesh.neighbors(*node)
                        .map(|(_, n)| n)
                        .find(|&n| mesh.node(n).contains_point(p))
                        .or_else(|| mesh.find_node_blind(p, curr.elevation(p)))
                }
            } else {
                mesh.find_node_blind(p, 0.0)
            };
            match found {
                Some(n) => *node = n,
                None => log::warn!("agent {} at ({}, {}) is not on the mesh", agent.id, p.x, p.y),
            }
            *node
        }
    };

    if new != old {
        move_occupant(occupants, agent.id, old, new, mesh.node_count());
    }
    Ok(new)
}

/// Move `agent` from `old`'s occupant set to `new`'s.  Invalid ids map to
/// the trailing "no node" slot.
fn move_occupant(
    occupants: &RwLock<Occupants>,
    agent: AgentId,
    old: NodeId,
    new: NodeId,
    node_count: usize,
) {
    let slot = |n: NodeId| if n.index() < node_count { n.index() } else { node_count };
    let mut sets = occupants.write().unwrap_or_else(|e| e.into_inner());

    if !sets[slot(old)].remove(&agent) && old.is_valid() {
        log::error!("agent {agent} was not recorded in {old}; searching all nodes");
        if let Some(found) = sets.iter().position(|s| s.contains(&agent)) {
            log::error!("found agent {agent} in slot {found}");
            sets[found].remove(&agent);
        }
    }
    sets[slot(new)].insert(agent);
}
