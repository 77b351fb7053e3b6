//! Neighbor queries that follow the mesh.
//!
//! An agent query starts in the node containing the query point and walks
//! outward through portals, breadth first.  Each node reached carries a
//! visibility cone: the directions from the query point that pass through
//! every portal crossed to get there.  Agents outside the cone are hidden
//! behind walls and skipped, and portals outside it are never entered.
//!
//! Candidates go to the caller's [`ProximityFilter`] as they are found.  The
//! search range is re-read after every candidate, so a filter that has
//! filled up shrinks the walk.

use std::collections::VecDeque;
use std::sync::RwLockReadGuard;

use nav_agent::{AgentStore, ProximityFilter};
use nav_core::{NodeId, Vector2, det, dist_sq_point_segment};
use nav_mesh::NavMesh;

use crate::localizer::{NavMeshLocalizer, Occupants};

#[cfg(feature = "fx-hash")]
type VisitedSet = rustc_hash::FxHashSet<NodeId>;
#[cfg(not(feature = "fx-hash"))]
type VisitedSet = std::collections::HashSet<NodeId>;

// ── VisibilityCone ────────────────────────────────────────────────────────────

/// The directions between `right` and `left` (counter-clockwise), taken
/// relative to the query point.
#[derive(Copy, Clone, Debug)]
struct VisibilityCone {
    left:  Vector2,
    right: Vector2,
}

impl VisibilityCone {
    /// The narrower cone spanned by `d0` and `d1`.
    fn new(d0: Vector2, d1: Vector2) -> Self {
        if det(d0, d1) > 0.0 {
            Self { left: d1, right: d0 }
        } else {
            Self { left: d0, right: d1 }
        }
    }

    #[inline]
    fn contains(&self, p: Vector2) -> bool {
        det(p, self.right) <= 0.0 && det(self.left, p) <= 0.0
    }

    /// Narrow `self` to its overlap with `other`; `false` if they do not
    /// overlap.
    fn intersect(&mut self, other: &VisibilityCone) -> bool {
        let right = if det(self.right, other.right) > 0.0 { other.right } else { self.right };
        let left = if det(self.left, other.left) > 0.0 { self.left } else { other.left };
        if det(right, left) > 0.0 {
            self.right = right;
            self.left = left;
            true
        } else {
            false
        }
    }
}

struct Frontier {
    dist_sq: f32,
    cone:    VisibilityCone,
    node:    NodeId,
}

// ── NavMeshSpatialQuery ───────────────────────────────────────────────────────

/// Agent and obstacle queries over one localizer's occupancy.
///
/// Holds a read lock on the occupancy sets for its lifetime; build one per
/// sensing pass, after locations have been updated.  Shareable across
/// threads.
pub struct NavMeshSpatialQuery<'a> {
    localizer: &'a NavMeshLocalizer,
    mesh:      &'a NavMesh,
    agents:    &'a AgentStore,
    occupants: RwLockReadGuard<'a, Occupants>,
}

impl<'a> NavMeshSpatialQuery<'a> {
    pub fn new(localizer: &'a NavMeshLocalizer, agents: &'a AgentStore) -> Self {
        Self {
            localizer,
            mesh: localizer.mesh(),
            agents,
            occupants: localizer.occupants(),
        }
    }

    /// The filter's hint if it is a real node, else a blind search.
    fn start_node(&self, filter: &impl ProximityFilter) -> Option<NodeId> {
        let hint = filter.query_node();
        if hint.index() < self.mesh.node_count() {
            Some(hint)
        } else {
            self.localizer.node_of_point(filter.query_point())
        }
    }

    /// Offer `filter` every agent visible from its query point within its
    /// agent range.
    pub fn agent_query(&self, filter: &mut impl ProximityFilter) {
        let pt = filter.query_point();
        let Some(start) = self.start_node(filter) else {
            log::warn!("agent query from ({}, {}) off the mesh", pt.x, pt.y);
            return;
        };
        let mut range_sq = filter.max_agent_range();

        // Same node: everyone is visible.
        for &id in &self.occupants[start.index()] {
            let dist_sq = self.agents.get(id).pos.distance_sq(pt);
            if dist_sq <= range_sq {
                filter.filter_agent(id, dist_sq);
                range_sq = filter.max_agent_range();
            }
        }

        let mut visited = VisitedSet::default();
        visited.insert(start);
        let mut queue = VecDeque::new();
        for &edge_id in &self.mesh.node(start).edges {
            let edge = self.mesh.edge(edge_id);
            let other = edge.other(start);
            visited.insert(other);
            let dist_sq = edge.sq_dist(pt);
            if dist_sq <= range_sq {
                let cone = VisibilityCone::new(edge.p0() - pt, edge.p1() - pt);
                queue.push_back(Frontier { dist_sq, cone, node: other });
            }
        }

        while let Some(entry) = queue.pop_front() {
            if entry.dist_sq > range_sq {
                continue;
            }
            for &id in &self.occupants[entry.node.index()] {
                let disp = self.agents.get(id).pos - pt;
                let dist_sq = disp.length_sq();
                if dist_sq <= range_sq {
                    if entry.cone.contains(disp) {
                        filter.filter_agent(id, dist_sq);
                    }
                    range_sq = filter.max_agent_range();
                }
            }

            for &edge_id in &self.mesh.node(entry.node).edges {
                let edge = self.mesh.edge(edge_id);
                let other = edge.other(entry.node);
                if !visited.insert(other) {
                    continue;
                }
                let dist_sq = edge.sq_dist(pt);
                if dist_sq <= range_sq {
                    let mut cone = VisibilityCone::new(edge.p0() - pt, edge.p1() - pt);
                    if cone.intersect(&entry.cone) {
                        queue.push_back(Frontier { dist_sq, cone, node: other });
                    }
                }
            }
        }
    }

    /// Offer `filter` the obstacles bounding the query point's node whose
    /// outer face it is on.
    pub fn obstacle_query(&self, filter: &mut impl ProximityFilter) {
        let pt = filter.query_point();
        let Some(node) = self.start_node(filter) else {
            log::warn!("obstacle query from ({}, {}) off the mesh", pt.x, pt.y);
            return;
        };
        for &id in &self.mesh.node(node).obstacles {
            let obst = self.mesh.obstacle(id);
            if obst.point_outside(pt) {
                let dist_sq = dist_sq_point_segment(obst.p0(), obst.p1(), pt);
                filter.filter_obstacle(id, obst.class, dist_sq);
            }
        }
    }
}
