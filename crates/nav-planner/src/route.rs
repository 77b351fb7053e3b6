//! Node-level routes expressed as a sequence of portals.

use nav_core::{EPS, EdgeId, NodeId, PrefVelocity, Vector2, det};
use nav_mesh::NavMeshEdge;

// ── WayPortal ─────────────────────────────────────────────────────────────────

/// One portal along a route: the edge to cross and the node the agent is in
/// while approaching it.
///
/// The edge geometry is copied in so a route can be used without the mesh.
#[derive(Clone, Debug)]
pub struct WayPortal {
    pub edge_id:    EdgeId,
    pub edge:       NavMeshEdge,
    /// The node on the near side of the portal.
    pub node:       NodeId,
    /// `true` if the edge's `p0` is on the left when crossing from `node`.
    pub p0_is_left: bool,
}

impl WayPortal {
    pub fn new(edge_id: EdgeId, edge: &NavMeshEdge, node: NodeId) -> Self {
        Self { edge_id, edge: edge.clone(), node, p0_is_left: edge.p0_on_left(node) }
    }

    /// Left end of the portal moved `offset` toward the right end.
    #[inline]
    pub fn left(&self, offset: f32) -> Vector2 {
        if self.p0_is_left { self.edge.p0_offset(offset) } else { self.edge.p1_offset(offset) }
    }

    /// Right end of the portal moved `offset` toward the left end.
    #[inline]
    pub fn right(&self, offset: f32) -> Vector2 {
        if self.p0_is_left { self.edge.p1_offset(offset) } else { self.edge.p0_offset(offset) }
    }

    /// Where the line through `point` along `dir` crosses the portal,
    /// clamped to the portal segment.  A line parallel to the portal
    /// yields the portal point nearest `point`.
    pub fn intersection_point(&self, point: Vector2, dir: Vector2) -> Vector2 {
        let e = &self.edge;
        let denom = det(dir, e.dir);
        let s = if denom.abs() <= EPS {
            (point - e.point).dot(e.dir)
        } else {
            det(dir, point - e.point) / denom
        };
        e.point + e.dir * s.clamp(0.0, e.width)
    }

    /// Directions from `pos` that cross this portal with `radius` clearance;
    /// `dir` is the desired heading.
    pub fn set_preferred_direction(&self, pos: Vector2, radius: f32, dir: Vector2, pvel: &mut PrefVelocity) {
        self.edge.set_clear_directions(pos, radius, dir, pvel);
    }
}

// ── PortalRoute ───────────────────────────────────────────────────────────────

/// A node sequence from `start` to `end` as the portals between them.
///
/// Routes are immutable once cached and shared as `Arc<PortalRoute>`.
#[derive(Clone, Debug)]
pub struct PortalRoute {
    pub start:     NodeId,
    pub end:       NodeId,
    pub portals:   Vec<WayPortal>,
    /// Width of the narrowest portal; infinite for a portal-free route.
    pub max_width: f32,
    /// Sum of node-to-node distances.
    pub length:    f32,
}

impl PortalRoute {
    pub fn new(start: NodeId, end: NodeId) -> Self {
        Self { start, end, portals: Vec::new(), max_width: f32::INFINITY, length: 0.0 }
    }

    /// Append the crossing of `edge` out of `node`.
    pub fn push_portal(&mut self, edge_id: EdgeId, edge: &NavMeshEdge, node: NodeId) {
        self.max_width = self.max_width.min(edge.width);
        self.length += edge.distance;
        self.portals.push(WayPortal::new(edge_id, edge, node));
    }

    #[inline]
    pub fn portal_count(&self) -> usize {
        self.portals.len()
    }

    #[inline]
    pub fn portal(&self, i: usize) -> &WayPortal {
        &self.portals[i]
    }

    /// Node the agent occupies before crossing portal `i`; the end node for
    /// `i == portal_count()`.
    pub fn node_at(&self, i: usize) -> NodeId {
        self.portals.get(i).map_or(self.end, |p| p.node)
    }

    /// Every node visited, start to end.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.portals.iter().map(|p| p.node).chain(std::iter::once(self.end))
    }

    /// `true` if both routes visit the same node sequence.
    pub fn is_equivalent(&self, other: &PortalRoute) -> bool {
        self.start == other.start
            && self.end == other.end
            && self.portals.len() == other.portals.len()
            && self
                .portals
                .iter()
                .zip(&other.portals)
                .all(|(a, b)| a.node == b.node)
    }
}
