//! The linked, immutable navigation mesh.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) holds each node's bounding box.  Blind
//! localization asks the tree for the boxes covering a point and runs the
//! exact polygon test only on those, instead of scanning every node.

use std::collections::BTreeMap;

use rstar::{AABB, Envelope, PointDistance, RTree, RTreeObject};

use nav_core::{EdgeId, NodeId, ObstacleId, Vector2, VertexId};

use crate::edge::NavMeshEdge;
use crate::node::NavMeshNode;
use crate::obstacle::NavMeshObstacle;

// ── R-tree node entry ─────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub(crate) struct NodeBox {
    pub(crate) aabb: AABB<[f32; 2]>,
    pub(crate) id:   NodeId,
}

impl RTreeObject for NodeBox {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.aabb
    }
}

impl PointDistance for NodeBox {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        self.aabb.distance_2(point)
    }

    fn contains_point(&self, point: &[f32; 2]) -> bool {
        self.aabb.contains_point(point)
    }
}

// ── NodeGroup ─────────────────────────────────────────────────────────────────

/// A named, contiguous run of nodes (e.g. "stairs", "plaza").
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NodeGroup {
    pub first: NodeId,
    pub count: u32,
}

impl NodeGroup {
    #[inline]
    pub fn len(&self) -> usize {
        self.count as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        node.0 >= self.first.0 && node.0 - self.first.0 < self.count
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + use<> {
        let first = self.first.0;
        (first..first + self.count).map(NodeId)
    }
}

// ── NavMesh ───────────────────────────────────────────────────────────────────

/// A fully linked navigation mesh.
///
/// All arrays are indexed by their typed ids.  Do not construct directly;
/// use [`NavMeshBuilder`](crate::NavMeshBuilder) or the loader.
pub struct NavMesh {
    pub vertices:  Vec<Vector2>,
    pub nodes:     Vec<NavMeshNode>,
    pub edges:     Vec<NavMeshEdge>,
    pub obstacles: Vec<NavMeshObstacle>,
    pub(crate) groups: BTreeMap<String, NodeGroup>,
    pub(crate) index:  RTree<NodeBox>,
}

impl NavMesh {
    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn obstacle_count(&self) -> usize {
        self.obstacles.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ── Element access ────────────────────────────────────────────────────

    #[inline]
    pub fn node(&self, id: NodeId) -> &NavMeshNode {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn edge(&self, id: EdgeId) -> &NavMeshEdge {
        &self.edges[id.index()]
    }

    #[inline]
    pub fn obstacle(&self, id: ObstacleId) -> &NavMeshObstacle {
        &self.obstacles[id.index()]
    }

    #[inline]
    pub fn vertex(&self, id: VertexId) -> Vector2 {
        self.vertices[id.index()]
    }

    // ── Topology ──────────────────────────────────────────────────────────

    /// `(edge, neighbor)` pairs of `node`.
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = (EdgeId, NodeId)> + '_ {
        self.node(node).edges.iter().map(move |&e| (e, self.edge(e).other(node)))
    }

    /// The portal joining `node` and `neighbor`, if they are adjacent.
    pub fn connection(&self, node: NodeId, neighbor: NodeId) -> Option<EdgeId> {
        self.neighbors(node).find(|&(_, n)| n == neighbor).map(|(e, _)| e)
    }

    // ── Groups ────────────────────────────────────────────────────────────

    pub fn group(&self, name: &str) -> Option<NodeGroup> {
        self.groups.get(name).copied()
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, NodeGroup)> + '_ {
        self.groups.iter().map(|(k, &g)| (k.as_str(), g))
    }

    // ── Geometry ──────────────────────────────────────────────────────────

    #[inline]
    pub fn elevation(&self, node: NodeId, p: Vector2) -> f32 {
        self.node(node).elevation(p)
    }

    #[inline]
    pub fn gradient(&self, node: NodeId) -> Vector2 {
        self.node(node).gradient()
    }

    /// Find the node containing `p` without any locality hint.
    ///
    /// Where nodes overlap in plan view (ramps, bridges), the node whose
    /// elevation at `p` is closest to `target_elevation` wins.  Returns
    /// `None` if `p` is off the mesh.
    pub fn find_node_blind(&self, p: Vector2, target_elevation: f32) -> Option<NodeId> {
        let mut best: Option<(NodeId, f32)> = None;
        for entry in self.index.locate_all_at_point(&[p.x, p.y]) {
            let node = self.node(entry.id);
            if !node.contains_point(p) {
                continue;
            }
            let diff = (node.elevation(p) - target_elevation).abs();
            match best {
                Some((id, d)) if d < diff || (d == diff && id < entry.id) => {}
                _ => best = Some((entry.id, diff)),
            }
        }
        best.map(|(id, _)| id)
    }
}
