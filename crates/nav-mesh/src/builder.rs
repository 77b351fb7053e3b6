//! Two-phase mesh construction.
//!
//! Phase one collects raw records that refer to each other by index.  Phase
//! two ([`NavMeshBuilder::build`]) checks every index and rejects degenerate
//! geometry.  A node may only list edges and obstacles that border it.  The
//! checked records are then resolved into a linked [`NavMesh`].

use std::collections::BTreeMap;

use rstar::{AABB, RTree};

use nav_core::{EdgeId, NodeId, ObstacleId, Vector2, VertexId, det, left_of};

use crate::edge::NavMeshEdge;
use crate::error::{MeshError, MeshResult};
use crate::mesh::{NavMesh, NodeBox, NodeGroup};
use crate::node::{NavMeshNode, Polygon};
use crate::obstacle::NavMeshObstacle;
use crate::MIN_EDGE_WIDTH;

/// Raw description of one node.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeSpec {
    pub center:    Vector2,
    /// Polygon vertices in counter-clockwise order.
    pub vertices:  Vec<VertexId>,
    /// Elevation plane coefficients `[A, B, C]`.
    pub plane:     [f32; 3],
    pub edges:     Vec<EdgeId>,
    pub obstacles: Vec<ObstacleId>,
}

#[derive(Clone, Debug)]
struct RawEdge {
    v0: VertexId,
    v1: VertexId,
    n0: NodeId,
    n1: NodeId,
}

#[derive(Clone, Debug)]
struct RawObstacle {
    v0:   VertexId,
    v1:   VertexId,
    node: NodeId,
    next: Option<ObstacleId>,
}

/// Collects raw mesh data, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use nav_core::Vector2;
/// use nav_mesh::{NavMeshBuilder, NodeSpec};
///
/// let mut b = NavMeshBuilder::new();
/// let v: Vec<_> = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]
///     .into_iter()
///     .map(|(x, y)| b.add_vertex(Vector2::new(x, y)))
///     .collect();
/// b.add_group("floor", vec![NodeSpec {
///     center: Vector2::new(0.5, 0.5),
///     vertices: v,
///     ..NodeSpec::default()
/// }]).unwrap();
/// let mesh = b.build().unwrap();
/// assert_eq!(mesh.node_count(), 1);
/// ```
#[derive(Default)]
pub struct NavMeshBuilder {
    vertices:  Vec<Vector2>,
    edges:     Vec<RawEdge>,
    obstacles: Vec<RawObstacle>,
    nodes:     Vec<NodeSpec>,
    groups:    BTreeMap<String, NodeGroup>,
}

impl NavMeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize, edges: usize, obstacles: usize, nodes: usize) -> Self {
        Self {
            vertices:  Vec::with_capacity(vertices),
            edges:     Vec::with_capacity(edges),
            obstacles: Vec::with_capacity(obstacles),
            nodes:     Vec::with_capacity(nodes),
            groups:    BTreeMap::new(),
        }
    }

    pub fn add_vertex(&mut self, p: Vector2) -> VertexId {
        let id = VertexId(self.vertices.len() as u32);
        self.vertices.push(p);
        id
    }

    /// Add a portal from vertex `v0` to `v1` joining nodes `n0` and `n1`.
    /// Node order does not matter; `build` orients it.
    pub fn add_edge(&mut self, v0: VertexId, v1: VertexId, n0: NodeId, n1: NodeId) -> EdgeId {
        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(RawEdge { v0, v1, n0, n1 });
        id
    }

    /// Add an obstacle segment `v0 → v1` bordering `node`, optionally
    /// continued by `next`.
    pub fn add_obstacle(
        &mut self,
        v0: VertexId,
        v1: VertexId,
        node: NodeId,
        next: Option<ObstacleId>,
    ) -> ObstacleId {
        let id = ObstacleId(self.obstacles.len() as u32);
        self.obstacles.push(RawObstacle { v0, v1, node, next });
        id
    }

    /// Append a named group of nodes.  Returns the id of its first node;
    /// the rest follow consecutively.
    pub fn add_group(&mut self, name: impl Into<String>, nodes: Vec<NodeSpec>) -> MeshResult<NodeId> {
        let name = name.into();
        if self.groups.contains_key(&name) {
            log::error!("navigation mesh has two groups named {name:?}");
            return Err(MeshError::DuplicateGroup(name));
        }
        let first = NodeId(self.nodes.len() as u32);
        self.groups.insert(name, NodeGroup { first, count: nodes.len() as u32 });
        self.nodes.extend(nodes);
        Ok(first)
    }

    pub fn vertex_count(&self) -> usize { self.vertices.len() }
    pub fn node_count(&self) -> usize { self.nodes.len() }

    /// Validate and link.
    pub fn build(self) -> MeshResult<NavMesh> {
        let n_vert = self.vertices.len();
        let n_node = self.nodes.len();
        let n_edge = self.edges.len();
        let n_obst = self.obstacles.len();

        // ── Edges ─────────────────────────────────────────────────────────
        let mut edges = Vec::with_capacity(n_edge);
        for (i, raw) in self.edges.iter().enumerate() {
            let id = EdgeId(i as u32);
            check("vertex", raw.v0.index(), n_vert)?;
            check("vertex", raw.v1.index(), n_vert)?;
            check("node", raw.n0.index(), n_node)?;
            check("node", raw.n1.index(), n_node)?;

            let point = self.vertices[raw.v0.index()];
            let disp = self.vertices[raw.v1.index()] - point;
            let width = disp.length();
            if width <= MIN_EDGE_WIDTH {
                log::error!("navigation mesh edge {id} is too narrow (width = {width})");
                return Err(MeshError::DegenerateEdge { edge: id, width });
            }

            let c0 = self.nodes[raw.n0.index()].center;
            let c1 = self.nodes[raw.n1.index()].center;
            let dir = disp / width;
            let (node0, node1) = if det(dir, c0 - point) > 0.0 {
                (raw.n1, raw.n0)
            } else {
                (raw.n0, raw.n1)
            };
            edges.push(NavMeshEdge { point, dir, width, distance: c0.distance(c1), node0, node1 });
        }

        // ── Obstacles ─────────────────────────────────────────────────────
        let mut obstacles = Vec::with_capacity(n_obst);
        for (i, raw) in self.obstacles.iter().enumerate() {
            let id = ObstacleId(i as u32);
            check("vertex", raw.v0.index(), n_vert)?;
            check("vertex", raw.v1.index(), n_vert)?;
            check("node", raw.node.index(), n_node)?;
            if let Some(next) = raw.next {
                check("obstacle", next.index(), n_obst)?;
            }

            let point = self.vertices[raw.v0.index()];
            let disp = self.vertices[raw.v1.index()] - point;
            let length = disp.length();
            if length <= MIN_EDGE_WIDTH {
                log::error!("navigation mesh obstacle {id} is too short (length = {length})");
                return Err(MeshError::DegenerateObstacle { obstacle: id, length });
            }
            obstacles.push(NavMeshObstacle {
                id,
                point,
                unit_dir:     disp / length,
                length,
                node:         raw.node,
                next:         raw.next,
                prev:         None,
                double_sided: false,
                is_convex:    true,
                class:        NavMeshObstacle::DEFAULT_CLASS,
                end:          point + disp,
                next_convex:  None,
            });
        }
        link_obstacles(&mut obstacles);

        // ── Nodes ─────────────────────────────────────────────────────────
        let mut nodes = Vec::with_capacity(n_node);
        for (i, spec) in self.nodes.into_iter().enumerate() {
            let id = NodeId(i as u32);
            if spec.vertices.len() < 3 {
                log::error!("navigation mesh node {id} has a degenerate polygon");
                return Err(MeshError::BadPolygon { node: id, vertices: spec.vertices.len() });
            }
            for v in &spec.vertices {
                check("vertex", v.index(), n_vert)?;
            }
            for &e in &spec.edges {
                check("edge", e.index(), n_edge)?;
                let edge = &edges[e.index()];
                if edge.node0 != id && edge.node1 != id {
                    log::error!("navigation mesh node {id} lists edge {e}, which does not border it");
                    return Err(MeshError::EdgeNotIncident { node: id, edge: e });
                }
            }
            for &o in &spec.obstacles {
                check("obstacle", o.index(), n_obst)?;
                let owner = obstacles[o.index()].node;
                if owner != id {
                    log::error!("navigation mesh node {id} lists obstacle {o}, which borders node {owner}");
                    return Err(MeshError::ObstacleNotIncident { node: id, obstacle: o, owner });
                }
            }
            let corners = spec.vertices.iter().map(|v| self.vertices[v.index()]).collect();
            nodes.push(NavMeshNode {
                id,
                center:    spec.center,
                poly:      Polygon::new(spec.vertices, corners, spec.plane),
                edges:     spec.edges,
                obstacles: spec.obstacles,
            });
        }

        // ── Spatial index ─────────────────────────────────────────────────
        let entries: Vec<NodeBox> = nodes
            .iter()
            .map(|n| NodeBox {
                aabb: AABB::from_corners([n.poly.min.x, n.poly.min.y], [n.poly.max.x, n.poly.max.y]),
                id:   n.id,
            })
            .collect();
        let index = RTree::bulk_load(entries);

        log::info!(
            "navigation mesh built: {} vertices, {} nodes in {} groups, {} edges, {} obstacles",
            n_vert,
            n_node,
            self.groups.len(),
            n_edge,
            n_obst,
        );

        Ok(NavMesh {
            vertices: self.vertices,
            nodes,
            edges,
            obstacles,
            groups: self.groups,
            index,
        })
    }
}

fn check(what: &'static str, index: usize, len: usize) -> MeshResult<()> {
    if index < len {
        Ok(())
    } else {
        log::error!("navigation mesh refers to {what} {index} of {len}");
        Err(MeshError::IndexOutOfRange { what, index, len })
    }
}

/// Resolve `prev` links, chain end points, sidedness, and vertex convexity.
fn link_obstacles(obstacles: &mut [NavMeshObstacle]) {
    let n = obstacles.len();
    for i in 0..n {
        if let Some(next) = obstacles[i].next {
            obstacles[next.index()].prev = Some(ObstacleId(i as u32));
            obstacles[i].end = obstacles[next.index()].point;
        }
    }

    // A chain that never returns to its start is open, hence double sided.
    let mut processed = vec![false; n];
    for start in 0..n {
        if processed[start] {
            continue;
        }
        let mut curr = Some(start);
        while let Some(c) = curr {
            if processed[c] {
                break;
            }
            processed[c] = true;
            curr = obstacles[c].next.map(ObstacleId::index);
        }
        if curr != Some(start) {
            let mut marked = vec![false; n];
            let mut o = Some(start);
            while let Some(c) = o {
                if marked[c] {
                    break;
                }
                marked[c] = true;
                obstacles[c].double_sided = true;
                o = obstacles[c].next.map(ObstacleId::index);
            }
        }
    }

    for i in 0..n {
        obstacles[i].is_convex = match obstacles[i].prev {
            Some(prev) => {
                let prev_p0 = obstacles[prev.index()].point;
                left_of(prev_p0, obstacles[i].point, obstacles[i].end) >= 0.0
            }
            None => true,
        };
    }
    for i in 0..n {
        obstacles[i].next_convex = obstacles[i].next.map(|next| obstacles[next.index()].is_convex);
    }
}
