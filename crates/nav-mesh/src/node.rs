//! Mesh nodes: convex polygons with a planar elevation function.

use nav_core::{EdgeId, NodeId, ObstacleId, Vector2, VertexId, det};

// ── Polygon ───────────────────────────────────────────────────────────────────

/// A node's boundary polygon with its corner positions resolved at build
/// time, an axis-aligned bounding box, and the elevation plane
/// `z = A x + B y + C`.
#[derive(Clone, Debug)]
pub struct Polygon {
    pub vertex_ids: Vec<VertexId>,
    /// Corner positions in `vertex_ids` order.
    pub corners:    Vec<Vector2>,
    pub a:          f32,
    pub b:          f32,
    pub c:          f32,
    pub min:        Vector2,
    pub max:        Vector2,
}

impl Polygon {
    pub(crate) fn new(vertex_ids: Vec<VertexId>, corners: Vec<Vector2>, plane: [f32; 3]) -> Self {
        let mut min = Vector2::new(f32::INFINITY, f32::INFINITY);
        let mut max = Vector2::new(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for p in &corners {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Self { vertex_ids, corners, a: plane[0], b: plane[1], c: plane[2], min, max }
    }

    /// Crossing-number containment test.  Points on the boundary count as
    /// inside; a horizontal ray grazing a vertex is counted once only when
    /// the polygon actually crosses the ray there.
    pub fn contains_point(&self, point: Vector2) -> bool {
        let (px, py) = (point.x, point.y);
        let n = self.corners.len();
        let mut count = 0u32;
        for e in 0..n {
            let p0 = self.corners[e];
            let p1 = self.corners[(e + 1) % n];
            if on_segment(p0, p1, point) {
                return true;
            }

            if p0.y == py && p0.x < px {
                let prev_y = self.corners[if e == 0 { n - 1 } else { e - 1 }].y;
                if (prev_y > py && p1.y > py) || (prev_y < py && p1.y < py) {
                    continue;
                }
                count += 1;
                continue;
            }

            if (p0.y > py && p1.y >= py) || (p0.y < py && p1.y <= py) || (p0.x > px && p1.x > px) {
                continue;
            }
            let t = (py - p0.y) / (p1.y - p0.y);
            let x = p0.x + t * (p1.x - p0.x);
            if x <= px {
                count += 1;
            }
        }
        count & 1 == 1
    }

    #[inline]
    pub fn elevation(&self, p: Vector2) -> f32 {
        self.a * p.x + self.b * p.y + self.c
    }

    /// Bounding-box test, used as a cheap pre-filter.
    #[inline]
    pub fn bbox_contains(&self, p: Vector2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// `p` lies exactly on the closed segment `a → b`.
#[inline]
fn on_segment(a: Vector2, b: Vector2, p: Vector2) -> bool {
    det(b - a, p - a) == 0.0
        && p.x >= a.x.min(b.x)
        && p.x <= a.x.max(b.x)
        && p.y >= a.y.min(b.y)
        && p.y <= a.y.max(b.y)
}

// ── NavMeshNode ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct NavMeshNode {
    pub id:        NodeId,
    /// Polygon centroid; the A* heuristic measures between these.
    pub center:    Vector2,
    pub poly:      Polygon,
    /// Portals to neighboring nodes.
    pub edges:     Vec<EdgeId>,
    /// Obstacle segments bordering this node.
    pub obstacles: Vec<ObstacleId>,
}

impl NavMeshNode {
    #[inline]
    pub fn contains_point(&self, p: Vector2) -> bool {
        self.poly.contains_point(p)
    }

    #[inline]
    pub fn elevation(&self, p: Vector2) -> f32 {
        self.poly.elevation(p)
    }

    /// `(A, B)` of the elevation plane.
    #[inline]
    pub fn gradient(&self) -> Vector2 {
        Vector2::new(self.poly.a, self.poly.b)
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn obstacle_count(&self) -> usize {
        self.obstacles.len()
    }
}
