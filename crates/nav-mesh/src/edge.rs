//! Portal edges between adjacent nodes.
//!
//! An edge is the segment `point → point + dir * width`.  After build,
//! `node0` lies on the right of `dir` and `node1` on the left, so from
//! `node0` the edge's `p0` end is on the agent's left.

use nav_core::{NodeId, PrefVelocity, Vector2, det};

#[derive(Clone, Debug)]
pub struct NavMeshEdge {
    pub point:    Vector2,
    /// Unit direction from `p0` to `p1`.
    pub dir:      Vector2,
    pub width:    f32,
    /// Distance between the centers of the two incident nodes.
    pub distance: f32,
    pub node0:    NodeId,
    pub node1:    NodeId,
}

impl NavMeshEdge {
    #[inline]
    pub fn p0(&self) -> Vector2 {
        self.point
    }

    #[inline]
    pub fn p1(&self) -> Vector2 {
        self.point + self.dir * self.width
    }

    /// `p0` moved `offset` along the edge toward `p1`.
    #[inline]
    pub fn p0_offset(&self, offset: f32) -> Vector2 {
        self.point + self.dir * offset
    }

    /// `p1` moved `offset` along the edge toward `p0`.
    #[inline]
    pub fn p1_offset(&self, offset: f32) -> Vector2 {
        self.point + self.dir * (self.width - offset)
    }

    pub fn midpoint(&self) -> Vector2 {
        self.point + self.dir * (0.5 * self.width)
    }

    /// The node across the edge from `node`.
    #[inline]
    pub fn other(&self, node: NodeId) -> NodeId {
        debug_assert!(node == self.node0 || node == self.node1, "{node} not incident to edge");
        if node == self.node0 { self.node1 } else { self.node0 }
    }

    /// `true` if `p0` is on the left when crossing from `node`.
    #[inline]
    pub fn p0_on_left(&self, node: NodeId) -> bool {
        node == self.node0
    }

    /// Squared distance from `pt` to the edge segment.
    pub fn sq_dist(&self, pt: Vector2) -> f32 {
        let disp = pt - self.point;
        let t = disp.dot(self.dir);
        if t <= 0.0 {
            disp.length_sq()
        } else if t >= self.width {
            (pt - self.p1()).length_sq()
        } else {
            let d = det(self.dir, disp);
            d * d
        }
    }

    /// Traversal cost for an agent needing `min_width`; `None` if the
    /// portal is too narrow.
    #[inline]
    pub fn node_distance(&self, min_width: f32) -> Option<f32> {
        if min_width > self.width { None } else { Some(self.distance) }
    }

    /// Write into `pvel` the cone of directions from `pos` that pass
    /// through the portal with `radius` clearance at both endpoints.
    /// `dir` is the desired (not necessarily unit) heading.
    ///
    /// A well-formed cone becomes a span with the preferred direction
    /// clamped into it.  When the agent approaches so obliquely that no
    /// straight line clears both endpoints, the direction that clears the
    /// nearer endpoint is used alone.
    pub fn set_clear_directions(&self, pos: Vector2, radius: f32, dir: Vector2, pvel: &mut PrefVelocity) {
        let mut d0 = self.point - pos;
        let mut d1 = self.p1() - pos;
        let mut portal_dir = self.dir;
        if det(d1, d0) < 0.0 {
            std::mem::swap(&mut d0, &mut d1);
            portal_dir = -portal_dir;
        }

        let r2 = radius * radius;
        let d2 = d0.length_sq();
        if d2 < r2 {
            pvel.set_single(portal_dir);
            return;
        }
        let l = (d2 - r2).sqrt();
        let left = Vector2::new(l * d0.x + radius * d0.y, l * d0.y - radius * d0.x) / d2;

        let d2 = d1.length_sq();
        if d2 <= r2 {
            pvel.set_single(-portal_dir);
            return;
        }
        let l = (d2 - r2).sqrt();
        let right = Vector2::new(l * d1.x - radius * d1.y, l * d1.y + radius * d1.x) / d2;

        if det(right, left) < 0.0 {
            pvel.set_single(if left.dot(portal_dir) >= 0.0 { left } else { right });
        } else {
            let pref = if det(left, dir) > 0.0 {
                left
            } else if det(dir, right) > 0.0 {
                right
            } else {
                dir.normalized()
            };
            pvel.set_span(left, right, pref);
        }
    }
}
