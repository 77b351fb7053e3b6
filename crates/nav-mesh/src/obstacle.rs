//! Obstacle segments: the walls of walkable space.
//!
//! Segments form linked chains.  A closed chain is single sided: only its
//! right side (outside, for a counter-clockwise walkable boundary) faces
//! agents.  A chain that does not close is double sided.

use nav_core::{NodeId, ObstacleId, Vector2, left_of};

#[derive(Clone, Debug)]
pub struct NavMeshObstacle {
    pub id:           ObstacleId,
    pub point:        Vector2,
    pub unit_dir:     Vector2,
    pub length:       f32,
    /// The node this segment borders.
    pub node:         NodeId,
    pub next:         Option<ObstacleId>,
    pub prev:         Option<ObstacleId>,
    pub double_sided: bool,
    /// Convexity of the vertex at `p0` as seen from the right side.
    pub is_convex:    bool,
    /// Class bitmask matched against an agent's obstacle set.
    pub class:        u32,
    pub(crate) end:         Vector2,
    pub(crate) next_convex: Option<bool>,
}

impl NavMeshObstacle {
    pub const DEFAULT_CLASS: u32 = 0x1;

    #[inline]
    pub fn p0(&self) -> Vector2 {
        self.point
    }

    /// `p0` of the next segment if linked, otherwise the segment's own end.
    #[inline]
    pub fn p1(&self) -> Vector2 {
        self.end
    }

    /// Unit normal pointing to the right side.
    #[inline]
    pub fn normal(&self) -> Vector2 {
        Vector2::new(self.unit_dir.y, -self.unit_dir.x)
    }

    #[inline]
    pub fn mid_point(&self) -> Vector2 {
        self.point + self.unit_dir * (0.5 * self.length)
    }

    /// `true` if `p` sees the obstacle's active face.
    #[inline]
    pub fn point_outside(&self, p: Vector2) -> bool {
        self.double_sided || left_of(self.point, self.end, p) < 0.0
    }

    /// Whether `p0` acts as a convex vertex for an agent on the given side.
    /// An unlinked start is always convex.
    #[inline]
    pub fn p0_convex(&self, agent_on_right: bool) -> bool {
        if self.prev.is_none() || agent_on_right {
            self.is_convex
        } else {
            self.double_sided && !self.is_convex
        }
    }

    /// Whether `p1` acts as a convex vertex for an agent on the given side.
    /// An unlinked end is always convex.
    #[inline]
    pub fn p1_convex(&self, agent_on_right: bool) -> bool {
        match self.next_convex {
            None => true,
            Some(c) if agent_on_right => c,
            Some(c) => self.double_sided && !c,
        }
    }
}
