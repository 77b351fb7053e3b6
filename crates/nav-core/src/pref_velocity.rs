//! Preferred velocity expressed as an arc of acceptable directions.
//!
//! Velocity sources (goal steering, portal paths) do not produce a single
//! vector.  They produce a span: `left` and `right` bound the admissible
//! directions, `preferred` lies between them, and `speed` scales the
//! preferred direction.  Downstream consumers may blend several spans before
//! collapsing one into a velocity with [`PrefVelocity::preferred_velocity`].

use crate::geom::{Vector2, det};

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrefVelocity {
    left:      Vector2,
    right:     Vector2,
    preferred: Vector2,
    speed:     f32,
    target:    Vector2,
}

impl Default for PrefVelocity {
    fn default() -> Self {
        let dir = Vector2::new(1.0, 0.0);
        Self { left: dir, right: dir, preferred: dir, speed: 1.0, target: Vector2::ZERO }
    }
}

impl PrefVelocity {
    /// A degenerate span: a single direction.
    pub fn new(direction: Vector2, speed: f32, target: Vector2) -> Self {
        Self { left: direction, right: direction, preferred: direction, speed, target }
    }

    /// Collapse the span to a single direction.
    #[inline]
    pub fn set_single(&mut self, direction: Vector2) {
        self.left = direction;
        self.right = direction;
        self.preferred = direction;
    }

    /// Set a full span.  `right → preferred → left` must be counter-clockwise.
    pub fn set_span(&mut self, left: Vector2, right: Vector2, preferred: Vector2) {
        const SPAN_EPS: f32 = -1.0e-4;
        debug_assert!(det(right, left) >= SPAN_EPS, "span right/left inverted");
        debug_assert!(det(right, preferred) >= SPAN_EPS, "preferred right of span");
        debug_assert!(det(preferred, left) >= SPAN_EPS, "preferred left of span");
        self.left = left;
        self.right = right;
        self.preferred = preferred;
    }

    #[inline]
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    #[inline]
    pub fn set_target(&mut self, target: Vector2) {
        self.target = target;
    }

    #[inline]
    pub fn left(&self) -> Vector2 {
        self.left
    }

    #[inline]
    pub fn right(&self) -> Vector2 {
        self.right
    }

    #[inline]
    pub fn preferred(&self) -> Vector2 {
        self.preferred
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    #[inline]
    pub fn target(&self) -> Vector2 {
        self.target
    }

    /// `preferred * speed`.
    #[inline]
    pub fn preferred_velocity(&self) -> Vector2 {
        self.preferred * self.speed
    }

    /// `true` when left and right coincide.
    #[inline]
    pub fn is_single(&self) -> bool {
        self.left == self.right
    }
}
