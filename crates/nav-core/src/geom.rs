//! Planar geometry primitives.
//!
//! `Vector2` uses `f32` throughout: crowd scenes span at most a few kilometres
//! and single precision halves the footprint of the per-agent arrays.
//!
//! Sign conventions used across the workspace:
//!
//! - `det(a, b) > 0` means `b` is counter-clockwise (to the left) of `a`.
//! - `left_of(a, b, p) > 0` means `p` lies left of the directed line `a → b`.
//! - A [`Line`] admits the half-plane to the *left* of its direction.

use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// Tolerance for parallelism and side-of-line tests.
pub const EPS: f32 = 1.0e-5;

// ── Vector2 ───────────────────────────────────────────────────────────────────

/// A 2-D vector or point.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn dot(self, other: Vector2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    #[inline]
    pub fn length_sq(self) -> f32 {
        self.dot(self)
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.length_sq().sqrt()
    }

    /// Unit vector in the same direction.  The zero vector stays zero.
    #[inline]
    pub fn normalized(self) -> Vector2 {
        let len = self.length();
        if len > 0.0 { self / len } else { Vector2::ZERO }
    }

    #[inline]
    pub fn distance_sq(self, other: Vector2) -> f32 {
        (self - other).length_sq()
    }

    #[inline]
    pub fn distance(self, other: Vector2) -> f32 {
        (self - other).length()
    }

    /// Rotate 90° counter-clockwise.
    #[inline]
    pub fn perp(self) -> Vector2 {
        Vector2::new(-self.y, self.x)
    }
}

impl Add for Vector2 {
    type Output = Vector2;
    #[inline]
    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector2 {
    type Output = Vector2;
    #[inline]
    fn sub(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Vector2 {
    type Output = Vector2;
    #[inline]
    fn neg(self) -> Vector2 {
        Vector2::new(-self.x, -self.y)
    }
}

impl Mul<f32> for Vector2 {
    type Output = Vector2;
    #[inline]
    fn mul(self, s: f32) -> Vector2 {
        Vector2::new(self.x * s, self.y * s)
    }
}

impl Mul<Vector2> for f32 {
    type Output = Vector2;
    #[inline]
    fn mul(self, v: Vector2) -> Vector2 {
        v * self
    }
}

impl Div<f32> for Vector2 {
    type Output = Vector2;
    #[inline]
    fn div(self, s: f32) -> Vector2 {
        Vector2::new(self.x / s, self.y / s)
    }
}

impl AddAssign for Vector2 {
    #[inline]
    fn add_assign(&mut self, rhs: Vector2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl SubAssign for Vector2 {
    #[inline]
    fn sub_assign(&mut self, rhs: Vector2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl MulAssign<f32> for Vector2 {
    #[inline]
    fn mul_assign(&mut self, s: f32) {
        self.x *= s;
        self.y *= s;
    }
}

impl DivAssign<f32> for Vector2 {
    #[inline]
    fn div_assign(&mut self, s: f32) {
        self.x /= s;
        self.y /= s;
    }
}

impl fmt::Display for Vector2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.x, self.y)
    }
}

// ── Free functions ────────────────────────────────────────────────────────────

/// 2-D cross product (determinant of the 2×2 matrix `[a b]`).
#[inline]
pub fn det(a: Vector2, b: Vector2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Signed area test: positive when `p` is left of the directed line `a → b`.
#[inline]
pub fn left_of(a: Vector2, b: Vector2, p: Vector2) -> f32 {
    det(a - p, b - a)
}

/// Squared distance from `c` to the segment `a b`.
pub fn dist_sq_point_segment(a: Vector2, b: Vector2, c: Vector2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq <= 0.0 {
        return c.distance_sq(a);
    }
    let r = (c - a).dot(ab) / len_sq;
    if r < 0.0 {
        c.distance_sq(a)
    } else if r > 1.0 {
        c.distance_sq(b)
    } else {
        c.distance_sq(a + ab * r)
    }
}

// ── Line ──────────────────────────────────────────────────────────────────────

/// A directed line in velocity space.  Velocities on the left of
/// `direction` (through `point`) satisfy the constraint.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Line {
    pub point: Vector2,
    /// Unit direction.
    pub direction: Vector2,
}

impl Line {
    #[inline]
    pub fn new(point: Vector2, direction: Vector2) -> Self {
        Self { point, direction }
    }

    /// Signed violation of `v`: positive when `v` lies on the forbidden
    /// (right) side of the line.
    #[inline]
    pub fn violation(&self, v: Vector2) -> f32 {
        det(self.direction, self.point - v)
    }
}
