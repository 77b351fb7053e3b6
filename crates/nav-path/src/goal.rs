//! Goal regions.
//!
//! A goal is reached anywhere inside its region, so steering toward one
//! produces a span of acceptable directions rather than a single heading.

use nav_core::{PrefVelocity, Vector2, det};

/// Where an agent is headed.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Goal {
    Point(Vector2),
    Circle { center: Vector2, radius: f32 },
    /// Axis-aligned box from `min` spanning `size`.
    Aabb { min: Vector2, size: Vector2 },
    /// Box spanning `size` in a frame rotated about `pivot`: local `(0, 0)`
    /// sits at `pivot` and the local x axis runs along the unit `axis`.
    Obb { pivot: Vector2, size: Vector2, axis: Vector2 },
}

impl Goal {
    /// Box goal from two opposite corners.
    pub fn aabb(a: Vector2, b: Vector2) -> Self {
        let min = Vector2::new(a.x.min(b.x), a.y.min(b.y));
        let max = Vector2::new(a.x.max(b.x), a.y.max(b.y));
        Goal::Aabb { min, size: max - min }
    }

    /// Box goal with one corner at `pivot`, rotated counter-clockwise by
    /// `angle` radians about it.
    pub fn obb(pivot: Vector2, size: Vector2, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Goal::Obb { pivot, size, axis: Vector2::new(cos, sin) }
    }

    pub fn centroid(&self) -> Vector2 {
        match *self {
            Goal::Point(p) => p,
            Goal::Circle { center, .. } => center,
            Goal::Aabb { min, size } => min + size * 0.5,
            Goal::Obb { pivot, size, axis } => pivot + to_world(axis, size * 0.5),
        }
    }

    /// Squared distance from `pt` to the goal region; zero inside.
    pub fn squared_distance(&self, pt: Vector2) -> f32 {
        match *self {
            Goal::Point(p) => p.distance_sq(pt),
            Goal::Circle { center, radius } => {
                let outside = (pt.distance(center) - radius).max(0.0);
                outside * outside
            }
            Goal::Aabb { min, size } => box_squared_distance(min, size, pt),
            Goal::Obb { pivot, size, axis } => {
                box_squared_distance(Vector2::ZERO, size, to_local(axis, pt - pivot))
            }
        }
    }

    /// The goal point nearest `q` at which a disc of radius `r` lies inside
    /// the region.  Regions too small for the disc yield their centre.
    pub fn target_point(&self, q: Vector2, r: f32) -> Vector2 {
        match *self {
            Goal::Point(p) => p,
            Goal::Circle { center, radius } => {
                let thresh = radius - r;
                if thresh <= 0.0 {
                    return center;
                }
                let disp = q - center;
                let dist_sq = disp.length_sq();
                if dist_sq < thresh * thresh {
                    q
                } else {
                    center + disp * (thresh / dist_sq.sqrt())
                }
            }
            Goal::Aabb { min, size } => box_target_point(min, size, q, r),
            Goal::Obb { pivot, size, axis } => {
                let local = box_target_point(Vector2::ZERO, size, to_local(axis, q - pivot), r);
                pivot + to_world(axis, local)
            }
        }
    }

    /// Write into `pvel` the directions from `q` that reach the goal with
    /// clearance `r`, and the target point.  An agent already inside gets a
    /// zero direction and its own position as target.
    pub fn set_directions(&self, q: Vector2, r: f32, pvel: &mut PrefVelocity) {
        match *self {
            Goal::Point(p) => {
                pvel.set_single((p - q).normalized());
                pvel.set_target(p);
            }
            Goal::Circle { center, radius } => circle_directions(center, radius, q, r, pvel),
            Goal::Aabb { min, size } => aabb_directions(min, size, q, r, pvel),
            Goal::Obb { pivot, size, axis } => obb_directions(pivot, size, axis, q, r, pvel),
        }
    }
}

// ── Box frames ────────────────────────────────────────────────────────────────

/// `v` expressed in a frame whose x axis is the unit `axis`.
#[inline]
fn to_local(axis: Vector2, v: Vector2) -> Vector2 {
    Vector2::new(v.dot(axis), det(axis, v))
}

#[inline]
fn to_world(axis: Vector2, v: Vector2) -> Vector2 {
    Vector2::new(v.x * axis.x - v.y * axis.y, v.x * axis.y + v.y * axis.x)
}

fn box_squared_distance(min: Vector2, size: Vector2, pt: Vector2) -> f32 {
    let max = min + size;
    let x = pt.x.clamp(min.x, max.x);
    let y = pt.y.clamp(min.y, max.y);
    pt.distance_sq(Vector2::new(x, y))
}

fn box_target_point(min: Vector2, size: Vector2, q: Vector2, r: f32) -> Vector2 {
    let axis = |q: f32, lo: f32, len: f32| {
        if len < 2.0 * r { lo + len * 0.5 } else { q.clamp(lo + r, lo + len - r) }
    };
    Vector2::new(axis(q.x, min.x, size.x), axis(q.y, min.y, size.y))
}

fn circle_directions(center: Vector2, radius: f32, q: Vector2, r: f32, pvel: &mut PrefVelocity) {
    let target_r = radius - r;
    if target_r < 0.0 {
        pvel.set_single((center - q).normalized());
        pvel.set_target(center);
        return;
    }

    let target_r_sq = target_r * target_r;
    let rel = center - q;
    let dist_sq = rel.length_sq();
    if dist_sq < target_r_sq {
        pvel.set_single(Vector2::ZERO);
        pvel.set_target(q);
        return;
    }

    // Tangents to the circle of admissible centres.
    let leg = (dist_sq - target_r_sq).sqrt();
    let left = Vector2::new(rel.x * leg - rel.y * target_r, rel.x * target_r + rel.y * leg) / dist_sq;
    let right = Vector2::new(rel.x * leg + rel.y * target_r, -rel.x * target_r + rel.y * leg) / dist_sq;
    let dist = dist_sq.sqrt();
    let dir = rel / dist;
    pvel.set_span(left, right, dir);
    pvel.set_target(q + dir * (dist - target_r));
}

/// Per axis: -1 below the admissible interval, +1 above, 0 inside.
#[inline]
fn side(v: f32, lo: f32, hi: f32) -> i8 {
    (v > hi) as i8 - (v < lo) as i8
}

fn aabb_directions(min: Vector2, size: Vector2, q: Vector2, r: f32, pvel: &mut PrefVelocity) {
    let d = 2.0 * r;
    let (min_x, max_x) = (min.x + r, min.x + size.x - r);
    let (min_y, max_y) = (min.y + r, min.y + size.y - r);
    let xc = side(q.x, min_x, max_x);
    let yc = side(q.y, min_y, max_y);

    if xc == 0 && yc == 0 {
        pvel.set_single(Vector2::ZERO);
        pvel.set_target(q);
        return;
    }

    // The span runs between the two box corners (of the clearance-shrunk
    // box) that bound the agent's view of it.  A box narrower than the
    // agent collapses to its centre line on that axis.
    let mut dimensions = 2;
    let (x, x_left, x_right) = if size.x < d {
        dimensions -= 1;
        let x = min.x + size.x * 0.5;
        (x, x, x)
    } else {
        let left_max = yc == 1 || (xc == 1 && yc == 0);
        let right_max = yc == -1 || (xc == 1 && yc == 0);
        let x = match xc {
            -1 => min_x,
            1 => max_x,
            _ => q.x,
        };
        (x, if left_max { max_x } else { min_x }, if right_max { max_x } else { min_x })
    };
    let (y, y_left, y_right) = if size.y < d {
        dimensions -= 1;
        let y = min.y + size.y * 0.5;
        (y, y, y)
    } else {
        let left_max = xc == -1 || (xc == 0 && yc == 1);
        let right_max = xc == 1 || (xc == 0 && yc == 1);
        let y = match yc {
            -1 => min_y,
            1 => max_y,
            _ => q.y,
        };
        (y, if left_max { max_y } else { min_y }, if right_max { max_y } else { min_y })
    };

    let target = Vector2::new(x, y);
    pvel.set_target(target);
    let pref = (target - q).normalized();
    if dimensions > 0 {
        pvel.set_span(
            (Vector2::new(x_left, y_left) - q).normalized(),
            (Vector2::new(x_right, y_right) - q).normalized(),
            pref,
        );
    } else {
        pvel.set_single(pref);
    }
}

/// The box span computed in the box's own frame, then rotated out.
fn obb_directions(
    pivot: Vector2,
    size: Vector2,
    axis: Vector2,
    q: Vector2,
    r: f32,
    pvel: &mut PrefVelocity,
) {
    let mut local = *pvel;
    aabb_directions(Vector2::ZERO, size, to_local(axis, q - pivot), r, &mut local);
    let preferred = to_world(axis, local.preferred());
    if local.is_single() {
        pvel.set_single(preferred);
    } else {
        pvel.set_span(to_world(axis, local.left()), to_world(axis, local.right()), preferred);
    }
    pvel.set_target(pivot + to_world(axis, local.target()));
}

/// Squared distance under which an agent counts as standing on its goal.
pub const ARRIVED_DIST_SQ: f32 = 1.0e-4;

/// Speed toward a target `dist_sq` away: `pref_speed`, cut so the agent does
/// not overshoot within one `time_step`, and zero once it has arrived.
pub fn approach_speed(dist_sq: f32, pref_speed: f32, time_step: f32) -> f32 {
    if dist_sq <= ARRIVED_DIST_SQ {
        0.0
    } else if dist_sq / (pref_speed * pref_speed) < time_step * time_step {
        dist_sq.sqrt() / time_step
    } else {
        pref_speed
    }
}
