//! Velocity-obstacle half-planes.
//!
//! A [`Line`] admits every velocity on the LEFT of its direction.  Agent
//! lines share avoidance responsibility equally; obstacle lines put all of
//! it on the agent.

use nav_agent::Agent;
use nav_core::{EPS, Line, ObstacleId, Vector2, det};
use nav_mesh::{NavMesh, NavMeshObstacle};

/// Unit direction of the left tangent from the origin to the circle of
/// radius `r` centred at `rel`, with `dist_sq = |rel|²` and
/// `leg = sqrt(dist_sq - r²)`.
#[inline]
fn left_leg(rel: Vector2, r: f32, leg: f32, dist_sq: f32) -> Vector2 {
    Vector2::new(rel.x * leg - rel.y * r, rel.x * r + rel.y * leg) / dist_sq
}

/// The right tangent; mirror of [`left_leg`].
#[inline]
fn right_leg(rel: Vector2, r: f32, leg: f32, dist_sq: f32) -> Vector2 {
    Vector2::new(rel.x * leg + rel.y * r, -rel.x * r + rel.y * leg) / dist_sq
}

/// ORCA half-plane of `agent` induced by `other`.
///
/// `inv_tau` is `1 / agent.params.time_horizon`.  Agents that already
/// overlap resolve the collision within `time_step` and take the whole
/// correction on themselves.
pub fn agent_line(agent: &Agent, other: &Agent, inv_tau: f32, time_step: f32) -> Line {
    let rel_pos = other.pos - agent.pos;
    let rel_vel = agent.vel - other.vel;
    let dist_sq = rel_pos.length_sq();
    let combined_radius = agent.radius() + other.radius();
    let combined_radius_sq = combined_radius * combined_radius;

    if dist_sq > combined_radius_sq {
        // Vector from the cut-off centre to the relative velocity.
        let w = rel_vel - rel_pos * inv_tau;
        let w_length_sq = w.length_sq();
        let dot1 = w.dot(rel_pos);

        let (direction, u) = if dot1 < 0.0 && dot1 * dot1 > combined_radius_sq * w_length_sq {
            // Project on the cut-off circle.
            let w_length = w_length_sq.sqrt();
            let unit_w = w / w_length;
            let direction = Vector2::new(unit_w.y, -unit_w.x);
            (direction, unit_w * (combined_radius * inv_tau - w_length))
        } else {
            // Project on a leg.
            let leg = (dist_sq - combined_radius_sq).sqrt();
            let direction = if det(rel_pos, w) > 0.0 {
                left_leg(rel_pos, combined_radius, leg, dist_sq)
            } else {
                -right_leg(rel_pos, combined_radius, leg, dist_sq)
            };
            (direction, direction * rel_vel.dot(direction) - rel_vel)
        };
        Line::new(agent.vel + u * 0.5, direction)
    } else {
        let inv_time_step = 1.0 / time_step;
        let w = rel_vel - rel_pos * inv_time_step;
        let w_length = w.length();
        let unit_w = w.normalized();
        let direction = Vector2::new(unit_w.y, -unit_w.x);
        let u = unit_w * (combined_radius * inv_time_step - w_length);
        Line::new(agent.vel + u, direction)
    }
}

/// The obstacle seen from the side the agent stands on: a flipped obstacle
/// is walked from `p1` to `p0`.
struct OrientedObstacle {
    p0:             Vector2,
    p1:             Vector2,
    dir:            Vector2,
    p0_convex:      bool,
    p1_convex:      bool,
    /// Direction of the neighboring segment ending at `p0`, walked the same
    /// way.
    left_nbr_dir:   Option<Vector2>,
    /// Direction of the neighboring segment starting at `p1`.
    right_nbr_dir:  Option<Vector2>,
}

impl OrientedObstacle {
    fn new(obst: &NavMeshObstacle, mesh: &NavMesh, flip: bool) -> Self {
        let dir_of = |id: ObstacleId| mesh.obstacle(id).unit_dir;
        if flip {
            Self {
                p0:            obst.p1(),
                p1:            obst.p0(),
                dir:           -obst.unit_dir,
                p0_convex:     obst.p1_convex(false),
                p1_convex:     obst.p0_convex(false),
                left_nbr_dir:  obst.next.map(|id| -dir_of(id)),
                right_nbr_dir: obst.prev.map(|id| -dir_of(id)),
            }
        } else {
            Self {
                p0:            obst.p0(),
                p1:            obst.p1(),
                dir:           obst.unit_dir,
                p0_convex:     obst.p0_convex(true),
                p1_convex:     obst.p1_convex(true),
                left_nbr_dir:  obst.prev.map(dir_of),
                right_nbr_dir: obst.next.map(dir_of),
            }
        }
    }
}

/// Append the ORCA line of `obst` for `agent` to `lines`, unless the
/// obstacle is already covered by earlier obstacle lines or is hidden
/// behind a reflex vertex.
///
/// `flip` is set when the agent stands on the left of a double-sided
/// obstacle.  `inv_tau` is `1 / agent.params.time_horizon_obst`.
pub fn obstacle_line(
    lines: &mut Vec<Line>,
    agent: &Agent,
    obst: &NavMeshObstacle,
    mesh: &NavMesh,
    inv_tau: f32,
    flip: bool,
) {
    let o = OrientedObstacle::new(obst, mesh, flip);
    let radius = agent.radius();
    let radius_sq = radius * radius;
    let rel_pos1 = o.p0 - agent.pos;
    let rel_pos2 = o.p1 - agent.pos;

    // Skip if both cut-off centres lie beyond an existing line.
    let covered = lines.iter().any(|line| {
        det(rel_pos1 * inv_tau - line.point, line.direction) - inv_tau * radius >= -EPS
            && det(rel_pos2 * inv_tau - line.point, line.direction) - inv_tau * radius >= -EPS
    });
    if covered {
        return;
    }

    let dist_sq1 = rel_pos1.length_sq();
    let dist_sq2 = rel_pos2.length_sq();
    let s = -rel_pos1.dot(o.dir);
    let dist_sq_line = (rel_pos1 + o.dir * s).length_sq();
    let length = obst.length;

    // ── Already colliding ──
    if s < 0.0 && dist_sq1 <= radius_sq {
        // With the left vertex.
        if o.p0_convex {
            lines.push(Line::new(Vector2::ZERO, Vector2::new(-rel_pos1.y, rel_pos1.x).normalized()));
        }
        return;
    }
    if s > length && dist_sq2 <= radius_sq {
        // With the right vertex; the next segment handles it unless it
        // turns away.
        let own = match o.right_nbr_dir {
            None => true,
            Some(d) => o.p1_convex && det(rel_pos2, d) >= 0.0,
        };
        if own {
            lines.push(Line::new(Vector2::ZERO, Vector2::new(-rel_pos2.y, rel_pos2.x).normalized()));
        }
        return;
    }
    if (0.0..length).contains(&s) && dist_sq_line <= radius_sq {
        // With the segment.
        lines.push(Line::new(Vector2::ZERO, -o.dir));
        return;
    }

    // ── Legs ──
    let mut prev_is_current = false;
    let mut next_is_current = false;
    let (mut left_dir, mut right_dir);

    if s < 0.0 && dist_sq_line <= radius_sq {
        // Viewed obliquely: only the left vertex defines the cone.
        if !o.p0_convex {
            return;
        }
        next_is_current = true;
        let leg = (dist_sq1 - radius_sq).max(0.0).sqrt();
        left_dir = left_leg(rel_pos1, radius, leg, dist_sq1);
        right_dir = right_leg(rel_pos1, radius, leg, dist_sq1);
    } else if s > length && dist_sq_line <= radius_sq {
        // Viewed obliquely: only the right vertex defines the cone.
        if !o.p1_convex {
            return;
        }
        prev_is_current = true;
        let leg = (dist_sq2 - radius_sq).max(0.0).sqrt();
        left_dir = left_leg(rel_pos2, radius, leg, dist_sq2);
        right_dir = right_leg(rel_pos2, radius, leg, dist_sq2);
    } else {
        left_dir = if o.p0_convex {
            let leg = (dist_sq1 - radius_sq).max(0.0).sqrt();
            left_leg(rel_pos1, radius, leg, dist_sq1)
        } else {
            -o.dir
        };
        right_dir = if o.p1_convex {
            let leg = (dist_sq2 - radius_sq).max(0.0).sqrt();
            right_leg(rel_pos2, radius, leg, dist_sq2)
        } else {
            o.dir
        };
    }

    // A leg pointing into a neighboring segment is replaced by that
    // segment and can never be projected on.
    let mut left_foreign = false;
    let mut right_foreign = false;
    if let (false, Some(d)) = (prev_is_current, o.left_nbr_dir) {
        if o.p0_convex && det(left_dir, -d) >= 0.0 {
            left_dir = -d;
            left_foreign = true;
        }
    }
    if let (false, Some(d)) = (next_is_current, o.right_nbr_dir) {
        if o.p1_convex && det(right_dir, d) <= 0.0 {
            right_dir = d;
            right_foreign = true;
        }
    }

    // ── Project the velocity on the truncated cone ──
    let left_cutoff = (if prev_is_current { rel_pos2 } else { rel_pos1 }) * inv_tau;
    let right_cutoff = if next_is_current { left_cutoff } else { rel_pos2 * inv_tau };
    let cutoff_vec = right_cutoff - left_cutoff;
    let same_vertex = next_is_current || prev_is_current;
    let vel = agent.vel;

    let t = if same_vertex {
        0.5
    } else {
        (vel - left_cutoff).dot(cutoff_vec) / cutoff_vec.length_sq()
    };
    let t_left = (vel - left_cutoff).dot(left_dir);
    let t_right = (vel - right_cutoff).dot(right_dir);

    if (t < 0.0 && t_left < 0.0) || (same_vertex && t_left < 0.0 && t_right < 0.0) {
        // Left cut-off circle.
        let unit_w = (vel - left_cutoff).normalized();
        let direction = Vector2::new(unit_w.y, -unit_w.x);
        lines.push(Line::new(left_cutoff + unit_w * (radius * inv_tau), direction));
        return;
    }
    if t > 1.0 && t_right < 0.0 {
        // Right cut-off circle.
        let unit_w = (vel - right_cutoff).normalized();
        let direction = Vector2::new(unit_w.y, -unit_w.x);
        lines.push(Line::new(right_cutoff + unit_w * (radius * inv_tau), direction));
        return;
    }

    let dist_sq_cutoff = if t < 0.0 || t > 1.0 || same_vertex {
        f32::INFINITY
    } else {
        (vel - (left_cutoff + cutoff_vec * t)).length_sq()
    };
    let dist_sq_left = if t_left < 0.0 {
        f32::INFINITY
    } else {
        (vel - (left_cutoff + left_dir * t_left)).length_sq()
    };
    let dist_sq_right = if t_right < 0.0 {
        f32::INFINITY
    } else {
        (vel - (right_cutoff + right_dir * t_right)).length_sq()
    };

    let offset = radius * inv_tau;
    if dist_sq_cutoff <= dist_sq_left && dist_sq_cutoff <= dist_sq_right {
        let direction = -o.dir;
        lines.push(Line::new(left_cutoff + direction.perp() * offset, direction));
    } else if dist_sq_left <= dist_sq_right {
        if !left_foreign {
            let direction = left_dir;
            lines.push(Line::new(left_cutoff + direction.perp() * offset, direction));
        }
    } else if !right_foreign {
        let direction = -right_dir;
        lines.push(Line::new(right_cutoff + direction.perp() * offset, direction));
    }
}
