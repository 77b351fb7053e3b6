//! Incremental randomized-free linear programs over velocity half-planes.
//!
//! All three programs operate inside the disc `|v| <= radius` (the agent's
//! max speed).  Each line's admissible side is the LEFT of its direction.

use nav_core::{EPS, Line, Vector2, det};

/// Optimize along line `line_no` subject to `lines[..line_no]` and the speed
/// disc.  Returns `false` if the constraints leave nothing on the line.
///
/// With `direction_opt`, `opt_velocity` is a unit direction to maximize
/// along; otherwise the result is the point closest to `opt_velocity`.
pub fn linear_program1(
    lines: &[Line],
    line_no: usize,
    radius: f32,
    opt_velocity: Vector2,
    direction_opt: bool,
    result: &mut Vector2,
) -> bool {
    let line = &lines[line_no];
    let dot = line.point.dot(line.direction);
    let discriminant = dot * dot + radius * radius - line.point.length_sq();
    if discriminant < 0.0 {
        // The speed disc misses the line entirely.
        return false;
    }

    let sqrt_disc = discriminant.sqrt();
    let mut t_left = -dot - sqrt_disc;
    let mut t_right = -dot + sqrt_disc;

    for other in &lines[..line_no] {
        let denominator = det(line.direction, other.direction);
        let numerator = det(other.direction, line.point - other.point);

        if denominator.abs() <= EPS {
            // Parallel lines.
            if numerator < 0.0 {
                return false;
            }
            continue;
        }

        let t = numerator / denominator;
        if denominator >= 0.0 {
            t_right = t_right.min(t);
        } else {
            t_left = t_left.max(t);
        }
        if t_left > t_right {
            return false;
        }
    }

    let t = if direction_opt {
        if opt_velocity.dot(line.direction) > 0.0 { t_right } else { t_left }
    } else {
        line.direction.dot(opt_velocity - line.point).clamp(t_left, t_right)
    };
    *result = line.point + line.direction * t;
    true
}

/// Find the velocity inside the speed disc closest to `opt_velocity` (or
/// furthest along it, with `direction_opt`) that satisfies every line.
///
/// Returns `lines.len()` on success, otherwise the index of the first line
/// that could not be satisfied; `result` then holds the best velocity for
/// the lines before it.
pub fn linear_program2(
    lines: &[Line],
    radius: f32,
    opt_velocity: Vector2,
    direction_opt: bool,
    result: &mut Vector2,
) -> usize {
    *result = if direction_opt {
        // `opt_velocity` is a unit direction here.
        opt_velocity * radius
    } else if opt_velocity.length_sq() > radius * radius {
        opt_velocity.normalized() * radius
    } else {
        opt_velocity
    };

    for (i, line) in lines.iter().enumerate() {
        if line.violation(*result) > 0.0 {
            let temp = *result;
            if !linear_program1(lines, i, radius, opt_velocity, direction_opt, result) {
                *result = temp;
                return i;
            }
        }
    }
    lines.len()
}

/// Recover from an infeasible `linear_program2` run starting at
/// `begin_line`: minimize the largest violation of the agent lines while
/// keeping the first `num_obst_lines` lines hard.
pub fn linear_program3(
    lines: &[Line],
    num_obst_lines: usize,
    begin_line: usize,
    radius: f32,
    result: &mut Vector2,
) {
    let mut distance = 0.0_f32;
    let mut proj_lines: Vec<Line> = Vec::with_capacity(lines.len());

    for i in begin_line..lines.len() {
        let line_i = &lines[i];
        if line_i.violation(*result) <= distance {
            continue;
        }

        proj_lines.clear();
        proj_lines.extend_from_slice(&lines[..num_obst_lines]);

        for line_j in &lines[num_obst_lines..i] {
            let determinant = det(line_i.direction, line_j.direction);
            let point = if determinant.abs() <= EPS {
                if line_i.direction.dot(line_j.direction) > 0.0 {
                    // Same direction: line j adds nothing here.
                    continue;
                }
                (line_i.point + line_j.point) * 0.5
            } else {
                line_i.point
                    + line_i.direction
                        * (det(line_j.direction, line_i.point - line_j.point) / determinant)
            };
            let direction = (line_j.direction - line_i.direction).normalized();
            proj_lines.push(Line::new(point, direction));
        }

        let temp = *result;
        let toward = Vector2::new(-line_i.direction.y, line_i.direction.x);
        if linear_program2(&proj_lines, radius, toward, true, result) < proj_lines.len() {
            // Only floating-point error can get here; keep the old result.
            *result = temp;
        }
        distance = line_i.violation(*result);
    }
}
