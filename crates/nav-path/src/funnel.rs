//! Funnel smoothing of a portal route.
//!
//! Portals are shrunk by the agent radius at both ends.  Sweeping through
//! them, the planner keeps a chain of left and right funnel edges hanging
//! off the current apex.  When a portal's left end falls right of the right
//! chain (or its right end left of the left chain), the chain collapses:
//! the apex jumps to the corner it wrapped around, and every portal passed
//! since the previous apex gets its waypoint where the straight run to the
//! new apex crosses it.

use std::collections::VecDeque;

use nav_core::{EPS, Vector2, det};
use nav_planner::PortalRoute;

#[derive(Copy, Clone, Debug)]
struct FunnelEdge {
    /// Portal index of the apex this edge leaves from; -1 for the start.
    id:     isize,
    /// Portal index this edge ends on.
    end_id: usize,
    dir:    Vector2,
    origin: Vector2,
}

impl FunnelEdge {
    #[inline]
    fn is_on_left(&self, d: Vector2) -> bool {
        det(self.dir, d) > EPS
    }

    #[inline]
    fn is_on_right(&self, d: Vector2) -> bool {
        det(d, self.dir) > EPS
    }

    #[inline]
    fn tip(&self) -> Vector2 {
        self.origin + self.dir
    }
}

struct Crossing<'a> {
    route:     &'a PortalRoute,
    waypoints: &'a mut [Vector2],
    headings:  &'a mut [Vector2],
}

impl Crossing<'_> {
    /// Waypoints for portals `start..end` along the ray from `p0` in `dir`.
    fn set_waypoints(&mut self, start: isize, end: usize, p0: Vector2, dir: Vector2) {
        let start = start.max(0) as usize;
        for i in start..end {
            self.waypoints[i] = self.route.portal(i).intersection_point(p0, dir);
            self.headings[i] = dir;
        }
    }
}

/// Fill `waypoints[start_portal..]` and `headings[start_portal..]` for an
/// agent of `radius` at `start_pos` heading to `goal_point`.
///
/// Both slices must hold one entry per portal of `route`.
pub fn compute_crossing(
    route: &PortalRoute,
    goal_point: Vector2,
    radius: f32,
    start_pos: Vector2,
    start_portal: usize,
    waypoints: &mut [Vector2],
    headings: &mut [Vector2],
) {
    let portal_count = route.portal_count();
    debug_assert!(start_portal < portal_count, "funnel needs at least one portal ahead");
    debug_assert!(waypoints.len() == portal_count && headings.len() == portal_count);
    if start_portal >= portal_count {
        return;
    }

    let mut out = Crossing { route, waypoints, headings };
    let mut apex_id = start_portal as isize - 1;
    let mut apex = start_pos;

    let first = route.portal(start_portal);
    let mut left: VecDeque<FunnelEdge> = VecDeque::new();
    let mut right: VecDeque<FunnelEdge> = VecDeque::new();
    left.push_back(FunnelEdge {
        id:     apex_id,
        end_id: start_portal,
        dir:    first.left(radius) - apex,
        origin: apex,
    });
    right.push_back(FunnelEdge {
        id:     apex_id,
        end_id: start_portal,
        dir:    first.right(radius) - apex,
        origin: apex,
    });

    for i in start_portal + 1..portal_count {
        let portal = route.portal(i);

        // ── Left end ──
        let p_left = portal.left(radius);
        let mut apex_moved = false;
        while let Some(edge) = right.front().copied() {
            if !edge.is_on_right(p_left - edge.origin) {
                break;
            }
            apex_moved = true;
            let new_apex = edge.tip();
            out.set_waypoints(edge.id + 1, edge.end_id + 1, new_apex, edge.dir.normalized());
            apex_id = edge.end_id as isize;
            apex = new_apex;
            right.pop_front();
        }
        if apex_moved {
            left.clear();
            left.push_back(FunnelEdge { id: apex_id, end_id: i, dir: p_left - apex, origin: apex });
        } else {
            while let Some(edge) = left.back() {
                if edge.is_on_right(p_left - edge.origin) {
                    left.pop_back();
                } else {
                    break;
                }
            }
            let edge = match left.back() {
                None => FunnelEdge { id: apex_id, end_id: i, dir: p_left - apex, origin: apex },
                Some(last) => {
                    let origin = last.tip();
                    FunnelEdge { id: last.end_id as isize, end_id: i, dir: p_left - origin, origin }
                }
            };
            left.push_back(edge);
        }

        // ── Right end ──
        let p_right = portal.right(radius);
        apex_moved = false;
        while let Some(edge) = left.front().copied() {
            if !edge.is_on_left(p_right - edge.origin) {
                break;
            }
            apex_moved = true;
            let new_apex = edge.tip();
            out.set_waypoints(edge.id + 1, edge.end_id + 1, new_apex, edge.dir.normalized());
            apex_id = edge.end_id as isize;
            apex = new_apex;
            left.pop_front();
        }
        if apex_moved {
            right.clear();
            right.push_back(FunnelEdge { id: apex_id, end_id: i, dir: p_right - apex, origin: apex });
        } else {
            while let Some(edge) = right.back() {
                if edge.is_on_left(p_right - edge.origin) {
                    right.pop_back();
                } else {
                    break;
                }
            }
            let edge = match right.back() {
                None => FunnelEdge { id: apex_id, end_id: i, dir: p_right - apex, origin: apex },
                Some(last) => {
                    let origin = last.tip();
                    FunnelEdge { id: last.end_id as isize, end_id: i, dir: p_right - origin, origin }
                }
            };
            right.push_back(edge);
        }
    }

    // ── Final run to the goal ──
    let mut apex_moved = false;
    while let Some(edge) = left.front().copied() {
        if !edge.is_on_left(goal_point - edge.origin) {
            break;
        }
        apex_moved = true;
        apex = edge.tip();
        apex_id = edge.end_id as isize;
        out.set_waypoints(edge.id + 1, edge.end_id + 1, apex, edge.dir.normalized());
        left.pop_front();
    }
    if !apex_moved {
        while let Some(edge) = right.front().copied() {
            if !edge.is_on_right(goal_point - edge.origin) {
                break;
            }
            apex = edge.tip();
            apex_id = edge.end_id as isize;
            out.set_waypoints(edge.id + 1, edge.end_id + 1, apex, edge.dir.normalized());
            right.pop_front();
        }
    }
    out.set_waypoints(apex_id + 1, portal_count, goal_point, (goal_point - apex).normalized());
}
