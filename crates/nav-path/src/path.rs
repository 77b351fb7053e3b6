//! An agent's binding to a cached route.

use std::sync::Arc;

use nav_agent::Agent;
use nav_core::{EPS, NodeId, PrefVelocity, Vector2};
use nav_mesh::NavMesh;
use nav_planner::{PathPlanner, PortalRoute};

use crate::error::PathResult;
use crate::funnel::compute_crossing;
use crate::goal::{Goal, approach_speed};

/// A route plus one agent's corridor through it.
///
/// `curr_portal` is the next portal to cross; it equals the portal count
/// once the agent is in the route's end node.
#[derive(Clone, Debug)]
pub struct PortalPath {
    route:       Arc<PortalRoute>,
    goal:        Goal,
    curr_portal: usize,
    waypoints:   Vec<Vector2>,
    headings:    Vec<Vector2>,
}

impl PortalPath {
    pub fn new(start_pos: Vector2, goal: Goal, route: Arc<PortalRoute>, radius: f32) -> Self {
        let mut path = Self {
            route,
            goal,
            curr_portal: 0,
            waypoints: Vec::new(),
            headings: Vec::new(),
        };
        path.compute_crossing(start_pos, radius);
        path
    }

    fn compute_crossing(&mut self, start_pos: Vector2, radius: f32) {
        let n = self.route.portal_count();
        self.curr_portal = 0;
        self.waypoints = vec![Vector2::ZERO; n];
        self.headings = vec![Vector2::ZERO; n];
        if n > 0 {
            self.recompute_from(start_pos, radius, 0);
        }
    }

    fn recompute_from(&mut self, pos: Vector2, radius: f32, portal: usize) {
        let goal_point = self.goal_point(radius);
        compute_crossing(&self.route, goal_point, radius, pos, portal, &mut self.waypoints, &mut self.headings);
    }

    /// Where the corridor ends: the goal point admissible for `radius`
    /// nearest the last portal.
    fn goal_point(&self, radius: f32) -> Vector2 {
        match self.route.portals.last() {
            Some(last) => self.goal.target_point(last.edge.midpoint(), radius),
            None => self.goal.centroid(),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn route(&self) -> &Arc<PortalRoute> {
        &self.route
    }

    #[inline]
    pub fn goal(&self) -> &Goal {
        &self.goal
    }

    #[inline]
    pub fn current_portal(&self) -> usize {
        self.curr_portal
    }

    #[inline]
    pub fn portal_count(&self) -> usize {
        self.route.portal_count()
    }

    /// The node the agent is expected to be in.
    #[inline]
    pub fn current_node(&self) -> NodeId {
        self.route.node_at(self.curr_portal)
    }

    #[inline]
    pub fn waypoint(&self, i: usize) -> Vector2 {
        self.waypoints[i]
    }

    #[inline]
    pub fn heading(&self, i: usize) -> Vector2 {
        self.headings[i]
    }

    pub fn waypoints(&self) -> &[Vector2] {
        &self.waypoints
    }

    // ── Steering ──────────────────────────────────────────────────────────

    /// Preferred velocity for `agent` this tick.
    ///
    /// Past the last portal the agent steers straight at the goal, slowing
    /// so it does not overshoot within one `time_step`.  Otherwise it heads
    /// through the current portal toward its waypoint; if the heading to the
    /// waypoint has drifted from the planned one by more than `heading_cos`
    /// (cosine), the corridor is rebuilt from the current portal first.
    pub fn set_preferred_direction(
        &mut self,
        agent: &Agent,
        heading_cos: f32,
        time_step: f32,
        pvel: &mut PrefVelocity,
    ) {
        let pos = agent.pos;
        let radius = agent.radius();
        let portal_count = self.route.portal_count();

        if self.curr_portal >= portal_count {
            self.goal.set_directions(pos, radius, pvel);
            let dist_sq = pvel.target().distance_sq(pos);
            pvel.set_speed(approach_speed(dist_sq, agent.params.pref_speed, time_step));
            return;
        }

        let curr = self.curr_portal;
        let mut goal_dir = self.waypoints[curr] - pos;
        let mut dist = goal_dir.length();
        let mut big_enough = dist >= EPS;
        if big_enough {
            goal_dir = goal_dir / dist;
            if goal_dir.dot(self.headings[curr]) < heading_cos {
                log::trace!("agent {} drifted off heading at portal {curr}", agent.id);
                self.recompute_from(pos, radius, curr);
                goal_dir = self.waypoints[curr] - pos;
                dist = goal_dir.length();
                big_enough = dist >= EPS;
                if big_enough {
                    goal_dir = goal_dir / dist;
                }
            }
        }
        if !big_enough {
            // Standing on the waypoint: look one step further.
            let ahead = if curr + 1 < portal_count {
                self.waypoints[curr + 1]
            } else {
                self.goal.target_point(pos, radius)
            };
            goal_dir = (ahead - pos).normalized();
        }

        pvel.set_target(self.waypoints[curr]);
        self.route.portal(curr).set_preferred_direction(pos, radius, goal_dir, pvel);
        pvel.set_speed(agent.params.pref_speed);
    }

    // ── Location tracking ─────────────────────────────────────────────────

    /// Advance the portal cursor to wherever `agent` now stands and return
    /// the node it occupies.
    ///
    /// Checked in order: the current node, the next node on the route, the
    /// previous one, other neighbors of the current node (replan), nodes
    /// further along the route, the end node, and finally a blind search of
    /// the whole mesh (replan).  An agent found nowhere keeps its cursor.
    pub fn update_location(
        &mut self,
        agent: &Agent,
        mesh: &NavMesh,
        planner: &PathPlanner,
    ) -> PathResult<NodeId> {
        let p = agent.pos;
        let curr_node = self.current_node();
        if mesh.node(curr_node).contains_point(p) {
            return Ok(curr_node);
        }

        let portal_count = self.route.portal_count();
        let next_node = if self.curr_portal < portal_count {
            Some(self.route.node_at(self.curr_portal + 1))
        } else {
            None
        };
        if let Some(next) = next_node.filter(|&n| mesh.node(n).contains_point(p)) {
            self.curr_portal += 1;
            return Ok(next);
        }

        let prev_node = self.curr_portal.checked_sub(1).map(|i| self.route.node_at(i));
        if let Some(prev) = prev_node.filter(|&n| mesh.node(n).contains_point(p)) {
            self.curr_portal -= 1;
            return Ok(prev);
        }

        let end = self.route.end;
        let stray = mesh
            .neighbors(curr_node)
            .map(|(_, n)| n)
            .filter(|&n| Some(n) != next_node && Some(n) != prev_node)
            .find(|&n| mesh.node(n).contains_point(p));
        if let Some(node) = stray {
            log::debug!("agent {} left its route into node {node}; replanning", agent.id);
            self.replan(p, node, end, agent.radius(), planner)?;
            return Ok(self.current_node());
        }

        // Skipped ahead over one or more nodes in a single step.
        if let Some(i) = (self.curr_portal + 2..portal_count)
            .find(|&i| mesh.node(self.route.node_at(i)).contains_point(p))
        {
            self.curr_portal = i;
            return Ok(self.current_node());
        }
        if mesh.node(end).contains_point(p) {
            self.curr_portal = portal_count;
            return Ok(end);
        }

        log::warn!("agent {} pushed into a node off its route", agent.id);
        let elevation = mesh.elevation(curr_node, p);
        if let Some(node) = mesh.find_node_blind(p, elevation) {
            self.replan(p, node, end, agent.radius(), planner).inspect_err(|e| {
                log::warn!("agent {} cannot replan from {node} to {end}: {e}", agent.id);
            })?;
        }
        Ok(self.current_node())
    }

    /// Replace the route with one from `start_node` to `end_node` wide
    /// enough for an agent of `radius`, and rebuild the corridor.
    pub fn replan(
        &mut self,
        start_pos: Vector2,
        start_node: NodeId,
        end_node: NodeId,
        radius: f32,
        planner: &PathPlanner,
    ) -> PathResult<()> {
        self.route = planner.get_route(start_node, end_node, radius * 2.0)?;
        self.compute_crossing(start_pos, radius);
        Ok(())
    }
}
