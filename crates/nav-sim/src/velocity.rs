//! Preferred-velocity strategies.
//!
//! Each agent carries one [`VelocityComponent`] that turns its goal (if
//! any) and its mesh location into a [`PrefVelocity`] every tick.

use nav_agent::Agent;
use nav_core::{PrefVelocity, Vector2};
use nav_localizer::NavMeshLocation;
use nav_mesh::NavMesh;
use nav_path::{Goal, PortalPath, approach_speed};
use nav_planner::PathPlanner;

use crate::context::SimContext;
use crate::error::{SimError, SimResult};

/// Seconds of travel ahead of the agent at which a constant velocity's
/// nominal target sits.
const CONSTANT_TARGET_HORIZON: f32 = 5.0;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum VelocityComponent {
    /// Stand still.
    Zero,
    /// Walk in a fixed direction at a fixed speed, ignoring the goal.
    Constant { direction: Vector2, speed: f32 },
    /// Steer straight at the goal region, ignoring the mesh.
    Goal,
    /// Follow a portal path through the mesh to the goal.  The corridor is
    /// rebuilt when the heading to the next waypoint deviates from the
    /// planned heading by more than the angle whose cosine is
    /// `heading_threshold_cos`.
    NavMesh { heading_threshold_cos: f32 },
}

impl Default for VelocityComponent {
    fn default() -> Self {
        Self::nav_mesh()
    }
}

impl VelocityComponent {
    /// Constant velocity along `direction` (normalized here).
    pub fn constant(direction: Vector2, speed: f32) -> Self {
        Self::Constant { direction: direction.normalized(), speed }
    }

    /// Path following that never rebuilds the corridor on heading drift.
    pub fn nav_mesh() -> Self {
        Self::NavMesh { heading_threshold_cos: -1.0 }
    }

    /// Path following that rebuilds the corridor once the heading drifts
    /// more than `degrees`.
    pub fn nav_mesh_with_threshold(degrees: f32) -> Self {
        Self::NavMesh { heading_threshold_cos: degrees.to_radians().cos() }
    }

    #[inline]
    pub fn needs_goal(&self) -> bool {
        matches!(self, Self::Goal | Self::NavMesh { .. })
    }

    /// Compute `agent`'s preferred velocity into `pvel`.
    ///
    /// The path-following variant plans a route on first use and stores the
    /// resulting path in `loc`; the node `loc` reports is unchanged by that.
    /// Goal-driven variants without a goal, or agents not yet found on the
    /// mesh, stand still.
    pub fn set_pref_velocity(
        &self,
        agent:   &Agent,
        goal:    Option<&Goal>,
        loc:     &mut NavMeshLocation,
        mesh:    &NavMesh,
        planner: &PathPlanner,
        ctx:     &SimContext,
        pvel:    &mut PrefVelocity,
    ) -> SimResult<()> {
        let goal = match (self, goal) {
            (Self::Zero, _) => {
                stand_still(agent, pvel);
                return Ok(());
            }
            (&Self::Constant { direction, speed }, _) => {
                pvel.set_single(direction);
                pvel.set_speed(speed);
                pvel.set_target(agent.pos + direction * (speed * CONSTANT_TARGET_HORIZON));
                return Ok(());
            }
            (_, None) => {
                log::debug!("agent {} has no goal; standing still", agent.id);
                stand_still(agent, pvel);
                return Ok(());
            }
            (_, Some(goal)) => goal,
        };

        match *self {
            Self::NavMesh { heading_threshold_cos } => {
                if !loc.is_path() && !plan_path(agent, goal, loc, mesh, planner)? {
                    stand_still(agent, pvel);
                    return Ok(());
                }
                let Some(path) = loc.path_mut() else {
                    stand_still(agent, pvel);
                    return Ok(());
                };
                pvel.set_speed(agent.params.pref_speed);
                path.set_preferred_direction(agent, heading_threshold_cos, ctx.time_step, pvel);
            }
            _ => {
                goal.set_directions(agent.pos, agent.radius(), pvel);
                let dist_sq = pvel.target().distance_sq(agent.pos);
                pvel.set_speed(approach_speed(dist_sq, agent.params.pref_speed, ctx.time_step));
            }
        }
        Ok(())
    }
}

fn stand_still(agent: &Agent, pvel: &mut PrefVelocity) {
    pvel.set_single(Vector2::new(1.0, 0.0));
    pvel.set_speed(0.0);
    pvel.set_target(agent.pos);
}

/// Plan a route from the agent's node to the node holding the goal's
/// centroid and start following it.  `false` if the agent is not on the
/// mesh yet.
fn plan_path(
    agent:   &Agent,
    goal:    &Goal,
    loc:     &mut NavMeshLocation,
    mesh:    &NavMesh,
    planner: &PathPlanner,
) -> SimResult<bool> {
    let start = loc.node();
    if !start.is_valid() {
        log::warn!("agent {} is not on the mesh; cannot plan a path", agent.id);
        return Ok(false);
    }
    let centroid = goal.centroid();
    let end = mesh
        .find_node_blind(centroid, mesh.elevation(start, centroid))
        .ok_or(SimError::GoalOffMesh(agent.id))?;

    let radius = agent.radius();
    let route = planner
        .get_route(start, end, radius * 2.0)
        .map_err(|source| SimError::NoRoute { agent: agent.id, source })?;
    log::debug!("agent {} planned {start} -> {end} through {} portals", agent.id, route.portal_count());
    loc.set_path(PortalPath::new(agent.pos, *goal, route, radius));
    Ok(true)
}
