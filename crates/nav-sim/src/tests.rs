//! Integration tests for nav-sim.

use std::sync::Arc;

use nav_agent::{AgentParams, AgentStore, AgentStoreBuilder, NeighborLists};
use nav_core::{AgentId, SimConfig, Tick, Vector2};
use nav_mesh::{NavMesh, load_from_reader};

use crate::{SimBuilder, SimObserver};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Three unit squares in an L, walled by a clockwise chain.
///
/// ```text
///   2      ┌────┐
///          │ n2 │
///   1 ┌────┼────┤
///     │ n0 │ n1 │
///   0 └────┴────┘
///     0    1    2
/// ```
const L_NAV: &str = "\
8
0 0
1 0
2 0
1 1
2 1
0 1
1 2
2 2
2
1 3 0 1
3 4 1 2
8
0 5 0 1
5 3 0 2
3 6 2 3
6 7 2 4
7 4 2 5
4 2 1 6
2 1 1 7
1 0 0 0
ell 3
0.5 0.5  4 0 1 3 5  0 0 0  1 0  3 0 1 7
1.5 0.5  4 1 2 4 3  0 0 0  2 0 1  2 5 6
1.5 1.5  4 3 4 7 6  0 0 0  1 1  3 2 3 4
";

/// One 10 × 10 room walled by a clockwise chain.
const ROOM_NAV: &str = "\
4
0 0
0 10
10 10
10 0
0
4
0 1 0 1
1 2 0 2
2 3 0 3
3 0 0 0
room 1
5 5  4 0 3 2 1  0 0 0  0  4 0 1 2 3
";

/// Two unit squares with no portal between them.
const ISLANDS_NAV: &str = "\
8
0 0
1 0
1 1
0 1
3 0
4 0
4 1
3 1
0
0
islands 2
0.5 0.5  4 0 1 2 3  0 0 0  0  0
3.5 0.5  4 4 5 6 7  0 0 0  0  0
";

fn ell() -> Arc<NavMesh> {
    Arc::new(load_from_reader(L_NAV.as_bytes()).unwrap())
}

fn islands() -> Arc<NavMesh> {
    Arc::new(load_from_reader(ISLANDS_NAV.as_bytes()).unwrap())
}

fn room() -> Arc<NavMesh> {
    Arc::new(load_from_reader(ROOM_NAV.as_bytes()).unwrap())
}

fn test_config(total_ticks: u64) -> SimConfig {
    SimConfig {
        time_step:             0.1,
        total_ticks,
        seed:                  42,
        num_threads:           Some(1),
        output_interval_ticks: total_ticks,
    }
}

fn small_agents(positions: &[(f32, f32)]) -> (AgentStore, NeighborLists) {
    AgentStoreBuilder::new(positions.len())
        .params(AgentParams { radius: 0.1, ..AgentParams::default() })
        .positions(positions.iter().map(|&(x, y)| Vector2::new(x, y)))
        .build()
}

// ── SimBuilder validation ─────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use nav_core::NodeId;
    use nav_path::Goal;
    use nav_planner::PathPlanner;

    use super::*;
    use crate::{SimError, VelocityComponent};

    #[test]
    fn builds_successfully_with_defaults() {
        let (store, nbrs) = small_agents(&[(0.5, 0.5), (1.5, 1.5)]);
        let sim = SimBuilder::new(test_config(10), ell(), store, nbrs).build().unwrap();
        assert_eq!(sim.agents.len(), 2);
        assert_eq!(sim.goals, vec![None, None]);
        assert!(sim.velocity.iter().all(|v| *v == VelocityComponent::nav_mesh()));
        assert_eq!(sim.clock.current_tick, Tick(0));
    }

    #[test]
    fn agents_are_located_at_build() {
        let (store, nbrs) = small_agents(&[(0.5, 0.5), (1.5, 1.5), (5.0, 5.0)]);
        let sim = SimBuilder::new(test_config(10), ell(), store, nbrs).build().unwrap();
        assert_eq!(sim.localizer.node_of_agent(AgentId(0)), Some(NodeId(0)));
        assert_eq!(sim.localizer.node_of_agent(AgentId(1)), Some(NodeId(2)));
        assert_eq!(sim.localizer.node_of_agent(AgentId(2)), None);
    }

    #[test]
    fn goal_count_mismatch_errors() {
        let (store, nbrs) = small_agents(&[(0.5, 0.5), (1.5, 0.5)]);
        let result = SimBuilder::new(test_config(10), ell(), store, nbrs)
            .goals(vec![None]) // wrong length
            .build();
        assert!(matches!(result, Err(SimError::AgentCountMismatch { what: "goals", got: 1, .. })));
    }

    #[test]
    fn velocity_count_mismatch_errors() {
        let (store, nbrs) = small_agents(&[(0.5, 0.5)]);
        let result = SimBuilder::new(test_config(10), ell(), store, nbrs)
            .velocity(vec![VelocityComponent::Zero; 3])
            .build();
        assert!(matches!(
            result,
            Err(SimError::AgentCountMismatch { what: "velocity components", expected: 1, got: 3 })
        ));
    }

    #[test]
    fn bad_time_step_rejected() {
        let (store, nbrs) = small_agents(&[(0.5, 0.5)]);
        let config = SimConfig { time_step: 0.0, ..test_config(10) };
        let result = SimBuilder::new(config, ell(), store, nbrs).build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn planner_for_another_mesh_rejected() {
        let (store, nbrs) = small_agents(&[(0.5, 0.5)]);
        let other = Arc::new(PathPlanner::new(ell()));
        let result = SimBuilder::new(test_config(10), ell(), store, nbrs).planner(other).build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn shared_planner_is_used() {
        let mesh = ell();
        let planner = Arc::new(PathPlanner::new(Arc::clone(&mesh)));
        let (store, nbrs) = small_agents(&[(0.5, 0.5)]);
        let sim = SimBuilder::new(test_config(10), mesh, store, nbrs)
            .planner(Arc::clone(&planner))
            .goal_for_all(Goal::Point(Vector2::new(1.5, 1.5)))
            .build()
            .unwrap();
        assert!(Arc::ptr_eq(&sim.planner, &planner));
        assert!(Arc::ptr_eq(sim.localizer.planner(), &planner));
        assert_eq!(sim.goals.len(), 1);
    }
}

// ── Velocity components ───────────────────────────────────────────────────────

#[cfg(test)]
mod velocity_tests {
    use nav_core::{NodeId, PrefVelocity};
    use nav_localizer::NavMeshLocation;
    use nav_path::Goal;
    use nav_planner::PathPlanner;

    use super::*;
    use crate::{SimContext, SimError, VelocityComponent};

    fn ctx() -> SimContext {
        SimContext { tick: Tick(0), time_step: 0.1, global_time: 0.0 }
    }

    fn near(a: Vector2, b: Vector2) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn zero_stands_still() {
        let mesh = ell();
        let planner = PathPlanner::new(Arc::clone(&mesh));
        let (store, _) = small_agents(&[(0.5, 0.5)]);
        let agent = store.get(AgentId(0));
        let mut loc = NavMeshLocation::Node(NodeId(0));
        let mut pvel = PrefVelocity::default();
        VelocityComponent::Zero
            .set_pref_velocity(agent, None, &mut loc, &mesh, &planner, &ctx(), &mut pvel)
            .unwrap();
        assert_eq!(pvel.speed(), 0.0);
        assert_eq!(pvel.target(), agent.pos);
        assert_eq!(pvel.preferred_velocity(), Vector2::ZERO);
    }

    #[test]
    fn constant_normalizes_and_projects_target() {
        let mesh = ell();
        let planner = PathPlanner::new(Arc::clone(&mesh));
        let (store, _) = small_agents(&[(0.5, 0.5)]);
        let agent = store.get(AgentId(0));
        let mut loc = NavMeshLocation::default();
        let mut pvel = PrefVelocity::default();
        let comp = VelocityComponent::constant(Vector2::new(3.0, 4.0), 2.0);
        comp.set_pref_velocity(agent, None, &mut loc, &mesh, &planner, &ctx(), &mut pvel).unwrap();
        assert!(pvel.is_single());
        assert!(near(pvel.preferred(), Vector2::new(0.6, 0.8)));
        assert_eq!(pvel.speed(), 2.0);
        // 5 s of travel ahead.
        assert!(near(pvel.target(), Vector2::new(0.5 + 6.0, 0.5 + 8.0)));
    }

    #[test]
    fn goal_steers_straight_at_goal() {
        let mesh = ell();
        let planner = PathPlanner::new(Arc::clone(&mesh));
        let (store, _) = small_agents(&[(0.5, 0.5)]);
        let agent = store.get(AgentId(0));
        let goal = Goal::Point(Vector2::new(1.5, 1.5));
        let mut loc = NavMeshLocation::Node(NodeId(0));
        let mut pvel = PrefVelocity::default();
        VelocityComponent::Goal
            .set_pref_velocity(agent, Some(&goal), &mut loc, &mesh, &planner, &ctx(), &mut pvel)
            .unwrap();
        let s = std::f32::consts::FRAC_1_SQRT_2;
        assert!(near(pvel.preferred(), Vector2::new(s, s)));
        assert_eq!(pvel.speed(), agent.params.pref_speed);
        // Direct steering never touches the mesh location.
        assert!(!loc.is_path());
    }

    #[test]
    fn goal_driven_without_goal_stands_still() {
        let mesh = ell();
        let planner = PathPlanner::new(Arc::clone(&mesh));
        let (store, _) = small_agents(&[(0.5, 0.5)]);
        let agent = store.get(AgentId(0));
        let mut loc = NavMeshLocation::Node(NodeId(0));
        let mut pvel = PrefVelocity::default();
        VelocityComponent::nav_mesh()
            .set_pref_velocity(agent, None, &mut loc, &mesh, &planner, &ctx(), &mut pvel)
            .unwrap();
        assert_eq!(pvel.speed(), 0.0);
        assert!(!loc.is_path());
    }

    #[test]
    fn nav_mesh_plans_path_on_first_use() {
        let mesh = ell();
        let planner = PathPlanner::new(Arc::clone(&mesh));
        let (store, _) = small_agents(&[(0.5, 0.5)]);
        let agent = store.get(AgentId(0));
        let goal = Goal::Point(Vector2::new(1.5, 1.5));
        let mut loc = NavMeshLocation::Node(NodeId(0));
        let mut pvel = PrefVelocity::default();
        VelocityComponent::nav_mesh()
            .set_pref_velocity(agent, Some(&goal), &mut loc, &mesh, &planner, &ctx(), &mut pvel)
            .unwrap();

        let path = loc.path().expect("path planned");
        assert_eq!(path.portal_count(), 2);
        assert_eq!(path.goal(), &goal);
        // Still in the start node.
        assert_eq!(loc.node(), NodeId(0));
        assert_eq!(pvel.speed(), agent.params.pref_speed);
        assert_eq!(pvel.target(), loc.path().unwrap().waypoint(0));
        assert_eq!(planner.cached_route_count(NodeId(0), NodeId(2)), 1);
    }

    #[test]
    fn nav_mesh_waits_for_location() {
        let mesh = ell();
        let planner = PathPlanner::new(Arc::clone(&mesh));
        let (store, _) = small_agents(&[(0.5, 0.5)]);
        let agent = store.get(AgentId(0));
        let goal = Goal::Point(Vector2::new(1.5, 1.5));
        let mut loc = NavMeshLocation::default();
        let mut pvel = PrefVelocity::default();
        VelocityComponent::nav_mesh()
            .set_pref_velocity(agent, Some(&goal), &mut loc, &mesh, &planner, &ctx(), &mut pvel)
            .unwrap();
        assert!(!loc.is_path());
        assert_eq!(pvel.speed(), 0.0);
    }

    #[test]
    fn nav_mesh_goal_off_mesh_errors() {
        let mesh = ell();
        let planner = PathPlanner::new(Arc::clone(&mesh));
        let (store, _) = small_agents(&[(0.5, 0.5)]);
        let agent = store.get(AgentId(0));
        let goal = Goal::Point(Vector2::new(5.0, 5.0));
        let mut loc = NavMeshLocation::Node(NodeId(0));
        let mut pvel = PrefVelocity::default();
        let result = VelocityComponent::nav_mesh()
            .set_pref_velocity(agent, Some(&goal), &mut loc, &mesh, &planner, &ctx(), &mut pvel);
        assert!(matches!(result, Err(SimError::GoalOffMesh(AgentId(0)))));
    }

    #[test]
    fn threshold_is_stored_as_cosine() {
        let VelocityComponent::NavMesh { heading_threshold_cos } =
            VelocityComponent::nav_mesh_with_threshold(60.0)
        else {
            panic!("expected NavMesh");
        };
        assert!((heading_threshold_cos - 0.5).abs() < 1e-5);
        assert!(VelocityComponent::nav_mesh().needs_goal());
        assert!(!VelocityComponent::Zero.needs_goal());
    }
}

// ── Tick loop ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod run_tests {
    use nav_core::NodeId;
    use nav_path::Goal;

    use super::*;
    use crate::{NoopObserver, SimContext, SimError, VelocityComponent};

    #[derive(Default)]
    struct CountingObserver {
        starts:     usize,
        ends:       usize,
        snapshots:  Vec<Tick>,
        final_tick: Option<Tick>,
    }

    impl SimObserver for CountingObserver {
        fn on_tick_start(&mut self, _tick: Tick) {
            self.starts += 1;
        }

        fn on_tick_end(&mut self, _tick: Tick, _agents: &AgentStore) {
            self.ends += 1;
        }

        fn on_snapshot(
            &mut self,
            tick:       Tick,
            _agents:    &AgentStore,
            _localizer: &nav_localizer::NavMeshLocalizer,
        ) {
            self.snapshots.push(tick);
        }

        fn on_sim_end(&mut self, final_tick: Tick) {
            self.final_tick = Some(final_tick);
        }
    }

    /// Smallest pairwise distance seen at any tick end.
    struct MinGap(f32);

    impl SimObserver for MinGap {
        fn on_tick_end(&mut self, _tick: Tick, agents: &AgentStore) {
            let a = &agents.agents;
            for i in 0..a.len() {
                for j in i + 1..a.len() {
                    self.0 = self.0.min(a[i].pos.distance(a[j].pos));
                }
            }
        }
    }

    #[test]
    fn observer_hooks_fire() {
        let (store, nbrs) = small_agents(&[(0.5, 0.5)]);
        let config = SimConfig { output_interval_ticks: 2, ..test_config(5) };
        let mut sim = SimBuilder::new(config, ell(), store, nbrs)
            .velocity(vec![VelocityComponent::Zero])
            .build()
            .unwrap();
        let mut obs = CountingObserver::default();
        sim.run(&mut obs).unwrap();
        assert_eq!(obs.starts, 5);
        assert_eq!(obs.ends, 5);
        assert_eq!(obs.snapshots, vec![Tick(0), Tick(2), Tick(4)]);
        assert_eq!(obs.final_tick, Some(Tick(5)));
    }

    #[test]
    fn run_ticks_ignores_end_tick() {
        let (store, nbrs) = small_agents(&[(0.5, 0.5)]);
        let mut sim = SimBuilder::new(test_config(2), ell(), store, nbrs)
            .velocity(vec![VelocityComponent::Zero])
            .build()
            .unwrap();
        sim.run_ticks(4, &mut NoopObserver).unwrap();
        assert_eq!(sim.clock.current_tick, Tick(4));
        assert_eq!(
            sim.context(),
            SimContext { tick: Tick(4), time_step: 0.1, global_time: 4.0 * 0.1f32 as f64 }
        );
    }

    #[test]
    fn zero_velocity_agents_stay_put() {
        let (store, nbrs) = small_agents(&[(0.5, 0.5), (1.5, 0.5)]);
        let mut sim = SimBuilder::new(test_config(10), ell(), store, nbrs)
            .velocity(vec![VelocityComponent::Zero; 2])
            .build()
            .unwrap();
        sim.run(&mut NoopObserver).unwrap();
        assert_eq!(sim.agents.get(AgentId(0)).pos, Vector2::new(0.5, 0.5));
        assert_eq!(sim.agents.get(AgentId(1)).pos, Vector2::new(1.5, 0.5));
    }

    #[test]
    fn constant_velocity_accelerates_then_cruises() {
        let (store, nbrs) = small_agents(&[(0.5, 0.5)]);
        let mut sim = SimBuilder::new(test_config(5), ell(), store, nbrs)
            .velocity(vec![VelocityComponent::constant(Vector2::new(1.0, 0.0), 0.5)])
            .build()
            .unwrap();
        sim.run(&mut NoopObserver).unwrap();
        // max_accel 2 m/s² at 0.1 s: 0.2, 0.4, then 0.5 m/s for three ticks.
        let agent = sim.agents.get(AgentId(0));
        assert!((agent.pos.x - 0.71).abs() < 1e-3, "x = {}", agent.pos.x);
        assert!((agent.pos.y - 0.5).abs() < 1e-3);
        assert!((agent.vel.x - 0.5).abs() < 1e-4);
    }

    #[test]
    fn agent_follows_path_around_corner() {
        let (store, nbrs) = small_agents(&[(0.5, 0.5)]);
        let goal = Goal::Circle { center: Vector2::new(1.5, 1.5), radius: 0.3 };
        let mut sim = SimBuilder::new(test_config(100), ell(), store, nbrs)
            .goal_for_all(goal)
            .build()
            .unwrap();
        sim.run(&mut NoopObserver).unwrap();

        let pos = sim.agents.get(AgentId(0)).pos;
        assert!(pos.distance(Vector2::new(1.5, 1.5)) < 0.35, "ended at ({}, {})", pos.x, pos.y);
        assert_eq!(sim.localizer.node_of_agent(AgentId(0)), Some(NodeId(2)));
        let path = sim.localizer.path(AgentId(0)).expect("still on its path");
        assert_eq!(path.current_portal(), path.portal_count());
    }

    #[test]
    fn crossing_agents_keep_apart() {
        let (store, nbrs) = AgentStoreBuilder::new(2)
            .positions([Vector2::new(2.0, 5.0), Vector2::new(8.0, 5.1)])
            .build();
        let goals = vec![
            Some(Goal::Point(Vector2::new(8.0, 5.0))),
            Some(Goal::Point(Vector2::new(2.0, 5.1))),
        ];
        let mut sim = SimBuilder::new(test_config(100), room(), store, nbrs)
            .goals(goals)
            .velocity(vec![VelocityComponent::Goal; 2])
            .build()
            .unwrap();
        let mut gap = MinGap(f32::MAX);
        sim.run(&mut gap).unwrap();

        let r = AgentParams::default().radius;
        assert!(gap.0 > 2.0 * r - 0.05, "closest approach {}", gap.0);
        assert!(sim.agents.get(AgentId(0)).pos.x > 6.0);
        assert!(sim.agents.get(AgentId(1)).pos.x < 4.0);
    }

    #[test]
    fn set_goal_drops_path() {
        let (store, nbrs) = small_agents(&[(0.5, 0.5)]);
        let mut sim = SimBuilder::new(test_config(100), ell(), store, nbrs)
            .goal_for_all(Goal::Point(Vector2::new(1.5, 1.5)))
            .build()
            .unwrap();
        sim.run_ticks(1, &mut NoopObserver).unwrap();
        assert!(sim.localizer.path(AgentId(0)).is_some());

        let next = Goal::Point(Vector2::new(1.5, 0.5));
        sim.set_goal(AgentId(0), next).unwrap();
        assert!(sim.localizer.path(AgentId(0)).is_none());
        assert_eq!(sim.goals[0], Some(next));

        sim.run_ticks(1, &mut NoopObserver).unwrap();
        assert_eq!(sim.localizer.path(AgentId(0)).map(|p| *p.goal()), Some(next));
    }

    #[test]
    fn set_goal_unknown_agent_errors() {
        let (store, nbrs) = small_agents(&[(0.5, 0.5)]);
        let mut sim = SimBuilder::new(test_config(1), ell(), store, nbrs).build().unwrap();
        let result = sim.set_goal(AgentId(7), Goal::Point(Vector2::ZERO));
        assert!(matches!(result, Err(SimError::Localizer(_))));
    }

    #[test]
    fn goal_off_mesh_stops_the_run() {
        let (store, nbrs) = small_agents(&[(0.5, 0.5)]);
        let mut sim = SimBuilder::new(test_config(10), ell(), store, nbrs)
            .goal_for_all(Goal::Point(Vector2::new(5.0, 5.0)))
            .build()
            .unwrap();
        let result = sim.run(&mut NoopObserver);
        assert!(matches!(result, Err(SimError::GoalOffMesh(AgentId(0)))));
        assert_eq!(sim.clock.current_tick, Tick(0));
    }

    #[test]
    fn unreachable_goal_names_the_agent() {
        let (store, nbrs) = small_agents(&[(0.5, 0.5), (0.5, 0.8)]);
        let home = Goal::Point(Vector2::new(0.2, 0.2));
        let across = Goal::Point(Vector2::new(3.5, 0.5));
        let mut sim = SimBuilder::new(test_config(10), islands(), store, nbrs)
            .goals(vec![Some(home), Some(across)])
            .build()
            .unwrap();
        match sim.run_ticks(1, &mut NoopObserver) {
            Err(SimError::NoRoute { agent, source }) => {
                assert_eq!(agent, AgentId(1));
                assert!(matches!(
                    source,
                    nav_planner::PlannerError::NoRoute { from: NodeId(0), to: NodeId(1), .. }
                ));
            }
            other => panic!("expected NoRoute, got {:?}", other.err()),
        }
    }
}
