//! Unit tests for nav-planner.

#[cfg(test)]
pub(crate) mod helpers {
    use std::sync::Arc;

    use nav_mesh::{NavMesh, load_from_reader};

    /// Three rooms in a row joined by 0.1 m slits, plus a hall above joined
    /// to the outer rooms by 1 m portals.
    ///
    /// ```text
    ///   ┌───────────────────┐
    ///   │        n3         │
    ///   ├──────┬─────┬──────┤
    ///   │  n0  ┊ n1  ┊  n2  │
    ///   └──────┴─────┴──────┘
    /// ```
    ///
    /// Narrow agents go straight through n1 (length 2); wide ones detour
    /// through n3 (length 2√2).
    const SLITS_NAV: &str = "\
14
0 0
1 0
2 0
3 0
3 1
2 1
1 1
0 1
0 2
3 2
1 0.45
1 0.55
2 0.45
2 0.55
4
10 11 0 1
12 13 1 2
7 6 0 3
5 4 2 3
0
rooms 4
0.5 0.5  4 0 1 6 7  0 0 0  2 0 2  0
1.5 0.5  4 1 2 5 6  0 0 0  2 0 1  0
2.5 0.5  4 2 3 4 5  0 0 0  2 1 3  0
1.5 1.5  6 7 6 5 4 9 8  0 0 0  2 2 3  0
";

    pub fn slits() -> Arc<NavMesh> {
        Arc::new(load_from_reader(SLITS_NAV.as_bytes()).unwrap())
    }
}

#[cfg(test)]
mod route {
    use nav_core::{NodeId, Vector2};

    use super::helpers;
    use crate::PathPlanner;

    fn nodes(planner: &PathPlanner, clearance: f32) -> Vec<u32> {
        let route = planner.get_route(NodeId(0), NodeId(2), clearance).unwrap();
        route.nodes().map(|n| n.0).collect()
    }

    #[test]
    fn narrow_agent_takes_the_slits() {
        let planner = PathPlanner::new(helpers::slits());
        assert_eq!(nodes(&planner, 0.05), vec![0, 1, 2]);
        let route = planner.get_route(NodeId(0), NodeId(2), 0.05).unwrap();
        assert!((route.max_width - 0.1).abs() < 1e-5);
        assert!((route.length - 2.0).abs() < 1e-5);
    }

    #[test]
    fn wide_agent_detours() {
        let planner = PathPlanner::new(helpers::slits());
        assert_eq!(nodes(&planner, 0.5), vec![0, 3, 2]);
        let route = planner.get_route(NodeId(0), NodeId(2), 0.5).unwrap();
        assert!((route.max_width - 1.0).abs() < 1e-5);
        assert!((route.length - 2.0 * std::f32::consts::SQRT_2).abs() < 1e-4);
    }

    #[test]
    fn same_node_route_is_empty() {
        let planner = PathPlanner::new(helpers::slits());
        let route = planner.get_route(NodeId(3), NodeId(3), 0.5).unwrap();
        assert_eq!(route.portal_count(), 0);
        assert_eq!(route.max_width, f32::INFINITY);
        assert_eq!(route.node_at(0), NodeId(3));
    }

    #[test]
    fn portal_sides_follow_travel_direction() {
        let planner = PathPlanner::new(helpers::slits());
        let route = planner.get_route(NodeId(0), NodeId(2), 0.05).unwrap();
        let p = route.portal(0);
        assert_eq!(p.node, NodeId(0));
        // Heading +x, so the upper end is on the left.
        assert!(!p.p0_is_left);
        assert!((p.left(0.01) - Vector2::new(1.0, 0.54)).length() < 1e-5);
        assert!((p.right(0.01) - Vector2::new(1.0, 0.46)).length() < 1e-5);

        // Coming back the other way the sides swap.
        let back = planner.get_route(NodeId(1), NodeId(0), 0.05).unwrap();
        assert!(back.portal(0).p0_is_left);
    }

    #[test]
    fn intersection_point_is_clamped() {
        let planner = PathPlanner::new(helpers::slits());
        let route = planner.get_route(NodeId(0), NodeId(2), 0.05).unwrap();
        let p = route.portal(0);
        let hit = p.intersection_point(Vector2::new(0.5, 0.5), Vector2::new(1.0, 0.0));
        assert!((hit - Vector2::new(1.0, 0.5)).length() < 1e-5);
        let miss = p.intersection_point(Vector2::new(0.5, 0.0), Vector2::new(1.0, 0.0));
        assert!((miss - Vector2::new(1.0, 0.45)).length() < 1e-5);
    }
}

#[cfg(test)]
mod cache {
    use std::sync::Arc;

    use nav_core::NodeId;

    use super::helpers;
    use crate::{PathPlanner, PlannerError};

    const A: NodeId = NodeId(0);
    const B: NodeId = NodeId(2);

    #[test]
    fn repeated_request_hits_cache() {
        let planner = PathPlanner::new(helpers::slits());
        let r1 = planner.get_route(A, B, 0.05).unwrap();
        let r2 = planner.get_route(A, B, 0.05).unwrap();
        assert!(Arc::ptr_eq(&r1, &r2));
        assert_eq!(planner.cached_route_count(A, B), 1);
    }

    #[test]
    fn slightly_smaller_clearance_reuses_route() {
        let planner = PathPlanner::new(helpers::slits());
        let r1 = planner.get_route(A, B, 0.05).unwrap();
        let r2 = planner.get_route(A, B, 0.049).unwrap();
        assert!(Arc::ptr_eq(&r1, &r2));
        assert_eq!(planner.cached_route_count(A, B), 1);
    }

    #[test]
    fn equivalent_recompute_merges() {
        let planner = PathPlanner::new(helpers::slits());
        let r1 = planner.get_route(A, B, 0.08).unwrap();
        // Far below the proven bound: searched again, same nodes.
        let r2 = planner.get_route(A, B, 0.01).unwrap();
        assert!(Arc::ptr_eq(&r1, &r2));
        assert_eq!(planner.cached_route_count(A, B), 1);
        // The bound was tightened, so this is now a hit.
        let r3 = planner.get_route(A, B, 0.02).unwrap();
        assert!(Arc::ptr_eq(&r1, &r3));
    }

    #[test]
    fn wider_request_recomputes_and_keeps_both() {
        let planner = PathPlanner::new(helpers::slits());
        let narrow = planner.get_route(A, B, 0.05).unwrap();
        let wide = planner.get_route(A, B, 0.2).unwrap();
        assert!(!Arc::ptr_eq(&narrow, &wide));
        assert_eq!(planner.cached_route_count(A, B), 2);

        // Each clearance still gets its own optimum.
        assert!(Arc::ptr_eq(&planner.get_route(A, B, 0.05).unwrap(), &narrow));
        assert!(Arc::ptr_eq(&planner.get_route(A, B, 0.2).unwrap(), &wide));
    }

    #[test]
    fn route_exactly_as_wide_as_request_is_cached() {
        let planner = PathPlanner::new(helpers::slits());
        // Only the 1 m hall portals admit this clearance.
        let r1 = planner.get_route(A, B, 1.0).unwrap();
        assert_eq!(r1.max_width, 1.0);
        let hit = planner.lookup(A, B, 1.0).expect("cached route should serve its own width");
        assert!(Arc::ptr_eq(&r1, &hit));
        assert!(planner.lookup(A, B, 1.01).is_none());
    }

    #[test]
    fn clear_cache_forgets_routes() {
        let planner = PathPlanner::new(helpers::slits());
        planner.get_route(A, B, 0.05).unwrap();
        planner.clear_cache();
        assert_eq!(planner.cached_route_count(A, B), 0);
    }

    #[test]
    fn too_wide_for_any_route() {
        let planner = PathPlanner::new(helpers::slits());
        let err = planner.get_route(A, B, 2.0).unwrap_err();
        assert!(matches!(err, PlannerError::NoRoute { from: A, to: B, .. }));
        assert_eq!(planner.cached_route_count(A, B), 0);
    }

    #[test]
    fn unknown_node_rejected() {
        let planner = PathPlanner::new(helpers::slits());
        let err = planner.get_route(A, NodeId(99), 0.1).unwrap_err();
        assert!(matches!(err, PlannerError::InvalidNode { node: NodeId(99), count: 4 }));
    }

    #[test]
    fn concurrent_requests_agree() {
        let planner = PathPlanner::new(helpers::slits());
        let results: Vec<Vec<u32>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|i| {
                    let planner = &planner;
                    s.spawn(move || {
                        let clearance = if i % 2 == 0 { 0.05 } else { 0.5 };
                        let route = planner.get_route(A, B, clearance).unwrap();
                        route.nodes().map(|n| n.0).collect()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(results[0], vec![0, 1, 2]);
        assert_eq!(results[1], vec![0, 3, 2]);
        assert_eq!(results[2], results[0]);
        assert_eq!(results[3], results[1]);
        assert_eq!(planner.cached_route_count(A, B), 2);
    }
}
