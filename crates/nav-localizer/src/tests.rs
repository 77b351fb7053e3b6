//! Unit tests for nav-localizer.

#[cfg(test)]
mod helpers {
    use std::sync::Arc;

    use nav_agent::{AgentParams, AgentStore, AgentStoreBuilder, NeighborLists};
    use nav_core::Vector2;
    use nav_mesh::{NavMesh, load_from_reader};

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

    pub fn ell() -> Arc<NavMesh> {
        Arc::new(load_from_reader(L_NAV.as_bytes()).unwrap())
    }

    pub fn agents(positions: &[(f32, f32)]) -> (AgentStore, NeighborLists) {
        agents_with(AgentParams { radius: 0.1, ..AgentParams::default() }, positions)
    }

    pub fn agents_with(params: AgentParams, positions: &[(f32, f32)]) -> (AgentStore, NeighborLists) {
        AgentStoreBuilder::new(positions.len())
            .params(params)
            .positions(positions.iter().map(|&(x, y)| Vector2::new(x, y)))
            .build()
    }
}

#[cfg(test)]
mod location {
    use nav_core::{AgentId, NodeId, Vector2};

    use super::helpers;
    use crate::{LocalizerError, NavMeshLocalizer, NavMeshLocation};

    fn ids(v: Vec<AgentId>) -> Vec<u32> {
        v.into_iter().map(|a| a.0).collect()
    }

    #[test]
    fn first_update_places_everyone() {
        let mesh = helpers::ell();
        let (store, _) = helpers::agents(&[(0.5, 0.5), (1.5, 0.5), (1.5, 1.5), (0.2, 0.8)]);
        let mut loc = NavMeshLocalizer::new(mesh, store.len());
        assert_eq!(loc.node_of_agent(AgentId(0)), None);

        loc.update_all(&store).unwrap();
        assert_eq!(loc.node_of_agent(AgentId(0)), Some(NodeId(0)));
        assert_eq!(loc.node_of_agent(AgentId(1)), Some(NodeId(1)));
        assert_eq!(loc.node_of_agent(AgentId(2)), Some(NodeId(2)));
        assert_eq!(ids(loc.occupants_of(NodeId(0))), vec![0, 3]);
        assert_eq!(ids(loc.occupants_of(NodeId(1))), vec![1]);
    }

    #[test]
    fn moving_agent_changes_sets() {
        let mesh = helpers::ell();
        let (mut store, _) = helpers::agents(&[(0.5, 0.5)]);
        let mut loc = NavMeshLocalizer::new(mesh, 1);
        loc.update_all(&store).unwrap();

        store.agents[0].pos = Vector2::new(1.5, 0.5);
        assert_eq!(loc.update_location(&store.agents[0]).unwrap(), NodeId(1));
        assert!(loc.occupants_of(NodeId(0)).is_empty());
        assert_eq!(ids(loc.occupants_of(NodeId(1))), vec![0]);

        // Two nodes in one step: not a neighbor, so found blind.
        store.agents[0].pos = Vector2::new(0.5, 0.5);
        loc.update_location(&store.agents[0]).unwrap();
        store.agents[0].pos = Vector2::new(1.5, 1.5);
        assert_eq!(loc.update_location(&store.agents[0]).unwrap(), NodeId(2));
        assert_eq!(ids(loc.occupants_of(NodeId(2))), vec![0]);
    }

    #[test]
    fn off_mesh_agent_stays_put() {
        let mesh = helpers::ell();
        let (mut store, _) = helpers::agents(&[(0.5, 1.5)]);
        let mut loc = NavMeshLocalizer::new(mesh, 1);

        // Never on the mesh: no node at all.
        loc.update_all(&store).unwrap();
        assert_eq!(loc.node_of_agent(AgentId(0)), None);

        store.agents[0].pos = Vector2::new(0.5, 0.5);
        loc.update_all(&store).unwrap();
        assert_eq!(loc.node_of_agent(AgentId(0)), Some(NodeId(0)));

        // Pushed off the mesh: the last node is kept.
        store.agents[0].pos = Vector2::new(-3.0, 0.5);
        assert_eq!(loc.update_location(&store.agents[0]).unwrap(), NodeId(0));
        assert_eq!(ids(loc.occupants_of(NodeId(0))), vec![0]);
    }

    #[test]
    fn point_lookup_is_pure() {
        let mesh = helpers::ell();
        let loc = NavMeshLocalizer::new(mesh, 0);
        assert_eq!(loc.node_of_point(Vector2::new(1.5, 1.2)), Some(NodeId(2)));
        assert_eq!(loc.node_of_point(Vector2::new(0.5, 1.5)), None);
    }

    #[test]
    fn set_node_updates_occupancy() {
        let mesh = helpers::ell();
        let (store, _) = helpers::agents(&[(0.5, 0.5)]);
        let mut loc = NavMeshLocalizer::new(mesh, 1);
        loc.update_all(&store).unwrap();

        loc.set_node(AgentId(0), NodeId(2)).unwrap();
        assert!(loc.occupants_of(NodeId(0)).is_empty());
        assert_eq!(ids(loc.occupants_of(NodeId(2))), vec![0]);

        let err = loc.set_node(AgentId(0), NodeId(9)).unwrap_err();
        assert!(matches!(err, LocalizerError::InvalidNode { count: 3, .. }));
        let err = loc.set_node(AgentId(4), NodeId(1)).unwrap_err();
        assert!(matches!(err, LocalizerError::UnknownAgent { count: 1, .. }));
    }

    #[test]
    fn store_size_must_match() {
        let mesh = helpers::ell();
        let (store, _) = helpers::agents(&[(0.5, 0.5), (1.5, 0.5)]);
        let mut loc = NavMeshLocalizer::new(mesh, 3);
        let err = loc.update_all(&store).unwrap_err();
        assert!(matches!(err, LocalizerError::AgentCountMismatch { expected: 3, got: 2 }));
    }

    #[test]
    fn misrecorded_occupant_is_recovered() {
        let mesh = helpers::ell();
        let (mut store, _) = helpers::agents(&[(0.5, 0.5)]);
        let mut loc = NavMeshLocalizer::new(mesh, 1);
        loc.update_all(&store).unwrap();

        // The location claims n1 while the occupancy still says n0.
        loc.locations_mut()[0] = NavMeshLocation::Node(NodeId(1));
        store.agents[0].pos = Vector2::new(1.5, 1.5);
        assert_eq!(loc.update_location(&store.agents[0]).unwrap(), NodeId(2));

        let occ = loc.occupants();
        let holders: Vec<usize> = (0..occ.len()).filter(|&i| occ[i].contains(&AgentId(0))).collect();
        assert_eq!(holders, vec![2]);
    }
}

#[cfg(test)]
mod paths {
    use nav_core::{AgentId, NodeId, Vector2};
    use nav_path::{Goal, PortalPath};

    use super::helpers;
    use crate::NavMeshLocalizer;

    #[test]
    fn path_drives_location() {
        let mesh = helpers::ell();
        let (mut store, _) = helpers::agents(&[(0.5, 0.5)]);
        let mut loc = NavMeshLocalizer::new(mesh, 1);
        loc.update_all(&store).unwrap();

        let route = loc.planner().get_route(NodeId(0), NodeId(2), 0.2).unwrap();
        let path = PortalPath::new(store.agents[0].pos, Goal::Point(Vector2::new(1.5, 1.5)), route, 0.1);
        loc.set_path(AgentId(0), path).unwrap();
        assert!(loc.location(AgentId(0)).unwrap().is_path());

        store.agents[0].pos = Vector2::new(1.5, 0.5);
        assert_eq!(loc.update_location(&store.agents[0]).unwrap(), NodeId(1));
        assert_eq!(loc.path(AgentId(0)).unwrap().current_portal(), 1);
        assert_eq!(loc.occupants_of(NodeId(1)), vec![AgentId(0)]);

        loc.clear_path(AgentId(0)).unwrap();
        assert!(loc.path(AgentId(0)).is_none());
        assert_eq!(loc.node_of_agent(AgentId(0)), Some(NodeId(1)));
    }

    #[test]
    fn set_node_drops_path() {
        let mesh = helpers::ell();
        let (store, _) = helpers::agents(&[(0.5, 0.5)]);
        let mut loc = NavMeshLocalizer::new(mesh, 1);
        loc.update_all(&store).unwrap();

        let route = loc.planner().get_route(NodeId(0), NodeId(1), 0.2).unwrap();
        let path = PortalPath::new(store.agents[0].pos, Goal::Point(Vector2::new(1.5, 0.5)), route, 0.1);
        loc.set_path(AgentId(0), path).unwrap();
        loc.set_node(AgentId(0), NodeId(0)).unwrap();
        assert!(loc.path_mut(AgentId(0)).is_none());
    }
}

#[cfg(test)]
mod query {
    use nav_agent::{AgentParams, ProximityFilter};
    use nav_core::{AgentId, NodeId, ObstacleId};

    use super::helpers;
    use crate::NavMeshLocalizer;

    fn neighbors_of(params: AgentParams, positions: &[(f32, f32)]) -> Vec<u32> {
        let mesh = helpers::ell();
        let (store, mut nbrs) = helpers::agents_with(params, positions);
        let mut loc = NavMeshLocalizer::new(mesh, store.len());
        loc.update_all(&store).unwrap();

        let query = loc.spatial_query(&store);
        let me = store.get(AgentId(0));
        let nbr = nbrs.get_mut(AgentId(0));
        nbr.start_query(me, loc.node_of_agent(AgentId(0)).unwrap());
        query.agent_query(nbr);
        nbr.agents.iter().map(|n| n.agent.0).collect()
    }

    #[test]
    fn corner_hides_agents() {
        let found = neighbors_of(
            AgentParams::default(),
            &[(0.1, 0.1), (0.5, 0.5), (1.9, 1.2), (1.2, 1.9), (1.5, 0.5)],
        );
        // Sorted by distance; agent 3 is behind the inner corner.
        assert_eq!(found, vec![1, 4, 2]);
    }

    #[test]
    fn full_filter_stops_early() {
        let params = AgentParams { max_neighbors: 1, ..AgentParams::default() };
        let found = neighbors_of(params, &[(0.1, 0.1), (1.5, 0.5), (0.5, 0.5), (1.9, 1.2)]);
        assert_eq!(found, vec![2]);
    }

    #[test]
    fn range_limits_search() {
        let params = AgentParams { neighbor_dist: 1.0, ..AgentParams::default() };
        let found = neighbors_of(params, &[(0.1, 0.1), (0.5, 0.5), (1.9, 1.2), (1.5, 0.5)]);
        assert_eq!(found, vec![1]);
    }

    #[test]
    fn hint_is_optional() {
        let mesh = helpers::ell();
        let (store, mut nbrs) = helpers::agents(&[(0.1, 0.1), (1.5, 0.5)]);
        let mut loc = NavMeshLocalizer::new(mesh, store.len());
        loc.update_all(&store).unwrap();

        let nbr = nbrs.get_mut(AgentId(0));
        nbr.start_query(store.get(AgentId(0)), NodeId::INVALID);
        assert_eq!(nbr.query_node(), NodeId::INVALID);
        loc.spatial_query(&store).agent_query(nbr);
        assert_eq!(nbr.agents.len(), 1);
    }

    #[test]
    fn obstacles_of_current_node() {
        let mesh = helpers::ell();
        let (store, mut nbrs) = helpers::agents(&[(0.1, 0.1)]);
        let mut loc = NavMeshLocalizer::new(mesh, 1);
        loc.update_all(&store).unwrap();

        let nbr = nbrs.get_mut(AgentId(0));
        nbr.start_query(store.get(AgentId(0)), NodeId(0));
        loc.spatial_query(&store).obstacle_query(nbr);
        let mut found: Vec<ObstacleId> = nbr.obstacles.iter().map(|o| o.obstacle).collect();
        assert_eq!(found.pop(), Some(ObstacleId(1)));
        found.sort();
        assert_eq!(found, vec![ObstacleId(0), ObstacleId(7)]);
    }
}
