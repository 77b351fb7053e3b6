//! The demo floor plan: two 4 × 4 rooms joined by a 3 m long, 1 m wide
//! corridor.
//!
//! ```text
//!   4 ┌───────┐           ┌───────┐
//!     │       │           │       │
//! 2.5 │  n0   ├───────────┤  n2   │
//!     │       │    n1     │       │
//! 1.5 │       ├───────────┤       │
//!     │       │           │       │
//!   0 └───────┘           └───────┘
//!     0       4           7       11
//! ```

use nav_core::{NodeId, ObstacleId, Vector2};
use nav_mesh::{MeshResult, NavMesh, NavMeshBuilder, NodeSpec};

pub const WEST_ROOM: (Vector2, Vector2) = (Vector2::new(0.0, 0.0), Vector2::new(4.0, 4.0));
pub const EAST_ROOM: (Vector2, Vector2) = (Vector2::new(7.0, 0.0), Vector2::new(11.0, 4.0));

pub fn build_corridor() -> MeshResult<NavMesh> {
    let mut b = NavMeshBuilder::with_capacity(12, 2, 12, 3);
    let v: Vec<_> = [
        (0.0, 0.0),
        (4.0, 0.0),
        (4.0, 1.5),
        (4.0, 2.5),
        (4.0, 4.0),
        (0.0, 4.0),
        (7.0, 1.5),
        (7.0, 2.5),
        (7.0, 0.0),
        (11.0, 0.0),
        (11.0, 4.0),
        (7.0, 4.0),
    ]
    .into_iter()
    .map(|(x, y)| b.add_vertex(Vector2::new(x, y)))
    .collect();

    let (west, hall, east) = (NodeId(0), NodeId(1), NodeId(2));
    let west_door = b.add_edge(v[2], v[3], west, hall);
    let east_door = b.add_edge(v[6], v[7], hall, east);

    // One closed clockwise chain around the whole floor: walkable space is
    // on its right.
    let walls = [
        (0, 5, west),
        (5, 4, west),
        (4, 3, west),
        (3, 7, hall),
        (7, 11, east),
        (11, 10, east),
        (10, 9, east),
        (9, 8, east),
        (8, 6, east),
        (6, 2, hall),
        (2, 1, west),
        (1, 0, west),
    ];
    let n = walls.len() as u32;
    for (i, &(a, z, node)) in walls.iter().enumerate() {
        let next = ObstacleId((i as u32 + 1) % n);
        b.add_obstacle(v[a], v[z], node, Some(next));
    }
    let walls_of = |ids: &[u32]| ids.iter().map(|&i| ObstacleId(i)).collect::<Vec<_>>();

    let corners = |ids: &[usize]| ids.iter().map(|&i| v[i]).collect::<Vec<_>>();
    b.add_group("floor", vec![
        NodeSpec {
            center:    Vector2::new(2.0, 2.0),
            vertices:  corners(&[0, 1, 2, 3, 4, 5]),
            edges:     vec![west_door],
            obstacles: walls_of(&[0, 1, 2, 10, 11]),
            ..NodeSpec::default()
        },
        NodeSpec {
            center:    Vector2::new(5.5, 2.0),
            vertices:  corners(&[2, 6, 7, 3]),
            edges:     vec![west_door, east_door],
            obstacles: walls_of(&[3, 9]),
            ..NodeSpec::default()
        },
        NodeSpec {
            center:    Vector2::new(9.0, 2.0),
            vertices:  corners(&[8, 9, 10, 11, 7, 6]),
            edges:     vec![east_door],
            obstacles: walls_of(&[4, 5, 6, 7, 8]),
            ..NodeSpec::default()
        },
    ])?;

    b.build()
}

