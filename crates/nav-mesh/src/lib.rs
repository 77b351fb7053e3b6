//! `nav-mesh`: the navigation mesh.
//!
//! A navigation mesh decomposes walkable space into convex polygons
//! (*nodes*).  Adjacent nodes share a *portal* edge; boundaries of walkable
//! space are chains of directed *obstacle* segments.
//!
//! Meshes are built in two phases.  [`NavMeshBuilder`] collects raw,
//! index-based data in any order; [`NavMeshBuilder::build`] validates every
//! index and width, links the structure, and returns an immutable
//! [`NavMesh`].  No `NavMesh` value exists until validation has passed, so
//! downstream crates never see malformed data.  Share the result as
//! `Arc<NavMesh>`.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`mesh`]     | `NavMesh`, `NodeGroup`, blind node search                 |
//! | [`builder`]  | `NavMeshBuilder`, `NodeSpec`                              |
//! | [`loader`]   | ASCII `.nav` loader (`load_from_path`, `load_from_reader`)|
//! | [`node`]     | `NavMeshNode`, `Polygon`                                  |
//! | [`edge`]     | `NavMeshEdge` (portal geometry and clearance directions)  |
//! | [`obstacle`] | `NavMeshObstacle` (linked chains, convexity)              |
//! | [`error`]    | `MeshError`, `MeshResult<T>`                              |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on the raw builder inputs. |

pub mod builder;
pub mod edge;
pub mod error;
pub mod loader;
pub mod mesh;
pub mod node;
pub mod obstacle;


pub use builder::{NavMeshBuilder, NodeSpec};
pub use edge::NavMeshEdge;
pub use error::{MeshError, MeshResult};
pub use loader::{load_from_path, load_from_reader};
pub use mesh::{NavMesh, NodeGroup};
pub use node::{NavMeshNode, Polygon};
pub use obstacle::NavMeshObstacle;

/// Edges and obstacles at or below this length are rejected.
pub const MIN_EDGE_WIDTH: f32 = 1.0e-5;
