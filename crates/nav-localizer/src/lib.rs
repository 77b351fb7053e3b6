//! `nav-localizer`: where every agent is on the navigation mesh.
//!
//! Each agent is located either by a bare node id or by the
//! [`PortalPath`](nav_path::PortalPath) it is following.  The localizer
//! keeps both kinds current every tick and maintains, per node, the set of
//! agents standing in it.  [`NavMeshSpatialQuery`] reads those sets to find
//! neighbors by walking outward through portals instead of scanning every
//! agent.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                 |
//! |---------------|----------------------------------------------------------|
//! | [`localizer`] | `NavMeshLocalizer`, `NavMeshLocation`                    |
//! | [`query`]     | `NavMeshSpatialQuery` (agent and obstacle queries)       |
//! | [`error`]     | `LocalizerError`, `LocalizerResult<T>`                   |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                  |
//! |------------|---------------------------------------------------------|
//! | `parallel` | `update_all` runs on Rayon's thread pool.               |
//! | `fx-hash`  | FxHash for the query's visited-node set.                |

pub mod error;
pub mod localizer;
pub mod query;

#[cfg(test)]
mod tests;

pub use error::{LocalizerError, LocalizerResult};
pub use localizer::{NavMeshLocalizer, NavMeshLocation, Occupants};
pub use query::NavMeshSpatialQuery;
