//! `nav-core`: foundational types for the `rust_nav` crowd framework.
//!
//! This crate is a dependency of every other `nav-*` crate.  It has no
//! `nav-*` dependencies and a single required external one (`thiserror`),
//! plus optional `serde`.
//!
//! # What lives here
//!
//! | Module           | Contents                                             |
//! |------------------|------------------------------------------------------|
//! | [`ids`]          | `AgentId`, `NodeId`, `EdgeId`, `ObstacleId`, `VertexId` |
//! | [`geom`]         | `Vector2`, `Line`, `det`, `left_of`, segment distance |
//! | [`pref_velocity`]| `PrefVelocity` (direction span + speed + target)     |
//! | [`time`]         | `Tick`, `SimClock`, `SimConfig`                      |
//! | [`error`]        | `NavError`, `NavResult`                              |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geom;
pub mod ids;
pub mod pref_velocity;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{NavError, NavResult};
pub use geom::{EPS, Line, Vector2, det, dist_sq_point_segment, left_of};
pub use ids::{AgentId, EdgeId, NodeId, ObstacleId, VertexId};
pub use pref_velocity::PrefVelocity;
pub use time::{SimClock, SimConfig, Tick};
