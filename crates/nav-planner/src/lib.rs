//! `nav-planner`: node-level routing over a navigation mesh.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`route`]   | `WayPortal`, `PortalRoute`                                  |
//! | [`astar`]   | A* search with per-thread scratch buffers                   |
//! | [`planner`] | `PathPlanner` (route cache keyed by start/end node)         |
//! | [`error`]   | `PlannerError`, `PlannerResult<T>`                          |
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                    |
//! |-----------|-----------------------------------------------------------|
//! | `fx-hash` | FxHash instead of SipHash for the route cache map.        |

pub mod astar;
pub mod error;
pub mod planner;
pub mod route;

#[cfg(test)]
mod tests;

pub use error::{PlannerError, PlannerResult};
pub use planner::PathPlanner;
pub use route::{PortalRoute, WayPortal};
