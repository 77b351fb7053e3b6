//! `nav-agent`: agent records and neighbor bookkeeping for `rust_nav`.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`agent`]     | `Agent` (per-agent kinematic state), `AgentParams`         |
//! | [`neighbors`] | `Neighborhood`, `NearAgent`, `NearObstacle`, `ProximityFilter` |
//! | [`store`]     | `AgentStore`, `NeighborLists`                              |
//! | [`builder`]   | `AgentStoreBuilder` (fluent construction)                  |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `Agent` and `AgentParams`. |

pub mod agent;
pub mod builder;
pub mod neighbors;
pub mod store;


pub use agent::{Agent, AgentParams};
pub use builder::AgentStoreBuilder;
pub use neighbors::{NearAgent, NearObstacle, Neighborhood, ProximityFilter};
pub use store::{AgentStore, NeighborLists};
