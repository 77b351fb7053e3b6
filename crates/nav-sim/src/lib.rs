//! `nav-sim`: tick loop orchestrator for the rust_nav crowd framework.
//!
//! # Five-phase tick loop
//!
//! ```text
//! for tick in 0..config.total_ticks:
//!   ① Localize   NavMeshLocalizer::update_all: node per agent, path
//!                progress, replans for agents pushed off their route.
//!   ② Steer      VelocityComponent per agent writes its PrefVelocity;
//!                path followers plan a route on first use.
//!   ③ Sense      NavMeshSpatialQuery fills each agent's Neighborhood
//!                (agents through visible portals, obstacles of its node).
//!   ④ Avoid      OrcaSolver per worker computes every vel_new from the
//!                state published last tick.
//!   ⑤ Integrate  acceleration-limited velocity, position, orientation.
//! ```
//!
//! Phases ①–④ touch one agent's mutable state each and run on Rayon's pool
//! with the `parallel` feature.  ⑤ runs after ④ has finished for everyone.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs phases ①–④ on Rayon's thread pool.                |
//! | `fx-hash`  | FxHash in the route cache and query visited sets.      |
//! | `serde`    | Serde derives on config, agents, and goals.            |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use nav_agent::AgentStoreBuilder;
//! use nav_core::{SimConfig, Vector2};
//! use nav_path::Goal;
//! use nav_sim::{NoopObserver, SimBuilder};
//!
//! let mesh = Arc::new(nav_mesh::load_from_path("floor.nav")?);
//! let (store, neighbors) = AgentStoreBuilder::new(100).positions(spawns).build();
//! let mut sim = SimBuilder::new(config, mesh, store, neighbors)
//!     .goal_for_all(Goal::Circle { center: Vector2::new(20.0, 0.0), radius: 1.0 })
//!     .build()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod context;
pub mod error;
pub mod observer;
pub mod sim;
pub mod velocity;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use context::SimContext;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use sim::Sim;
pub use velocity::VelocityComponent;
