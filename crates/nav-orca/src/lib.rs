//! `nav-orca`: Optimal Reciprocal Collision Avoidance.
//!
//! Each tick an agent turns its neighbors and nearby wall segments into
//! half-planes of admissible velocities, then picks the admissible velocity
//! closest to its preferred one.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                  |
//! |------------|-----------------------------------------------------------|
//! | [`lines`]  | `agent_line`, `obstacle_line`                             |
//! | [`lp`]     | `linear_program1/2/3`                                     |
//! | [`solver`] | `OrcaSolver` (per-thread line buffer + driver)            |
//!
//! Obstacle lines are hard constraints.  When the agent lines cannot all be
//! met, `linear_program3` relaxes them uniformly and keeps the obstacle
//! lines intact.

pub mod lines;
pub mod lp;
pub mod solver;


pub use lines::{agent_line, obstacle_line};
pub use lp::{linear_program1, linear_program2, linear_program3};
pub use solver::OrcaSolver;
