//! `nav-path`: following a planned route through the mesh.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                   |
//! |------------|------------------------------------------------------------|
//! | [`goal`]   | `Goal` (point, circle, axis-aligned box), `approach_speed` |
//! | [`funnel`] | Funnel smoothing of a portal route into waypoints          |
//! | [`path`]   | `PortalPath` (progress tracking, steering, replanning)     |
//! | [`error`]  | `PathError`, `PathResult<T>`                               |

pub mod error;
pub mod funnel;
pub mod goal;
pub mod path;


pub use error::{PathError, PathResult};
pub use funnel::compute_crossing;
pub use goal::{Goal, approach_speed};
pub use path::PortalPath;
