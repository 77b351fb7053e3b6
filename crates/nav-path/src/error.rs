//! Path-following error type.

use thiserror::Error;

use nav_planner::PlannerError;

/// Errors produced by `nav-path`.
#[derive(Debug, Error)]
pub enum PathError {
    #[error("replanning failed: {0}")]
    Planner(#[from] PlannerError),
}

pub type PathResult<T> = Result<T, PathError>;
