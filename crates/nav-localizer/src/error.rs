//! Localizer error type.

use thiserror::Error;

use nav_core::{AgentId, NodeId};
use nav_path::PathError;
use nav_planner::PlannerError;

/// Errors produced by `nav-localizer`.
///
/// An agent standing off the mesh is not an error: its location stays
/// `NodeId::INVALID` and the lookup reports `None`.
#[derive(Debug, Error)]
pub enum LocalizerError {
    #[error("{agent} is not tracked (localizer holds {count} agents)")]
    UnknownAgent { agent: AgentId, count: usize },

    #[error("{node} is not a node of a mesh with {count} nodes")]
    InvalidNode { node: NodeId, count: usize },

    #[error("{got} agents supplied to a localizer tracking {expected}")]
    AgentCountMismatch { expected: usize, got: usize },

    #[error("path update failed: {0}")]
    Path(#[from] PathError),

    #[error("planning failed: {0}")]
    Planner(#[from] PlannerError),
}

pub type LocalizerResult<T> = Result<T, LocalizerError>;
