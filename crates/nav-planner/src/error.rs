//! Planner error type.

use thiserror::Error;

use nav_core::NodeId;

/// Errors produced by `nav-planner`.
#[derive(Debug, Error)]
pub enum PlannerError {
    /// A* exhausted its open set: the mesh is disconnected for this
    /// clearance.
    #[error("no route from {from} to {to} with clearance {clearance}")]
    NoRoute { from: NodeId, to: NodeId, clearance: f32 },

    #[error("{node} is not a node of a mesh with {count} nodes")]
    InvalidNode { node: NodeId, count: usize },
}

pub type PlannerResult<T> = Result<T, PlannerError>;
