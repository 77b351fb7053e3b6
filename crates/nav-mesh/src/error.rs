//! Mesh-subsystem error type.

use thiserror::Error;

use nav_core::{EdgeId, NodeId, ObstacleId};

/// Errors produced while loading or building a navigation mesh.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("edge {edge} is too narrow (width = {width})")]
    DegenerateEdge { edge: EdgeId, width: f32 },

    #[error("obstacle {obstacle} is too short (length = {length})")]
    DegenerateObstacle { obstacle: ObstacleId, length: f32 },

    #[error("node {node} has a polygon with {vertices} vertices (need at least 3)")]
    BadPolygon { node: NodeId, vertices: usize },

    #[error("node {node} lists edge {edge}, which does not border it")]
    EdgeNotIncident { node: NodeId, edge: EdgeId },

    #[error("node {node} lists obstacle {obstacle}, which borders node {owner}")]
    ObstacleNotIncident { node: NodeId, obstacle: ObstacleId, owner: NodeId },

    #[error("{what} index {index} out of range (len = {len})")]
    IndexOutOfRange { what: &'static str, index: usize, len: usize },

    #[error("duplicate node group name {0:?}")]
    DuplicateGroup(String),
}

pub type MeshResult<T> = Result<T, MeshError>;
