use thiserror::Error;

use nav_core::{AgentId, NavError};
use nav_localizer::LocalizerError;
use nav_path::PathError;
use nav_planner::PlannerError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(#[from] NavError),

    #[error("{what} length {got} does not match agent count {expected}")]
    AgentCountMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },

    #[error("goal of agent {0} is not on the navigation mesh")]
    GoalOffMesh(AgentId),

    #[error("localizer error: {0}")]
    Localizer(#[from] LocalizerError),

    #[error("path error: {0}")]
    Path(#[from] PathError),

    #[error("no route for agent {agent}: {source}")]
    NoRoute {
        agent:  AgentId,
        #[source]
        source: PlannerError,
    },
}

pub type SimResult<T> = Result<T, SimError>;
