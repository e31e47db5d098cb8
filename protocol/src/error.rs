use thiserror::Error;

/// Errors returned by swarm orchestrator calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SwarmError {
    #[error("agent not found: {0}")]
    AgentNotFound(String),

    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("invalid agent name: {0:?}")]
    InvalidName(String),

    #[error("agent {0} is busy")]
    AgentBusy(String),

    #[error("agent {0} is not running")]
    AgentNotRunning(String),

    #[error("{0}")]
    Backend(String),
}
