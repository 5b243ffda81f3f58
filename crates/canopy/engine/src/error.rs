//! Engine error types
//!
//! Planning errors are fatal for the plan request only. Execution errors
//! are fatal for the failing task's remaining steps and non-fatal for the
//! run: the executor records them in the result log and moves on.

/// Errors raised while planning a task
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("unknown task '{0}'")]
    UnknownTask(String),
}

/// Errors raised while executing a step against the registry
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("agent '{0}' is not registered")]
    AgentUnavailable(String),

    #[error("agent '{agent}' does not support capability '{capability}'")]
    CapabilityUnsupported { agent: String, capability: String },

    #[error("capability '{capability}' of agent '{agent}' failed: {message}")]
    CapabilityFailed {
        agent: String,
        capability: String,
        message: String,
    },
}
