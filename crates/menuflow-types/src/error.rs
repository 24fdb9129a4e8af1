use thiserror::Error;

/// A referenced step ID does not exist in the flow.
///
/// Fatal when found during flow validation; recovered to a reset prompt when
/// found during a live transition (it indicates stale or foreign session
/// state, not a bad flow).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown step: '{0}'")]
pub struct UnknownStepError(pub String);

/// A single structural defect found while validating a flow graph.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("flow name '{0}' is invalid (non-empty alphanumeric and hyphens only)")]
    InvalidName(String),

    #[error("flow has no steps")]
    Empty,

    #[error("duplicate step ID: '{0}'")]
    DuplicateStepId(String),

    #[error("start step '{0}' does not exist")]
    UnknownStartStep(String),

    #[error("step '{step}' transitions to unknown step '{target}'")]
    UnknownTransitionTarget { step: String, target: String },

    #[error("step '{step}' maps branch '{option}' which is not a declared option")]
    BranchWithoutOption { step: String, option: String },

    #[error("step '{step}' declares duplicate option ID '{option}'")]
    DuplicateOptionId { step: String, option: String },

    #[error("flow has no end step")]
    MissingEndStep,
}

/// Errors loading a flow definition.
#[derive(Debug, Error)]
pub enum FlowError {
    /// YAML parse failure.
    #[error("parse error: {0}")]
    Parse(String),

    /// The graph failed validation. All defects are collected, not just the
    /// first one found.
    #[error("flow validation failed with {} error(s)", .0.len())]
    Invalid(Vec<GraphError>),

    /// Filesystem I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the session-log repository (implemented in menuflow-infra).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),
}

/// Errors from an outbound delivery adapter.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("delivery failed: {0}")]
    Failed(String),

    #[error("delivery channel closed")]
    Closed,
}
