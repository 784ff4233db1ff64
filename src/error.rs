use thiserror::Error;

pub type Result<T> = std::result::Result<T, CasError>;

/// Failures of the algebra layer. The checker recovers from all of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CasError {
    #[error("parse error: {0}")]
    Parse(String),
    #[error("unsupported operation: {0}")]
    Unsupported(String),
    #[error("{what} exceeded limit of {limit}")]
    LimitExceeded { what: &'static str, limit: usize },
}

/// Failures that abort a whole chain and are surfaced to the caller.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("chain has no steps")]
    EmptyChain,
    #[error("malformed chain input: {0}")]
    Json(#[from] serde_json::Error),
    #[error("verification cancelled after {completed} steps")]
    Cancelled { completed: usize },
}
