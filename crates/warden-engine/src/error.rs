//! Engine error taxonomy.
//!
//! Three failure classes leave the engine; everything else (malformed
//! paths, invalid policies) is contained to a single policy and recorded in
//! the decision trace instead. None of these variants ever resolves to an
//! allow: the caller sees the failure and decides the user-visible outcome.

use thiserror::Error;
use warden_types::StoreError;

/// Failure of a whole authorization check.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The request is missing a required field; rejected before any
    /// evaluation, so no trace is produced.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A collaborator store failed or timed out. Never converted into a
    /// decision: authorization fails closed by surfacing the error.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The caller cancelled the check via its [`warden_types::CancelToken`].
    #[error("authorization check cancelled by caller")]
    Cancelled,
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_converts_transparently() {
        let err: EngineError = StoreError::Unavailable("policy db down".to_string()).into();
        assert_eq!(err.to_string(), "store unavailable: policy db down");
    }

    #[test]
    fn test_invalid_request_message() {
        let err = EngineError::InvalidRequest("action must not be empty".to_string());
        assert_eq!(err.to_string(), "invalid request: action must not be empty");
    }
}
