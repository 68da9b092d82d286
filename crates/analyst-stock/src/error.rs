//! Error types for the analysis pipeline

use thiserror::Error;

/// Pipeline-specific errors
///
/// Upstream data-provider errors and rate limiting are not listed here:
/// the fetch adapter reports them as [`crate::api::FetchOutcome`] variants,
/// translated once at the adapter boundary. Everything below is caught at
/// the dispatch boundary and rendered into a user-facing string; nothing
/// propagates as an uncaught fault.
#[derive(Debug, Error)]
pub enum AnalystError {
    /// An external call exceeded its deadline
    #[error("request timed out")]
    UpstreamTimeout,

    /// The classification call failed (the caller falls open to "general")
    #[error("classification failed: {0}")]
    ClassificationFailure(String),

    /// An artifact could not be written (reported as a literal string, never raised)
    #[error("{0}")]
    PersistenceFailure(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Network or HTTP error
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    /// Agent loop error
    #[error("agent execution failed: {0}")]
    Executor(#[from] analyst_runtime::ExecutorError),
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, AnalystError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AnalystError::UpstreamTimeout;
        assert_eq!(err.to_string(), "request timed out");

        let err = AnalystError::PersistenceFailure("disk full".to_string());
        assert_eq!(err.to_string(), "disk full");
    }
}
