//! Error types for agent execution

use thiserror::Error;

/// Result type for agent execution
pub type Result<T> = std::result::Result<T, ExecutorError>;

/// Errors that can end an agent loop
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// The LLM provider failed
    #[error("provider error: {0}")]
    Provider(#[from] analyst_llm::LlmError),

    /// The model requested a tool that is not in the catalog
    #[error("tool not found: {0}")]
    ToolNotFound(String),
}
