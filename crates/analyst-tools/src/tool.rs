//! Tool trait definition

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors a tool invocation can surface to the agent loop
///
/// These become `is_error` tool results in the conversation; they never
/// abort the loop.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The supplied parameters did not match the tool's input schema
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// The tool ran but could not produce a result
    #[error("Tool execution failed: {0}")]
    Failed(String),
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        ToolError::InvalidParams(err.to_string())
    }
}

/// Outcome of a single tool invocation
///
/// `raw_text` is what the model sees as the tool result. `artifact_path`
/// is set when the invocation persisted a file as a side effect; its
/// lifetime is the single request.
#[derive(Debug, Clone)]
pub struct ToolInvocationResult {
    /// Text handed back to the model
    pub raw_text: String,

    /// Path of a file the invocation wrote, if any
    pub artifact_path: Option<String>,
}

impl ToolInvocationResult {
    /// A text-only result
    pub fn text(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            artifact_path: None,
        }
    }

    /// A result that also persisted a file
    pub fn with_artifact(raw_text: impl Into<String>, artifact_path: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            artifact_path: Some(artifact_path.into()),
        }
    }
}

/// Trait for tools the agent can invoke
///
/// Each tool provides a unique name, a description the model uses to
/// decide when to call it, and a JSON schema for its input.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Invoke the tool with the given parameters
    ///
    /// `params` is the JSON value the model produced against
    /// `input_schema`.
    async fn invoke(&self, params: Value) -> Result<ToolInvocationResult, ToolError>;

    /// Get the tool's name
    fn name(&self) -> &str;

    /// Get the tool's description
    fn description(&self) -> &str;

    /// Get the tool's input schema (JSON Schema format)
    fn input_schema(&self) -> Value;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_result_constructors() {
        let plain = ToolInvocationResult::text("done");
        assert_eq!(plain.raw_text, "done");
        assert!(plain.artifact_path.is_none());

        let saved = ToolInvocationResult::with_artifact("saved", "AAPL_daily_data.csv");
        assert_eq!(saved.artifact_path.as_deref(), Some("AAPL_daily_data.csv"));
    }

    #[test]
    fn test_invalid_params_from_serde() {
        let err = serde_json::from_str::<u32>("not json").unwrap_err();
        let tool_err: ToolError = err.into();
        assert!(matches!(tool_err, ToolError::InvalidParams(_)));
    }
}
