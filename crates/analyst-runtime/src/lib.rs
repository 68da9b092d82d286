//! Agent loop for the stock analyst pipeline
//!
//! The [`ToolExecutor`] implements the core agent loop:
//! 1. Call the LLM with the conversation and available tools
//! 2. Check the stop reason
//! 3. If tool use was requested, invoke the tools and loop back
//! 4. On natural completion, return the final text

mod error;
mod executor;

pub use error::{ExecutorError, Result};
pub use executor::{ExecutorConfig, ToolExecutor};
