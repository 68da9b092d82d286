//! Tool contract for the stock analyst pipeline
//!
//! A tool is a named, parameterized operation the LLM-driven agent may
//! invoke during a single request. Tools are assembled into fixed
//! [`ToolRegistry`] catalogs at startup; the dispatcher selects a catalog
//! per handling path, and nothing registers tools at runtime.

mod registry;
mod tool;

pub use registry::ToolRegistry;
pub use tool::{Tool, ToolError, ToolInvocationResult};
