//! Fixed tool catalogs

use crate::Tool;
use std::collections::HashMap;
use std::sync::Arc;

/// An immutable catalog of tools
///
/// Built once from a fixed list at startup. The dispatcher maps each
/// handling path to its own registry; there is no runtime registration.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Build a registry from a fixed set of tools
    ///
    /// Later entries with a duplicate name replace earlier ones.
    pub fn from_tools(tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Self {
        Self {
            tools: tools
                .into_iter()
                .map(|t| (t.name().to_string(), t))
                .collect(),
        }
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// List all tools in the catalog
    ///
    /// Used to build the tool definitions sent to the LLM.
    pub fn list_tools(&self) -> Vec<Arc<dyn Tool>> {
        self.tools.values().cloned().collect()
    }

    /// Check whether a tool with this name is in the catalog
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Get the number of tools in the catalog
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
