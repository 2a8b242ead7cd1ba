//! In-memory tool registry backing the MCP handler.

use rmcp::model::Tool;
use std::collections::HashMap;
use swagger_mcp_openapi_tools::runtime::{ToolHandler, ToolRegistry};
use tracing::warn;

/// Registered tools in registration order. Re-registering a name replaces the earlier tool in
/// place.
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    entries: Vec<(Tool, ToolHandler)>,
    index: HashMap<String, usize>,
}

impl ToolCatalog {
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn tools(&self) -> Vec<Tool> {
        self.entries.iter().map(|(tool, _)| tool.clone()).collect()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ToolHandler> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }
}

impl ToolRegistry for ToolCatalog {
    fn register_tool(&mut self, tool: Tool, handler: ToolHandler) {
        let name = tool.name.to_string();
        if let Some(&i) = self.index.get(&name) {
            warn!(
                tool = %name,
                replaced = %self.entries[i].1.descriptor().url,
                by = %handler.descriptor().url,
                "tool name collision; keeping the later registration"
            );
            self.entries[i] = (tool, handler);
            return;
        }
        self.index.insert(name, self.entries.len());
        self.entries.push((tool, handler));
    }
}
