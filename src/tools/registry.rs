//! Tool registry keyed by tool name
//!
//! Tools:
//! - read_file: Read file contents
//! - write_file: Write content to file
//! - edit_file: Replace a unique text fragment in a file
//! - list_dir: List directory contents
//! - rename_file: Rename within the same directory
//! - move_file: Move a file or directory
//! - copy_file: Copy a file or directory
//! - create_dir: Create a directory

use crate::tools::fs::FileSystem;
use crate::tools::implementations::{
    CopyFileTool, CreateDirTool, EditFileTool, ListDirTool, MoveFileTool, ReadFileTool,
    RenameFileTool, WriteFileTool,
};
use crate::tools::tool::Tool;
use crate::tools::types::ToolSchema;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Tool registry
#[derive(Clone, Default)]
pub struct ToolRegistry {
    /// Map of tool name to implementation
    tools: BTreeMap<&'static str, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create registry with all filesystem tools sharing `fs`
    pub fn filesystem(fs: Arc<dyn FileSystem>) -> Self {
        let mut registry = Self::new();

        registry.register(ReadFileTool::new(fs.clone()));
        registry.register(WriteFileTool::new(fs.clone()));
        registry.register(EditFileTool::new(fs.clone()));
        registry.register(ListDirTool::new(fs.clone()));
        registry.register(RenameFileTool::new(fs.clone()));
        registry.register(MoveFileTool::new(fs.clone()));
        registry.register(CopyFileTool::new(fs.clone()));
        registry.register(CreateDirTool::new(fs));

        registry
    }

    /// Register a tool, replacing any tool of the same name
    pub fn register(&mut self, tool: impl Tool + 'static) {
        self.tools.insert(tool.name(), Arc::new(tool));
    }

    /// Get tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Check if tool exists
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Get all tool names, sorted
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.keys().map(|name| name.to_string()).collect()
    }

    /// Get all tool schemas
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.values().map(|tool| tool.schema()).collect()
    }

    /// Function-calling catalog for a chat-completion request
    pub fn definitions(&self) -> Vec<serde_json::Value> {
        self.schemas()
            .iter()
            .map(ToolSchema::to_definition)
            .collect()
    }

    /// Get read-only tool names
    pub fn read_only_tools(&self) -> Vec<String> {
        self.tools
            .iter()
            .filter(|(_, tool)| tool.read_only())
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Get write tool names
    pub fn write_tools(&self) -> Vec<String> {
        self.tools
            .iter()
            .filter(|(_, tool)| !tool.read_only())
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Get total number of tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tool_names())
            .finish()
    }
}
