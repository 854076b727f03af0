//! Tool runtime coordinator
//!
//! Entry point the agent loop talks to: builds the filesystem backend and
//! registry from configuration and routes calls to the parallel executor.

use crate::cli::Config;
use crate::errors::Result;
use crate::tools::executor::{ParallelExecutor, ToolCall};
use crate::tools::fs::{FileSystem, LocalFs};
use crate::tools::registry::ToolRegistry;
use crate::tools::types::{ToolResult, ToolStats};
use std::sync::Arc;

/// Tool runtime coordinator
pub struct ToolRuntime {
    /// Parallel executor
    executor: Arc<ParallelExecutor>,
}

impl ToolRuntime {
    /// Create runtime over the local filesystem as configured
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        let fs = match config.home_dir() {
            Some(home) => LocalFs::with_home(home),
            None => LocalFs::new(),
        };
        tracing::debug!(?fs, max_parallel = config.tools.max_parallel, "tool runtime ready");

        Ok(Self::with_filesystem(Arc::new(fs), config.tools.max_parallel))
    }

    /// Create runtime over an arbitrary filesystem backend
    pub fn with_filesystem(fs: Arc<dyn FileSystem>, max_parallel: usize) -> Self {
        let executor = ParallelExecutor::new(ToolRegistry::filesystem(fs), max_parallel);

        Self {
            executor: Arc::new(executor),
        }
    }

    /// Execute one tool call
    ///
    /// Never fails: unknown tools, bad arguments and filesystem errors all
    /// come back as a failure outcome carrying the agent-facing message.
    pub async fn execute(&self, tool: &str, args: &serde_json::Value) -> ToolResult {
        self.executor.execute(tool, args).await
    }

    /// Execute several calls concurrently, results in call order
    pub async fn execute_batch(&self, calls: &[ToolCall]) -> Vec<ToolResult> {
        self.executor.execute_batch(calls).await
    }

    /// Function-calling catalog for the model
    pub fn definitions(&self) -> Vec<serde_json::Value> {
        self.get_registry().definitions()
    }

    /// Get tool registry
    pub fn get_registry(&self) -> &ToolRegistry {
        self.executor.registry()
    }

    /// Get all tool names
    pub fn tool_names(&self) -> Vec<String> {
        self.get_registry().tool_names()
    }

    /// Check if tool exists
    pub fn has_tool(&self, name: &str) -> bool {
        self.get_registry().contains(name)
    }

    /// Get read-only tools
    pub fn read_only_tools(&self) -> Vec<String> {
        self.get_registry().read_only_tools()
    }

    /// Get tools that modify the filesystem
    pub fn write_tools(&self) -> Vec<String> {
        self.get_registry().write_tools()
    }

    /// Execution statistics so far
    pub fn stats(&self) -> ToolStats {
        self.executor.stats()
    }
}
