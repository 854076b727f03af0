//! Parallel executor for tool calls
//!
//! Dispatches calls by name, bounds how many run at once and keeps
//! execution statistics:
//! - Semaphore-bounded concurrency (throughput cap only)
//! - No ordering or locking between calls touching the same path
//! - Unknown tools answer with a failure outcome, never an error

use crate::errors::{FileBuddyError, Result};
use crate::tools::registry::ToolRegistry;
use crate::tools::types::{FailureKind, ToolOutcome, ToolResult, ToolStats};
use futures_util::future::join_all;
use serde::Deserialize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tokio::sync::Semaphore;

/// Default maximum concurrent operations
pub const MAX_PARALLEL_OPERATIONS: usize = 4;

/// One requested invocation
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCall {
    pub tool: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

impl ToolCall {
    pub fn new(tool: impl Into<String>, args: serde_json::Value) -> Self {
        Self {
            tool: tool.into(),
            args,
        }
    }
}

/// Parse newline-delimited JSON calls; blank lines are skipped
pub fn parse_calls(input: &str) -> Result<Vec<ToolCall>> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|e| {
                FileBuddyError::InvalidCall(format!("line {}: {}", index + 1, e))
            })
        })
        .collect()
}

/// Parallel executor for tool operations
pub struct ParallelExecutor {
    /// Semaphore for concurrency control
    semaphore: Arc<Semaphore>,

    /// Tool registry
    registry: ToolRegistry,

    /// Running statistics
    stats: Mutex<ToolStats>,

    max_parallel: usize,
}

impl ParallelExecutor {
    /// Create new parallel executor
    pub fn new(registry: ToolRegistry, max_parallel: usize) -> Self {
        let max_parallel = max_parallel.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(max_parallel)),
            registry,
            stats: Mutex::new(ToolStats::default()),
            max_parallel,
        }
    }

    /// Execute a single tool call
    pub async fn execute(&self, tool: &str, args: &serde_json::Value) -> ToolResult {
        let start = Instant::now();

        let outcome = match self.registry.get(tool) {
            None => ToolOutcome::failure(
                FailureKind::UnknownTool,
                format!("Error: Tool '{}' not found", tool),
            ),
            Some(implementation) => {
                // The semaphore is never closed, so acquire cannot fail
                let _permit = self.semaphore.acquire().await.ok();
                tracing::debug!(tool, %args, "dispatching tool call");
                implementation.execute(args).await
            }
        };

        let result = ToolResult::new(tool, outcome, start.elapsed());
        self.record(&result);
        result
    }

    /// Execute calls concurrently; results keep the order of `calls`
    pub async fn execute_batch(&self, calls: &[ToolCall]) -> Vec<ToolResult> {
        if calls.len() > 1 {
            tracing::debug!(count = calls.len(), "dispatching batch");
        }
        join_all(calls.iter().map(|call| self.execute(&call.tool, &call.args))).await
    }

    fn record(&self, result: &ToolResult) {
        match result.outcome.failure_kind() {
            None => tracing::info!(
                tool = %result.tool,
                duration_ms = result.duration_ms,
                "tool call succeeded"
            ),
            Some(kind) => tracing::warn!(
                tool = %result.tool,
                duration_ms = result.duration_ms,
                ?kind,
                message = %result.render(),
                "tool call failed"
            ),
        }

        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(result);
    }

    /// Get registry reference
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Snapshot of the statistics so far
    pub fn stats(&self) -> ToolStats {
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Get current parallelism limit
    pub fn max_parallel_operations(&self) -> usize {
        self.max_parallel
    }
}
