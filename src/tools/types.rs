//! Tool execution types and structures
//!
//! Core types for tool outcomes, results, schemas and statistics.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::time::Duration;

/// Classification of a failed tool call
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Target path or source missing
    NotFound,
    /// Path exists but is the wrong kind (file vs directory)
    WrongType,
    /// Destination already exists where overwrite is disallowed
    Conflict,
    /// Replacement target matches more than once
    AmbiguousEdit,
    /// OS-level access denial
    PermissionDenied,
    /// Arguments missing, mistyped or semantically invalid
    InvalidArguments,
    /// No tool registered under the requested name
    UnknownTool,
    /// Anything else, flattened to its message
    Other,
}

/// A failed tool call: structured kind plus the agent-facing text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl ToolFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(FailureKind::NotFound, message)
    }

    pub fn wrong_type(message: impl Into<String>) -> Self {
        Self::new(FailureKind::WrongType, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Conflict, message)
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::new(FailureKind::InvalidArguments, message)
    }

    /// Map an I/O error from the middle of an operation.
    ///
    /// Permission errors get the tool's dedicated `denied` text; anything
    /// else renders as `"{context}: {err}"`.
    pub fn from_io(err: &io::Error, denied: &str, context: &str) -> Self {
        if err.kind() == io::ErrorKind::PermissionDenied {
            Self::new(FailureKind::PermissionDenied, denied)
        } else {
            Self::new(FailureKind::Other, format!("{}: {}", context, err))
        }
    }
}

impl fmt::Display for ToolFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Outcome of a single tool call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolOutcome {
    Success { output: String },
    Failure(ToolFailure),
}

impl ToolOutcome {
    /// Create successful outcome
    pub fn success(output: impl Into<String>) -> Self {
        ToolOutcome::Success {
            output: output.into(),
        }
    }

    /// Create failed outcome
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        ToolOutcome::Failure(ToolFailure::new(kind, message))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ToolOutcome::Success { .. })
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            ToolOutcome::Success { .. } => None,
            ToolOutcome::Failure(failure) => Some(failure.kind),
        }
    }

    /// Text shown to the calling agent
    pub fn render(&self) -> &str {
        match self {
            ToolOutcome::Success { output } => output,
            ToolOutcome::Failure(failure) => &failure.message,
        }
    }
}

impl fmt::Display for ToolOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.render())
    }
}

impl From<std::result::Result<String, ToolFailure>> for ToolOutcome {
    fn from(result: std::result::Result<String, ToolFailure>) -> Self {
        match result {
            Ok(output) => ToolOutcome::Success { output },
            Err(failure) => ToolOutcome::Failure(failure),
        }
    }
}

/// Result of tool execution as reported by the executor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Tool name that was executed
    pub tool: String,

    /// What the tool reported
    #[serde(flatten)]
    pub outcome: ToolOutcome,

    /// Execution duration in milliseconds
    pub duration_ms: u64,
}

impl ToolResult {
    pub fn new(tool: impl Into<String>, outcome: ToolOutcome, duration: Duration) -> Self {
        Self {
            tool: tool.into(),
            outcome,
            duration_ms: duration.as_millis() as u64,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }

    pub fn render(&self) -> &str {
        self.outcome.render()
    }
}

/// Tool schema definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Tool name
    pub name: String,

    /// Tool description
    pub description: String,

    /// Parameter schema (JSON Schema)
    pub parameters: serde_json::Value,

    /// Whether tool is read-only
    pub read_only: bool,
}

impl ToolSchema {
    /// Create new tool schema
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
        read_only: bool,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            read_only,
        }
    }

    /// Function-calling definition as consumed by chat-completion APIs
    pub fn to_definition(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters,
            }
        })
    }
}

/// Tool execution statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct ToolStats {
    /// Total executions
    pub total_executions: u64,

    /// Successful executions
    pub successful_executions: u64,

    /// Failed executions
    pub failed_executions: u64,

    /// Total execution time (ms)
    pub total_duration_ms: u64,

    /// Failures broken down by kind
    pub failures_by_kind: BTreeMap<FailureKind, u64>,
}

impl ToolStats {
    /// Record a finished call
    pub fn record(&mut self, result: &ToolResult) {
        self.total_executions += 1;
        self.total_duration_ms += result.duration_ms;
        match result.outcome.failure_kind() {
            None => self.successful_executions += 1,
            Some(kind) => {
                self.failed_executions += 1;
                *self.failures_by_kind.entry(kind).or_insert(0) += 1;
            }
        }
    }

    /// Calculate average duration
    pub fn average_duration_ms(&self) -> f64 {
        if self.total_executions == 0 {
            0.0
        } else {
            self.total_duration_ms as f64 / self.total_executions as f64
        }
    }

    /// Calculate success rate
    pub fn success_rate(&self) -> f64 {
        if self.total_executions == 0 {
            0.0
        } else {
            self.successful_executions as f64 / self.total_executions as f64
        }
    }
}
