//! Tool capability interface
//!
//! A tool is a named, schema-described operation an agent can invoke. It
//! always answers with a [`ToolOutcome`]; failures are values, not errors.

use crate::tools::types::{ToolFailure, ToolOutcome, ToolSchema};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

#[async_trait]
pub trait Tool: Send + Sync {
    /// Stable identifier used for dispatch
    fn name(&self) -> &'static str;

    /// Natural-language summary for the calling agent
    fn description(&self) -> &'static str;

    /// JSON Schema of the accepted arguments
    fn parameters(&self) -> Value;

    /// Whether the tool leaves the filesystem untouched
    fn read_only(&self) -> bool {
        false
    }

    /// Perform the operation described by `args`
    async fn execute(&self, args: &Value) -> ToolOutcome;

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(
            self.name(),
            self.description(),
            self.parameters(),
            self.read_only(),
        )
    }
}

/// Deserialize a tool's arguments, ignoring fields it does not know.
pub fn parse_args<T: DeserializeOwned>(tool: &str, args: &Value) -> Result<T, ToolFailure> {
    T::deserialize(args).map_err(|e| {
        ToolFailure::invalid_arguments(format!(
            "Error: Invalid parameters for tool '{}': {}",
            tool, e
        ))
    })
}
