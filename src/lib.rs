//! FileBuddy - Filesystem tools for chat agents
//!
//! Eight filesystem operations exposed through one tool-calling interface:
//! every call takes a JSON argument object and always answers with text
//! the agent can read, whether it succeeded or not.
//!
//! # Architecture
//!
//! - **tools**: tool trait, filesystem backends, registry, executor, runtime
//! - **cli**: argument parsing and TOML configuration
//! - **telemetry**: tracing setup and run summaries

pub mod errors;
pub mod tools;
pub mod cli;
pub mod telemetry;

// Re-export commonly used types
pub use errors::{FileBuddyError, Result};
pub use tools::{ToolOutcome, ToolResult, ToolRuntime};
