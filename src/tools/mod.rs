//! Tool execution system
//!
//! Provides filesystem tools for a chat agent:
//! - 8 tools (read, write, edit, list, rename, move, copy, mkdir)
//! - Pluggable filesystem backend (local disk or in-memory)
//! - Parallel executor (semaphore-bounded)
//! - Tool runtime coordinator

pub mod types;
pub mod tool;
pub mod fs;
pub mod registry;
pub mod executor;
pub mod runtime;
pub mod implementations;

// Re-export commonly used types
pub use types::{FailureKind, ToolFailure, ToolOutcome, ToolResult, ToolSchema, ToolStats};
pub use tool::Tool;
pub use fs::{FileSystem, LocalFs, MemoryFs};
pub use registry::ToolRegistry;
pub use executor::{parse_calls, ParallelExecutor, ToolCall};
pub use runtime::ToolRuntime;
