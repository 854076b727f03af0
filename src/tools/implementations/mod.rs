//! Tool implementations module

pub mod filesystem;
pub mod transfer;

// Re-export for convenience
pub use filesystem::{CreateDirTool, EditFileTool, ListDirTool, ReadFileTool, WriteFileTool};
pub use transfer::{CopyFileTool, MoveFileTool, RenameFileTool};
