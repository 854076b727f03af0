//! Filesystem tool implementations
//!
//! Implements the single-path operations:
//! - read_file: Read file contents as UTF-8
//! - write_file: Write content, creating parent directories
//! - edit_file: Replace one unique occurrence of a text fragment
//! - list_dir: List immediate children of a directory
//! - create_dir: Create a directory and its parents

use crate::tools::fs::{EntryKind, FileSystem};
use crate::tools::tool::{parse_args, Tool};
use crate::tools::types::{FailureKind, ToolFailure, ToolOutcome};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::io;
use std::sync::Arc;

const DIR_MARKER: &str = "📁 ";
const FILE_MARKER: &str = "📄 ";

fn permission_denied(path: &str) -> String {
    format!("Error: Permission denied: {}", path)
}

/// Read file contents
#[derive(Debug, Clone)]
pub struct ReadFileTool {
    fs: Arc<dyn FileSystem>,
}

#[derive(Debug, Deserialize)]
struct ReadFileArgs {
    path: String,
}

impl ReadFileTool {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    async fn read(&self, path: &str) -> Result<String, ToolFailure> {
        let denied = permission_denied(path);
        let fail = |e: io::Error| ToolFailure::from_io(&e, &denied, "Error reading file");
        let file_path = self.fs.expand(path);

        match self.fs.probe(&file_path).await.map_err(&fail)? {
            None => {
                return Err(ToolFailure::not_found(format!(
                    "Error: File not found: {}",
                    path
                )))
            }
            Some(EntryKind::File) => {}
            Some(_) => {
                return Err(ToolFailure::wrong_type(format!(
                    "Error: Not a file: {}",
                    path
                )))
            }
        }

        self.fs.read_to_string(&file_path).await.map_err(&fail)
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &'static str {
        "read_file"
    }

    fn description(&self) -> &'static str {
        "Read the contents of a file at the given path."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The file path to read"
                }
            },
            "required": ["path"]
        })
    }

    fn read_only(&self) -> bool {
        true
    }

    async fn execute(&self, args: &Value) -> ToolOutcome {
        let args: ReadFileArgs = match parse_args(self.name(), args) {
            Ok(args) => args,
            Err(failure) => return ToolOutcome::Failure(failure),
        };
        self.read(&args.path).await.into()
    }
}

/// Write content to a file
#[derive(Debug, Clone)]
pub struct WriteFileTool {
    fs: Arc<dyn FileSystem>,
}

#[derive(Debug, Deserialize)]
struct WriteFileArgs {
    path: String,
    content: String,
}

impl WriteFileTool {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    async fn write(&self, path: &str, content: &str) -> Result<String, ToolFailure> {
        let denied = permission_denied(path);
        let fail = |e: io::Error| ToolFailure::from_io(&e, &denied, "Error writing file");
        let file_path = self.fs.expand(path);

        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.fs.create_dir_all(parent).await.map_err(&fail)?;
        }
        self.fs
            .write(&file_path, content.as_bytes())
            .await
            .map_err(&fail)?;

        Ok(format!(
            "Successfully wrote {} bytes to {}",
            content.len(),
            path
        ))
    }
}

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &'static str {
        "write_file"
    }

    fn description(&self) -> &'static str {
        "Write content to a file at the given path. Creates parent directories if needed."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The file path to write to"
                },
                "content": {
                    "type": "string",
                    "description": "The content to write"
                }
            },
            "required": ["path", "content"]
        })
    }

    async fn execute(&self, args: &Value) -> ToolOutcome {
        let args: WriteFileArgs = match parse_args(self.name(), args) {
            Ok(args) => args,
            Err(failure) => return ToolOutcome::Failure(failure),
        };
        self.write(&args.path, &args.content).await.into()
    }
}

/// Edit a file by replacing one exact, unique text fragment
#[derive(Debug, Clone)]
pub struct EditFileTool {
    fs: Arc<dyn FileSystem>,
}

#[derive(Debug, Deserialize)]
struct EditFileArgs {
    path: String,
    old_text: String,
    new_text: String,
}

impl EditFileTool {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    async fn edit(&self, args: &EditFileArgs) -> Result<String, ToolFailure> {
        let path = args.path.as_str();
        if args.old_text.is_empty() {
            return Err(ToolFailure::invalid_arguments(
                "Error: old_text must not be empty",
            ));
        }

        let denied = permission_denied(path);
        let fail = |e: io::Error| ToolFailure::from_io(&e, &denied, "Error editing file");
        let file_path = self.fs.expand(path);

        match self.fs.probe(&file_path).await.map_err(&fail)? {
            None => {
                return Err(ToolFailure::not_found(format!(
                    "Error: File not found: {}",
                    path
                )))
            }
            Some(EntryKind::File) => {}
            Some(_) => {
                return Err(ToolFailure::wrong_type(format!(
                    "Error: Not a file: {}",
                    path
                )))
            }
        }

        let content = self.fs.read_to_string(&file_path).await.map_err(&fail)?;

        // Non-overlapping occurrences; ambiguous edits never touch the file
        match content.matches(args.old_text.as_str()).count() {
            0 => Err(ToolFailure::not_found(
                "Error: old_text not found in file. Make sure it matches exactly.",
            )),
            1 => {
                let updated = content.replacen(args.old_text.as_str(), &args.new_text, 1);
                self.fs
                    .write(&file_path, updated.as_bytes())
                    .await
                    .map_err(&fail)?;
                Ok(format!("Successfully edited {}", path))
            }
            count => Err(ToolFailure::new(
                FailureKind::AmbiguousEdit,
                format!(
                    "Warning: old_text appears {} times. Please provide more context to make it unique.",
                    count
                ),
            )),
        }
    }
}

#[async_trait]
impl Tool for EditFileTool {
    fn name(&self) -> &'static str {
        "edit_file"
    }

    fn description(&self) -> &'static str {
        "Edit a file by replacing old_text with new_text. The old_text must exist exactly in the file."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The file path to edit"
                },
                "old_text": {
                    "type": "string",
                    "description": "The exact text to find and replace"
                },
                "new_text": {
                    "type": "string",
                    "description": "The text to replace with"
                }
            },
            "required": ["path", "old_text", "new_text"]
        })
    }

    async fn execute(&self, args: &Value) -> ToolOutcome {
        let args: EditFileArgs = match parse_args(self.name(), args) {
            Ok(args) => args,
            Err(failure) => return ToolOutcome::Failure(failure),
        };
        self.edit(&args).await.into()
    }
}

/// List directory contents
#[derive(Debug, Clone)]
pub struct ListDirTool {
    fs: Arc<dyn FileSystem>,
}

#[derive(Debug, Deserialize)]
struct ListDirArgs {
    path: String,
}

impl ListDirTool {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    async fn list(&self, path: &str) -> Result<String, ToolFailure> {
        let denied = permission_denied(path);
        let fail = |e: io::Error| ToolFailure::from_io(&e, &denied, "Error listing directory");
        let dir_path = self.fs.expand(path);

        match self.fs.probe(&dir_path).await.map_err(&fail)? {
            None => {
                return Err(ToolFailure::not_found(format!(
                    "Error: Directory not found: {}",
                    path
                )))
            }
            Some(EntryKind::Dir) => {}
            Some(_) => {
                return Err(ToolFailure::wrong_type(format!(
                    "Error: Not a directory: {}",
                    path
                )))
            }
        }

        let mut entries = self.fs.read_dir(&dir_path).await.map_err(&fail)?;
        if entries.is_empty() {
            return Ok(format!("Directory {} is empty", path));
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        let lines: Vec<String> = entries
            .iter()
            .map(|entry| {
                let marker = if entry.kind == EntryKind::Dir {
                    DIR_MARKER
                } else {
                    FILE_MARKER
                };
                format!("{}{}", marker, entry.name)
            })
            .collect();

        Ok(lines.join("\n"))
    }
}

#[async_trait]
impl Tool for ListDirTool {
    fn name(&self) -> &'static str {
        "list_dir"
    }

    fn description(&self) -> &'static str {
        "List the contents of a directory."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The directory path to list"
                }
            },
            "required": ["path"]
        })
    }

    fn read_only(&self) -> bool {
        true
    }

    async fn execute(&self, args: &Value) -> ToolOutcome {
        let args: ListDirArgs = match parse_args(self.name(), args) {
            Ok(args) => args,
            Err(failure) => return ToolOutcome::Failure(failure),
        };
        self.list(&args.path).await.into()
    }
}

/// Create a directory
#[derive(Debug, Clone)]
pub struct CreateDirTool {
    fs: Arc<dyn FileSystem>,
}

#[derive(Debug, Deserialize)]
struct CreateDirArgs {
    path: String,
}

impl CreateDirTool {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    async fn create(&self, path: &str) -> Result<String, ToolFailure> {
        let denied = permission_denied(path);
        let fail = |e: io::Error| ToolFailure::from_io(&e, &denied, "Error creating directory");
        let dir_path = self.fs.expand(path);

        match self.fs.probe(&dir_path).await.map_err(&fail)? {
            Some(EntryKind::Dir) => Ok(format!("Directory already exists: {}", path)),
            Some(_) => Err(ToolFailure::conflict(format!(
                "Error: A file with this name already exists: {}",
                path
            ))),
            None => {
                self.fs.create_dir_all(&dir_path).await.map_err(&fail)?;
                Ok(format!("Successfully created directory: {}", path))
            }
        }
    }
}

#[async_trait]
impl Tool for CreateDirTool {
    fn name(&self) -> &'static str {
        "create_dir"
    }

    fn description(&self) -> &'static str {
        "Create a new directory. Creates parent directories if needed."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The directory path to create"
                }
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, args: &Value) -> ToolOutcome {
        let args: CreateDirArgs = match parse_args(self.name(), args) {
            Ok(args) => args,
            Err(failure) => return ToolOutcome::Failure(failure),
        };
        self.create(&args.path).await.into()
    }
}
