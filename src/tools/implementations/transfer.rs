//! Two-path tool implementations
//!
//! - rename_file: Rename in place, never overwriting a sibling
//! - move_file: Move a file or subtree, into a directory if one is named
//! - copy_file: Copy a file or subtree with the same destination rules

use crate::tools::fs::{is_within, EntryKind, FileSystem};
use crate::tools::tool::{parse_args, Tool};
use crate::tools::types::{FailureKind, ToolFailure, ToolOutcome};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::io;
use std::path::Path;
use std::sync::Arc;

const PERMISSION_DENIED: &str = "Error: Permission denied";

/// Rename a file or directory within its parent directory
#[derive(Debug, Clone)]
pub struct RenameFileTool {
    fs: Arc<dyn FileSystem>,
}

#[derive(Debug, Deserialize)]
struct RenameFileArgs {
    old_path: String,
    new_name: String,
}

impl RenameFileTool {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    async fn rename(&self, old_path: &str, new_name: &str) -> Result<String, ToolFailure> {
        let fail = |e: io::Error| ToolFailure::from_io(&e, PERMISSION_DENIED, "Error renaming");
        let old_file = self.fs.expand(old_path);

        if self.fs.probe(&old_file).await.map_err(&fail)?.is_none() {
            return Err(ToolFailure::not_found(format!(
                "Error: File or directory not found: {}",
                old_path
            )));
        }

        if new_name.contains('/') || new_name.contains('\\') {
            return Err(ToolFailure::invalid_arguments(
                "Error: new_name should be just a name, not a path",
            ));
        }
        if matches!(new_name, "" | "." | "..") {
            return Err(ToolFailure::invalid_arguments(format!(
                "Error: new_name must be a file or directory name, got '{}'",
                new_name
            )));
        }

        let Some(parent) = old_file.parent() else {
            return Err(ToolFailure::new(
                FailureKind::Other,
                format!("Error renaming: {} has no parent directory", old_path),
            ));
        };
        let new_file = parent.join(new_name);

        if self.fs.probe(&new_file).await.map_err(&fail)?.is_some() {
            return Err(ToolFailure::conflict(format!(
                "Error: Target already exists: {}",
                new_file.display()
            )));
        }

        self.fs.rename(&old_file, &new_file).await.map_err(&fail)?;
        Ok(format!("Successfully renamed {} to {}", old_path, new_name))
    }
}

#[async_trait]
impl Tool for RenameFileTool {
    fn name(&self) -> &'static str {
        "rename_file"
    }

    fn description(&self) -> &'static str {
        "Rename a file or directory to a new name in the same location."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "old_path": {
                    "type": "string",
                    "description": "The current path of the file or directory"
                },
                "new_name": {
                    "type": "string",
                    "description": "The new name (not full path, just the name)"
                }
            },
            "required": ["old_path", "new_name"]
        })
    }

    async fn execute(&self, args: &Value) -> ToolOutcome {
        let args: RenameFileArgs = match parse_args(self.name(), args) {
            Ok(args) => args,
            Err(failure) => return ToolOutcome::Failure(failure),
        };
        self.rename(&args.old_path, &args.new_name).await.into()
    }
}

#[derive(Debug, Deserialize)]
struct TransferArgs {
    source: String,
    destination: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transfer {
    Move,
    Copy,
}

impl Transfer {
    fn error_context(self) -> &'static str {
        match self {
            Transfer::Move => "Error moving",
            Transfer::Copy => "Error copying",
        }
    }

    fn verb(self) -> &'static str {
        match self {
            Transfer::Move => "move",
            Transfer::Copy => "copy",
        }
    }

    fn past_tense(self) -> &'static str {
        match self {
            Transfer::Move => "moved",
            Transfer::Copy => "copied",
        }
    }
}

/// Shared move/copy flow.
///
/// An existing directory as `destination` receives the source under its own
/// base name. Parents of the final destination are created; an existing
/// final destination is a conflict, never overwritten or merged.
async fn transfer(
    fs: &dyn FileSystem,
    mode: Transfer,
    source: &str,
    destination: &str,
) -> Result<String, ToolFailure> {
    let fail = |e: io::Error| ToolFailure::from_io(&e, PERMISSION_DENIED, mode.error_context());
    let src_path = fs.expand(source);

    let Some(src_kind) = fs.probe(&src_path).await.map_err(&fail)? else {
        return Err(ToolFailure::not_found(format!(
            "Error: Source not found: {}",
            source
        )));
    };

    let mut dest_path = fs.expand(destination);
    if fs.probe(&dest_path).await.map_err(&fail)? == Some(EntryKind::Dir) {
        let Some(base_name) = src_path.file_name() else {
            return Err(ToolFailure::invalid_arguments(format!(
                "Error: Source has no file name: {}",
                source
            )));
        };
        dest_path = dest_path.join(base_name);
    }

    if src_kind == EntryKind::Dir
        && is_within(&fs.absolute(&dest_path).await, &fs.absolute(&src_path).await)
    {
        return Err(ToolFailure::new(
            FailureKind::Other,
            format!(
                "{}: Cannot {} a directory into itself",
                mode.error_context(),
                mode.verb()
            ),
        ));
    }

    if let Some(parent) = dest_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs.create_dir_all(parent).await.map_err(&fail)?;
    }

    if fs.probe(&dest_path).await.map_err(&fail)?.is_some() {
        return Err(ToolFailure::conflict(format!(
            "Error: Destination already exists: {}",
            destination
        )));
    }

    perform(fs, mode, src_kind, &src_path, &dest_path)
        .await
        .map_err(&fail)?;

    Ok(format!(
        "Successfully {} {} to {}",
        mode.past_tense(),
        source,
        destination
    ))
}

async fn perform(
    fs: &dyn FileSystem,
    mode: Transfer,
    kind: EntryKind,
    from: &Path,
    to: &Path,
) -> io::Result<()> {
    match (mode, kind) {
        (Transfer::Move, _) => fs.move_path(from, to).await,
        (Transfer::Copy, EntryKind::Dir) => fs.copy_tree(from, to).await,
        (Transfer::Copy, _) => fs.copy_file(from, to).await,
    }
}

fn transfer_parameters(verb: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "source": {
                "type": "string",
                "description": format!("The source path to {}", verb)
            },
            "destination": {
                "type": "string",
                "description": "The destination path"
            }
        },
        "required": ["source", "destination"]
    })
}

/// Move a file or directory to a new location
#[derive(Debug, Clone)]
pub struct MoveFileTool {
    fs: Arc<dyn FileSystem>,
}

impl MoveFileTool {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }
}

#[async_trait]
impl Tool for MoveFileTool {
    fn name(&self) -> &'static str {
        "move_file"
    }

    fn description(&self) -> &'static str {
        "Move a file or directory to a new location. Creates parent directories if needed."
    }

    fn parameters(&self) -> Value {
        transfer_parameters("move")
    }

    async fn execute(&self, args: &Value) -> ToolOutcome {
        let args: TransferArgs = match parse_args(self.name(), args) {
            Ok(args) => args,
            Err(failure) => return ToolOutcome::Failure(failure),
        };
        transfer(self.fs.as_ref(), Transfer::Move, &args.source, &args.destination)
            .await
            .into()
    }
}

/// Copy a file or directory to a new location
#[derive(Debug, Clone)]
pub struct CopyFileTool {
    fs: Arc<dyn FileSystem>,
}

impl CopyFileTool {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }
}

#[async_trait]
impl Tool for CopyFileTool {
    fn name(&self) -> &'static str {
        "copy_file"
    }

    fn description(&self) -> &'static str {
        "Copy a file or directory to a new location. Creates parent directories if needed."
    }

    fn parameters(&self) -> Value {
        transfer_parameters("copy")
    }

    async fn execute(&self, args: &Value) -> ToolOutcome {
        let args: TransferArgs = match parse_args(self.name(), args) {
            Ok(args) => args,
            Err(failure) => return ToolOutcome::Failure(failure),
        };
        transfer(self.fs.as_ref(), Transfer::Copy, &args.source, &args.destination)
            .await
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::fs::{LocalFs, MemoryFs};
    use tempfile::TempDir;

    fn memory() -> (Arc<MemoryFs>, Arc<dyn FileSystem>) {
        let mem = Arc::new(MemoryFs::new());
        let fs: Arc<dyn FileSystem> = mem.clone();
        (mem, fs)
    }

    #[tokio::test]
    async fn test_rename_success() {
        let (mem, fs) = memory();
        mem.add_file("/docs/a.txt", "a");

        let outcome = RenameFileTool::new(fs)
            .execute(&json!({"old_path": "/docs/a.txt", "new_name": "b.txt"}))
            .await;
        assert_eq!(outcome.render(), "Successfully renamed /docs/a.txt to b.txt");
        assert!(!mem.contains("/docs/a.txt"));
        assert_eq!(mem.file_text("/docs/b.txt").as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_rename_target_exists() {
        let (mem, fs) = memory();
        mem.add_file("/docs/a.txt", "a");
        mem.add_file("/docs/b.txt", "b");

        let outcome = RenameFileTool::new(fs)
            .execute(&json!({"old_path": "/docs/a.txt", "new_name": "b.txt"}))
            .await;
        assert_eq!(outcome.failure_kind(), Some(FailureKind::Conflict));
        assert_eq!(outcome.render(), "Error: Target already exists: /docs/b.txt");
        assert_eq!(mem.file_text("/docs/a.txt").as_deref(), Some("a"));
        assert_eq!(mem.file_text("/docs/b.txt").as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_rename_rejects_paths() {
        let (mem, fs) = memory();
        mem.add_file("/docs/a.txt", "a");
        let tool = RenameFileTool::new(fs);

        for bad in ["sub/b.txt", "..\\b.txt"] {
            let outcome = tool
                .execute(&json!({"old_path": "/docs/a.txt", "new_name": bad}))
                .await;
            assert_eq!(outcome.failure_kind(), Some(FailureKind::InvalidArguments));
            assert_eq!(
                outcome.render(),
                "Error: new_name should be just a name, not a path"
            );
        }

        for bad in ["", ".", ".."] {
            let outcome = tool
                .execute(&json!({"old_path": "/docs/a.txt", "new_name": bad}))
                .await;
            assert_eq!(outcome.failure_kind(), Some(FailureKind::InvalidArguments));
        }
        assert!(mem.contains("/docs/a.txt"));
    }

    #[tokio::test]
    async fn test_rename_missing_source() {
        let (_mem, fs) = memory();

        let outcome = RenameFileTool::new(fs)
            .execute(&json!({"old_path": "/ghost", "new_name": "x"}))
            .await;
        assert_eq!(outcome.render(), "Error: File or directory not found: /ghost");
    }

    #[tokio::test]
    async fn test_rename_permission_denied() {
        let (mem, fs) = memory();
        mem.add_file("/locked/a.txt", "a");
        mem.deny("/locked");

        let outcome = RenameFileTool::new(fs)
            .execute(&json!({"old_path": "/locked/a.txt", "new_name": "b.txt"}))
            .await;
        assert_eq!(outcome.failure_kind(), Some(FailureKind::PermissionDenied));
        assert_eq!(outcome.render(), "Error: Permission denied");
    }

    #[tokio::test]
    async fn test_move_into_existing_directory() {
        let (mem, fs) = memory();
        mem.add_file("/src/report.md", "r");
        mem.add_dir("/archive");

        let outcome = MoveFileTool::new(fs)
            .execute(&json!({"source": "/src/report.md", "destination": "/archive"}))
            .await;
        assert_eq!(
            outcome.render(),
            "Successfully moved /src/report.md to /archive"
        );
        assert!(!mem.contains("/src/report.md"));
        assert_eq!(mem.file_text("/archive/report.md").as_deref(), Some("r"));
    }

    #[tokio::test]
    async fn test_move_creates_parents() {
        let (mem, fs) = memory();
        mem.add_file("/a.txt", "a");

        let outcome = MoveFileTool::new(fs)
            .execute(&json!({"source": "/a.txt", "destination": "/x/y/z.txt"}))
            .await;
        assert!(outcome.is_success());
        assert_eq!(mem.file_text("/x/y/z.txt").as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_move_destination_exists() {
        let (mem, fs) = memory();
        mem.add_file("/a.txt", "a");
        mem.add_file("/b.txt", "b");

        let outcome = MoveFileTool::new(fs)
            .execute(&json!({"source": "/a.txt", "destination": "/b.txt"}))
            .await;
        assert_eq!(outcome.failure_kind(), Some(FailureKind::Conflict));
        assert_eq!(outcome.render(), "Error: Destination already exists: /b.txt");
        assert_eq!(mem.file_text("/a.txt").as_deref(), Some("a"));
        assert_eq!(mem.file_text("/b.txt").as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_move_into_directory_with_same_name_taken() {
        let (mem, fs) = memory();
        mem.add_file("/a.txt", "new");
        mem.add_file("/dir/a.txt", "old");

        let outcome = MoveFileTool::new(fs)
            .execute(&json!({"source": "/a.txt", "destination": "/dir"}))
            .await;
        assert_eq!(outcome.failure_kind(), Some(FailureKind::Conflict));
        assert_eq!(mem.file_text("/dir/a.txt").as_deref(), Some("old"));
    }

    #[tokio::test]
    async fn test_move_missing_source() {
        let (_mem, fs) = memory();

        let outcome = MoveFileTool::new(fs)
            .execute(&json!({"source": "/ghost", "destination": "/x"}))
            .await;
        assert_eq!(outcome.failure_kind(), Some(FailureKind::NotFound));
        assert_eq!(outcome.render(), "Error: Source not found: /ghost");
    }

    #[tokio::test]
    async fn test_move_directory_into_itself() {
        let (mem, fs) = memory();
        mem.add_file("/proj/a.txt", "a");

        let outcome = MoveFileTool::new(fs)
            .execute(&json!({"source": "/proj", "destination": "/proj/sub"}))
            .await;
        assert_eq!(
            outcome.render(),
            "Error moving: Cannot move a directory into itself"
        );
        assert!(!mem.contains("/proj/sub"));
    }

    #[tokio::test]
    async fn test_copy_directory_recursive() {
        let (mem, fs) = memory();
        mem.add_file("/tree/a.txt", "a");
        mem.add_file("/tree/nested/b.txt", "b");
        mem.add_file("/tree/nested/deeper/c.txt", "c");

        let outcome = CopyFileTool::new(fs)
            .execute(&json!({"source": "/tree", "destination": "/backup/tree"}))
            .await;
        assert_eq!(outcome.render(), "Successfully copied /tree to /backup/tree");

        for (rel, expected) in [
            ("a.txt", "a"),
            ("nested/b.txt", "b"),
            ("nested/deeper/c.txt", "c"),
        ] {
            assert_eq!(mem.file_text(format!("/tree/{}", rel)).as_deref(), Some(expected));
            assert_eq!(
                mem.file_text(format!("/backup/tree/{}", rel)).as_deref(),
                Some(expected)
            );
        }
    }

    #[tokio::test]
    async fn test_copy_into_itself_rejected() {
        let (mem, fs) = memory();
        mem.add_file("/tree/a.txt", "a");

        let outcome = CopyFileTool::new(fs)
            .execute(&json!({"source": "/tree", "destination": "/tree"}))
            .await;
        // "/tree" is a directory, so the target resolves to /tree/tree
        assert_eq!(
            outcome.render(),
            "Error copying: Cannot copy a directory into itself"
        );
        assert!(!mem.contains("/tree/tree"));
    }

    #[tokio::test]
    async fn test_copy_destination_exists() {
        let (mem, fs) = memory();
        mem.add_file("/a.txt", "a");
        mem.add_file("/b.txt", "b");

        let outcome = CopyFileTool::new(fs)
            .execute(&json!({"source": "/a.txt", "destination": "/b.txt"}))
            .await;
        assert_eq!(outcome.failure_kind(), Some(FailureKind::Conflict));
        assert_eq!(mem.file_text("/b.txt").as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_copy_permission_denied() {
        let (mem, fs) = memory();
        mem.add_file("/vault/a.txt", "a");
        mem.deny("/vault");

        let outcome = CopyFileTool::new(fs)
            .execute(&json!({"source": "/vault/a.txt", "destination": "/out.txt"}))
            .await;
        assert_eq!(outcome.failure_kind(), Some(FailureKind::PermissionDenied));
        assert_eq!(outcome.render(), "Error: Permission denied");
    }

    #[tokio::test]
    async fn test_copy_and_move_on_disk() {
        let temp = TempDir::new().unwrap();
        let fs: Arc<dyn FileSystem> = Arc::new(LocalFs::with_home(temp.path()));
        std::fs::create_dir_all(temp.path().join("src/inner")).unwrap();
        std::fs::write(temp.path().join("src/inner/f.txt"), "payload").unwrap();
        std::fs::create_dir(temp.path().join("dest")).unwrap();

        let copied = CopyFileTool::new(fs.clone())
            .execute(&json!({"source": "~/src", "destination": "~/copy"}))
            .await;
        assert!(copied.is_success(), "{}", copied);
        assert_eq!(
            std::fs::read_to_string(temp.path().join("copy/inner/f.txt")).unwrap(),
            "payload"
        );

        let moved = MoveFileTool::new(fs)
            .execute(&json!({"source": "~/src", "destination": "~/dest"}))
            .await;
        assert!(moved.is_success(), "{}", moved);
        assert!(!temp.path().join("src").exists());
        assert_eq!(
            std::fs::read_to_string(temp.path().join("dest/src/inner/f.txt")).unwrap(),
            "payload"
        );
    }

    #[tokio::test]
    async fn test_copy_into_itself_through_parent_component() {
        let temp = TempDir::new().unwrap();
        let fs: Arc<dyn FileSystem> = Arc::new(LocalFs::with_home(temp.path()));
        std::fs::create_dir_all(temp.path().join("proj/inner")).unwrap();
        std::fs::write(temp.path().join("proj/a.txt"), "a").unwrap();
        std::fs::create_dir(temp.path().join("other")).unwrap();

        let outcome = CopyFileTool::new(fs)
            .execute(&json!({"source": "~/proj", "destination": "~/other/../proj/sub"}))
            .await;
        assert_eq!(
            outcome.render(),
            "Error copying: Cannot copy a directory into itself"
        );
        assert!(!temp.path().join("proj/sub").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_copy_into_itself_through_symlink() {
        let temp = TempDir::new().unwrap();
        let fs: Arc<dyn FileSystem> = Arc::new(LocalFs::with_home(temp.path()));
        std::fs::create_dir(temp.path().join("proj")).unwrap();
        std::fs::write(temp.path().join("proj/a.txt"), "a").unwrap();
        std::os::unix::fs::symlink(temp.path().join("proj"), temp.path().join("link")).unwrap();

        let outcome = CopyFileTool::new(fs.clone())
            .execute(&json!({"source": "~/proj", "destination": "~/link/sub"}))
            .await;
        assert_eq!(
            outcome.render(),
            "Error copying: Cannot copy a directory into itself"
        );
        assert!(!temp.path().join("proj/sub").exists());

        let moved = MoveFileTool::new(fs)
            .execute(&json!({"source": "~/proj", "destination": "~/link/sub"}))
            .await;
        assert_eq!(moved.render(), "Error moving: Cannot move a directory into itself");
        assert!(temp.path().join("proj/a.txt").exists());
    }
}
