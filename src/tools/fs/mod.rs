//! Filesystem access layer
//!
//! Every tool reaches the disk through the [`FileSystem`] trait so that the
//! real filesystem ([`LocalFs`]) can be swapped for an in-memory tree
//! ([`MemoryFs`]) in tests.

pub mod local;
pub mod memory;

pub use local::LocalFs;
pub use memory::MemoryFs;

use async_trait::async_trait;
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Kind of a filesystem entry (symlinks are followed)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Other,
}

/// One child of a listed directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
}

/// Filesystem operations the tools are built from
#[async_trait]
pub trait FileSystem: Send + Sync + fmt::Debug {
    /// Home directory used for `~` expansion, if known
    fn home_dir(&self) -> Option<&Path>;

    /// Expand a leading `~` against [`FileSystem::home_dir`]
    fn expand(&self, path: &str) -> PathBuf {
        expand_home(path, self.home_dir())
    }

    /// Absolute form of `path` with `.` and `..` removed.
    ///
    /// Backends that have symlinks resolve them too, so two paths naming
    /// the same location compare equal.
    async fn absolute(&self, path: &Path) -> PathBuf {
        normalize_lexically(&std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()))
    }

    /// Stat `path`, following symlinks
    async fn metadata(&self, path: &Path) -> io::Result<EntryKind>;

    /// Like [`FileSystem::metadata`] but a missing path is `Ok(None)`
    async fn probe(&self, path: &Path) -> io::Result<Option<EntryKind>> {
        match self.metadata(path).await {
            Ok(kind) => Ok(Some(kind)),
            Err(e) if is_missing(&e) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Replace the whole file with `contents`, creating it if needed
    async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    async fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Immediate children of a directory, in no particular order
    async fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    /// Rename within one filesystem
    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Move a file or directory subtree, crossing devices if necessary
    async fn move_path(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Copy one file, preserving metadata where supported
    async fn copy_file(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Deep-copy a directory subtree; `to` must not exist
    async fn copy_tree(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// Resolve a leading `~` to `home`.
///
/// Only `~` and `~/...` are expanded; `~user` forms are returned unchanged.
pub fn expand_home(path: &str, home: Option<&Path>) -> PathBuf {
    let Some(home) = home else {
        return PathBuf::from(path);
    };

    if path == "~" {
        return home.to_path_buf();
    }

    let rest = path
        .strip_prefix("~/")
        .or_else(|| if cfg!(windows) { path.strip_prefix("~\\") } else { None });

    match rest {
        Some(rest) => home.join(rest),
        None => PathBuf::from(path),
    }
}

/// Whether an error means "nothing is there"
pub fn is_missing(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::NotFound {
        return true;
    }
    // ENOTDIR: a path component is a regular file
    cfg!(unix) && err.raw_os_error() == Some(20)
}

/// Drop `.` components and fold `..` into its parent, without touching disk
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out
}

/// Whether `inner` lies at or below `outer`.
///
/// Pass both through [`FileSystem::absolute`] first.
pub fn is_within(inner: &Path, outer: &Path) -> bool {
    inner.starts_with(outer)
}
