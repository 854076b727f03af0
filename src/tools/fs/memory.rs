//! In-memory filesystem for tests and dry runs
//!
//! Paths are normalized lexically and relative paths are resolved against
//! `/`. Individual subtrees can be marked as denied to reproduce permission
//! failures without depending on the host's user privileges.

use super::{DirEntry, EntryKind, FileSystem};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

const DEFAULT_HOME: &str = "/home/agent";

#[derive(Debug, Clone)]
enum Node {
    File(Vec<u8>),
    Dir,
}

#[derive(Debug, Default)]
struct Tree {
    nodes: BTreeMap<PathBuf, Node>,
    denied: BTreeSet<PathBuf>,
}

/// Filesystem held entirely in memory
#[derive(Debug)]
pub struct MemoryFs {
    home: Option<PathBuf>,
    tree: Mutex<Tree>,
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::from("/");
    for component in path.components() {
        match component {
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    out
}

fn not_found() -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, "No such file or directory")
}

fn already_exists() -> io::Error {
    io::Error::new(io::ErrorKind::AlreadyExists, "File exists")
}

fn is_a_directory() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "Is a directory")
}

fn not_a_directory() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "Not a directory")
}

impl Tree {
    fn check_access(&self, path: &Path) -> io::Result<()> {
        if self.denied.iter().any(|denied| path.starts_with(denied)) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "Permission denied",
            ));
        }
        Ok(())
    }

    fn require_dir(&self, path: &Path) -> io::Result<()> {
        match self.nodes.get(path) {
            Some(Node::Dir) => Ok(()),
            Some(Node::File(_)) => Err(not_a_directory()),
            None => Err(not_found()),
        }
    }

    fn require_parent_dir(&self, path: &Path) -> io::Result<()> {
        match path.parent() {
            Some(parent) => self.require_dir(parent),
            None => Err(already_exists()),
        }
    }

    fn mkdir_all(&mut self, path: &Path) -> io::Result<()> {
        let mut current = PathBuf::from("/");
        for component in path.components().skip(1) {
            current.push(component);
            match self.nodes.get(&current) {
                Some(Node::Dir) => {}
                Some(Node::File(_)) => return Err(not_a_directory()),
                None => {
                    self.nodes.insert(current.clone(), Node::Dir);
                }
            }
        }
        Ok(())
    }

    /// `root` and everything below it, keyed relative to `root`
    fn subtree(&self, root: &Path) -> Vec<(PathBuf, Node)> {
        self.nodes
            .range(root.to_path_buf()..)
            .take_while(|(path, _)| path.starts_with(root))
            .map(|(path, node)| {
                let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();
                (relative, node.clone())
            })
            .collect()
    }

    fn graft(&mut self, at: &Path, subtree: Vec<(PathBuf, Node)>) {
        for (relative, node) in subtree {
            let target = if relative.as_os_str().is_empty() {
                at.to_path_buf()
            } else {
                at.join(relative)
            };
            self.nodes.insert(target, node);
        }
    }

    fn relocate(&mut self, from: &Path, to: &Path) -> io::Result<()> {
        if !self.nodes.contains_key(from) {
            return Err(not_found());
        }
        self.require_parent_dir(to)?;
        if to != from && to.starts_with(from) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Invalid argument",
            ));
        }
        if matches!(self.nodes.get(from), Some(Node::Dir)) {
            if let Some(Node::File(_)) = self.nodes.get(to) {
                return Err(not_a_directory());
            }
        }

        let subtree = self.subtree(from);
        for (relative, _) in &subtree {
            self.nodes.remove(&from.join(relative));
        }
        self.nodes.remove(from);
        self.graft(to, subtree);
        Ok(())
    }
}

impl MemoryFs {
    /// Empty tree containing `/` and a home directory at `/home/agent`
    pub fn new() -> Self {
        Self::with_home(DEFAULT_HOME)
    }

    pub fn with_home(home: impl AsRef<Path>) -> Self {
        let home = normalize(home.as_ref());
        let mut tree = Tree::default();
        tree.nodes.insert(PathBuf::from("/"), Node::Dir);
        // Normalized paths never contain a file component here
        let _ = tree.mkdir_all(&home);
        Self {
            home: Some(home),
            tree: Mutex::new(tree),
        }
    }

    fn tree(&self) -> MutexGuard<'_, Tree> {
        self.tree.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a file (and its parents) with the given contents
    pub fn add_file(&self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) {
        let path = normalize(path.as_ref());
        let mut tree = self.tree();
        if let Some(parent) = path.parent() {
            let _ = tree.mkdir_all(parent);
        }
        tree.nodes.insert(path, Node::File(contents.into()));
    }

    /// Create a directory (and its parents)
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = normalize(path.as_ref());
        let _ = self.tree().mkdir_all(&path);
    }

    /// Make every access at or below `path` fail with `PermissionDenied`.
    ///
    /// Stat calls still succeed, as they do for an unreadable file on disk.
    pub fn deny(&self, path: impl AsRef<Path>) {
        self.tree().denied.insert(normalize(path.as_ref()));
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.tree().nodes.contains_key(&normalize(path.as_ref()))
    }

    /// Raw bytes of a file, `None` for directories and missing paths
    pub fn file_bytes(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        match self.tree().nodes.get(&normalize(path.as_ref())) {
            Some(Node::File(bytes)) => Some(bytes.clone()),
            _ => None,
        }
    }

    /// File contents as text, `None` for directories, missing paths and non-UTF-8
    pub fn file_text(&self, path: impl AsRef<Path>) -> Option<String> {
        self.file_bytes(path)
            .and_then(|bytes| String::from_utf8(bytes).ok())
    }
}

impl Default for MemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileSystem for MemoryFs {
    fn home_dir(&self) -> Option<&Path> {
        self.home.as_deref()
    }

    async fn absolute(&self, path: &Path) -> PathBuf {
        normalize(path)
    }

    async fn metadata(&self, path: &Path) -> io::Result<EntryKind> {
        let path = normalize(path);
        match self.tree().nodes.get(&path) {
            Some(Node::File(_)) => Ok(EntryKind::File),
            Some(Node::Dir) => Ok(EntryKind::Dir),
            None => Err(not_found()),
        }
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let path = normalize(path);
        let tree = self.tree();
        tree.check_access(&path)?;
        match tree.nodes.get(&path) {
            Some(Node::File(bytes)) => String::from_utf8(bytes.clone()).map_err(|_| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    "stream did not contain valid UTF-8",
                )
            }),
            Some(Node::Dir) => Err(is_a_directory()),
            None => Err(not_found()),
        }
    }

    async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let path = normalize(path);
        let mut tree = self.tree();
        tree.check_access(&path)?;
        tree.require_parent_dir(&path)?;
        if let Some(Node::Dir) = tree.nodes.get(&path) {
            return Err(is_a_directory());
        }
        tree.nodes.insert(path, Node::File(contents.to_vec()));
        Ok(())
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let path = normalize(path);
        let mut tree = self.tree();
        if let Some(Node::Dir) = tree.nodes.get(&path) {
            return Ok(());
        }
        tree.check_access(&path)?;
        tree.mkdir_all(&path)
    }

    async fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let path = normalize(path);
        let tree = self.tree();
        tree.check_access(&path)?;
        tree.require_dir(&path)?;

        Ok(tree
            .nodes
            .iter()
            .filter(|(child, _)| child.parent() == Some(path.as_path()))
            .map(|(child, node)| DirEntry {
                name: child
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                kind: match node {
                    Node::File(_) => EntryKind::File,
                    Node::Dir => EntryKind::Dir,
                },
            })
            .collect())
    }

    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let (from, to) = (normalize(from), normalize(to));
        let mut tree = self.tree();
        tree.check_access(&from)?;
        tree.check_access(&to)?;
        tree.relocate(&from, &to)
    }

    async fn move_path(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.rename(from, to).await
    }

    async fn copy_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        let (from, to) = (normalize(from), normalize(to));
        let mut tree = self.tree();
        tree.check_access(&from)?;
        tree.check_access(&to)?;
        tree.require_parent_dir(&to)?;
        let bytes = match tree.nodes.get(&from) {
            Some(Node::File(bytes)) => bytes.clone(),
            Some(Node::Dir) => return Err(is_a_directory()),
            None => return Err(not_found()),
        };
        if let Some(Node::Dir) = tree.nodes.get(&to) {
            return Err(is_a_directory());
        }
        tree.nodes.insert(to, Node::File(bytes));
        Ok(())
    }

    async fn copy_tree(&self, from: &Path, to: &Path) -> io::Result<()> {
        let (from, to) = (normalize(from), normalize(to));
        let mut tree = self.tree();
        tree.check_access(&from)?;
        tree.check_access(&to)?;
        tree.require_dir(&from)?;
        tree.require_parent_dir(&to)?;
        if tree.nodes.contains_key(&to) {
            return Err(already_exists());
        }
        let subtree = tree.subtree(&from);
        if subtree
            .iter()
            .any(|(relative, _)| tree.check_access(&from.join(relative)).is_err())
        {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "Permission denied",
            ));
        }
        tree.graft(&to, subtree);
        Ok(())
    }
}
