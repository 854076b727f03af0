//! Real filesystem backed by `tokio::fs`

use super::{is_missing, normalize_lexically, DirEntry, EntryKind, FileSystem};
use async_trait::async_trait;
use std::ffi::OsString;
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

#[cfg(unix)]
const CROSS_DEVICE_ERROR: i32 = 18; // EXDEV
#[cfg(windows)]
const CROSS_DEVICE_ERROR: i32 = 17; // ERROR_NOT_SAME_DEVICE
#[cfg(not(any(unix, windows)))]
const CROSS_DEVICE_ERROR: i32 = -1;

/// Deepest directory nesting `copy_tree` descends into (symlink loops end here)
const MAX_COPY_DEPTH: usize = 64;

/// The host filesystem
#[derive(Debug, Clone)]
pub struct LocalFs {
    home: Option<PathBuf>,
}

impl LocalFs {
    /// Use the current user's home directory for `~`
    pub fn new() -> Self {
        Self {
            home: dirs::home_dir(),
        }
    }

    /// Use an explicit home directory for `~`
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home: Some(home.into()),
        }
    }
}

impl Default for LocalFs {
    fn default() -> Self {
        Self::new()
    }
}

fn kind_of(meta: &std::fs::Metadata) -> EntryKind {
    if meta.is_dir() {
        EntryKind::Dir
    } else if meta.is_file() {
        EntryKind::File
    } else {
        EntryKind::Other
    }
}

/// Copy the source's modification time onto `to`.
///
/// Best effort: failures are logged and the destination keeps its fresh
/// timestamp.
async fn preserve_mtime(from: &Path, to: &Path) {
    if let Err(e) = copy_mtime(from, to).await {
        tracing::debug!(path = %to.display(), error = %e, "modification time not preserved");
    }
}

async fn copy_mtime(from: &Path, to: &Path) -> io::Result<()> {
    let modified = fs::metadata(from).await?.modified()?;
    // futimens only needs ownership, so a read-only handle works for
    // read-only copies and for directories
    #[cfg(unix)]
    let file = fs::File::open(to).await?;
    #[cfg(not(unix))]
    let file = fs::OpenOptions::new().write(true).open(to).await?;
    let file = file.into_std().await;
    tokio::task::spawn_blocking(move || file.set_modified(modified))
        .await
        .map_err(io::Error::other)?
}

/// Children of `dir` as (path, name, is_dir), read in full before anything is written
async fn list_children(dir: &Path) -> io::Result<Vec<(PathBuf, OsString, bool)>> {
    let mut children = Vec::new();
    let mut read_dir = fs::read_dir(dir).await?;
    while let Some(entry) = read_dir.next_entry().await? {
        let path = entry.path();
        let is_dir = fs::metadata(&path).await?.is_dir();
        children.push((path, entry.file_name(), is_dir));
    }
    Ok(children)
}

impl LocalFs {
    async fn copy_tree_into(
        &self,
        from: &Path,
        to: &Path,
        root_created: &mut bool,
    ) -> io::Result<()> {
        let mut pending = vec![(from.to_path_buf(), to.to_path_buf(), 0usize)];
        let mut created = Vec::new();

        while let Some((src_dir, dst_dir, depth)) = pending.pop() {
            if depth > MAX_COPY_DEPTH {
                return Err(io::Error::other(format!(
                    "directory copy exceeded max depth ({})",
                    MAX_COPY_DEPTH
                )));
            }

            let children = list_children(&src_dir).await?;
            fs::create_dir(&dst_dir).await?;
            *root_created = true;

            for (src, name, is_dir) in children {
                let dst = dst_dir.join(name);
                if is_dir {
                    pending.push((src, dst, depth + 1));
                } else {
                    self.copy_file(&src, &dst).await?;
                }
            }

            created.push((src_dir, dst_dir));
        }

        // Deepest first: filling a child would otherwise bump the parent's
        // mtime, and a read-only directory is locked only once filled
        for (src_dir, dst_dir) in created.into_iter().rev() {
            preserve_mtime(&src_dir, &dst_dir).await;
            let permissions = fs::metadata(&src_dir).await?.permissions();
            fs::set_permissions(&dst_dir, permissions).await?;
        }

        Ok(())
    }
}

#[async_trait]
impl FileSystem for LocalFs {
    fn home_dir(&self) -> Option<&Path> {
        self.home.as_deref()
    }

    /// Canonicalizes the deepest existing ancestor, then appends the rest
    async fn absolute(&self, path: &Path) -> PathBuf {
        let full = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        let components: Vec<Component<'_>> = full.components().collect();

        for split in (1..=components.len()).rev() {
            let existing: PathBuf = components[..split].iter().collect();
            if let Ok(real) = fs::canonicalize(&existing).await {
                let rest: PathBuf = components[split..].iter().collect();
                return normalize_lexically(&real.join(rest));
            }
        }

        normalize_lexically(&full)
    }

    async fn metadata(&self, path: &Path) -> io::Result<EntryKind> {
        fs::metadata(path).await.map(|meta| kind_of(&meta))
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path).await
    }

    async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        fs::write(path, contents).await
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path).await
    }

    async fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        let mut read_dir = fs::read_dir(path).await?;

        while let Some(entry) = read_dir.next_entry().await? {
            // Dangling symlinks list as plain entries
            let kind = match fs::metadata(entry.path()).await {
                Ok(meta) => kind_of(&meta),
                Err(_) => EntryKind::Other,
            };
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind,
            });
        }

        Ok(entries)
    }

    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to).await
    }

    async fn move_path(&self, from: &Path, to: &Path) -> io::Result<()> {
        match fs::rename(from, to).await {
            Ok(()) => Ok(()),
            Err(e) if e.raw_os_error() == Some(CROSS_DEVICE_ERROR) => {
                tracing::debug!(
                    from = %from.display(),
                    to = %to.display(),
                    "rename crosses devices, falling back to copy and remove"
                );
                if fs::metadata(from).await?.is_dir() {
                    self.copy_tree(from, to).await?;
                    fs::remove_dir_all(from).await
                } else {
                    self.copy_file(from, to).await?;
                    fs::remove_file(from).await
                }
            }
            Err(e) => Err(e),
        }
    }

    async fn copy_file(&self, from: &Path, to: &Path) -> io::Result<()> {
        // fs::copy carries the permission bits over
        fs::copy(from, to).await?;
        preserve_mtime(from, to).await;
        Ok(())
    }

    async fn copy_tree(&self, from: &Path, to: &Path) -> io::Result<()> {
        let mut root_created = false;
        let result = self.copy_tree_into(from, to, &mut root_created).await;

        if result.is_err() && root_created {
            if let Err(e) = fs::remove_dir_all(to).await {
                if !is_missing(&e) {
                    tracing::warn!(path = %to.display(), error = %e, "partial copy left behind");
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_metadata_kinds() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.txt"), "a").unwrap();

        let fs = LocalFs::new();
        assert_eq!(fs.metadata(temp.path()).await.unwrap(), EntryKind::Dir);
        assert_eq!(
            fs.metadata(&temp.path().join("a.txt")).await.unwrap(),
            EntryKind::File
        );
        assert_eq!(fs.probe(&temp.path().join("missing")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_probe_through_file_component() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.txt"), "a").unwrap();

        let fs = LocalFs::new();
        let nested = temp.path().join("a.txt").join("child");
        assert_eq!(fs.probe(&nested).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_copy_tree_nested() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        std::fs::create_dir_all(src.join("inner/deeper")).unwrap();
        std::fs::write(src.join("top.txt"), "top").unwrap();
        std::fs::write(src.join("inner/deeper/leaf.txt"), "leaf").unwrap();

        let fs = LocalFs::new();
        let dst = temp.path().join("dst");
        fs.copy_tree(&src, &dst).await.unwrap();

        assert_eq!(std::fs::read_to_string(dst.join("top.txt")).unwrap(), "top");
        assert_eq!(
            std::fs::read_to_string(dst.join("inner/deeper/leaf.txt")).unwrap(),
            "leaf"
        );
        assert!(src.join("inner/deeper/leaf.txt").exists());
    }

    #[tokio::test]
    async fn test_copy_file_preserves_mtime() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src.txt");
        std::fs::write(&src, "data").unwrap();

        let past = std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_000_000);
        std::fs::OpenOptions::new()
            .write(true)
            .open(&src)
            .unwrap()
            .set_modified(past)
            .unwrap();

        let fs = LocalFs::new();
        let dst = temp.path().join("dst.txt");
        fs.copy_file(&src, &dst).await.unwrap();

        let copied = std::fs::metadata(&dst).unwrap().modified().unwrap();
        assert_eq!(copied, past);
    }

    #[cfg(unix)]
    fn set_mtime(path: &Path, secs: u64) -> std::time::SystemTime {
        let time = std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(secs);
        std::fs::File::open(path).unwrap().set_modified(time).unwrap();
        time
    }

    #[tokio::test]
    async fn test_absolute_resolves_parent_components() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("proj")).unwrap();
        std::fs::create_dir(temp.path().join("other")).unwrap();

        let fs = LocalFs::new();
        let real_proj = std::fs::canonicalize(temp.path().join("proj")).unwrap();

        let dotted = temp.path().join("other/../proj/sub");
        assert_eq!(fs.absolute(&dotted).await, real_proj.join("sub"));

        let missing_middle = temp.path().join("proj/new/../sub/leaf");
        assert_eq!(fs.absolute(&missing_middle).await, real_proj.join("sub/leaf"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_absolute_resolves_symlinks() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("proj")).unwrap();
        std::os::unix::fs::symlink(temp.path().join("proj"), temp.path().join("link")).unwrap();

        let fs = LocalFs::new();
        let real_proj = std::fs::canonicalize(temp.path().join("proj")).unwrap();
        assert_eq!(
            fs.absolute(&temp.path().join("link/sub")).await,
            real_proj.join("sub")
        );
    }

    #[tokio::test]
    async fn test_copy_tree_into_own_subdirectory_terminates() {
        let temp = TempDir::new().unwrap();
        let proj = temp.path().join("proj");
        std::fs::create_dir_all(proj.join("inner")).unwrap();
        std::fs::write(proj.join("a.txt"), "a").unwrap();

        let fs = LocalFs::new();
        fs.copy_tree(&proj, &proj.join("sub")).await.unwrap();

        assert_eq!(std::fs::read_to_string(proj.join("sub/a.txt")).unwrap(), "a");
        assert!(proj.join("sub/inner").is_dir());
        assert!(!proj.join("sub/sub").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_copy_tree_symlink_loop_removes_partial_copy() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        std::fs::create_dir(&src).unwrap();
        std::fs::write(src.join("a.txt"), "a").unwrap();
        std::os::unix::fs::symlink(&src, src.join("loop")).unwrap();

        let fs = LocalFs::new();
        let dst = temp.path().join("dst");
        let err = fs.copy_tree(&src, &dst).await.unwrap_err();

        assert!(err.to_string().contains("max depth"));
        assert!(!dst.exists());
    }

    #[tokio::test]
    async fn test_copy_tree_existing_destination_untouched() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");
        std::fs::create_dir(&src).unwrap();
        std::fs::create_dir(&dst).unwrap();
        std::fs::write(dst.join("keep.txt"), "keep").unwrap();

        let fs = LocalFs::new();
        assert!(fs.copy_tree(&src, &dst).await.is_err());
        assert_eq!(std::fs::read_to_string(dst.join("keep.txt")).unwrap(), "keep");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_copy_tree_preserves_directory_mtime() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        std::fs::create_dir_all(src.join("inner")).unwrap();
        std::fs::write(src.join("inner/f.txt"), "f").unwrap();
        let inner_time = set_mtime(&src.join("inner"), 2_000_000);
        let root_time = set_mtime(&src, 3_000_000);

        let fs = LocalFs::new();
        let dst = temp.path().join("dst");
        fs.copy_tree(&src, &dst).await.unwrap();

        assert_eq!(std::fs::metadata(&dst).unwrap().modified().unwrap(), root_time);
        assert_eq!(
            std::fs::metadata(dst.join("inner")).unwrap().modified().unwrap(),
            inner_time
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_copy_read_only_file_preserves_mtime() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let src = temp.path().join("ro.txt");
        std::fs::write(&src, "data").unwrap();
        let past = set_mtime(&src, 1_500_000);
        std::fs::set_permissions(&src, std::fs::Permissions::from_mode(0o444)).unwrap();

        let fs = LocalFs::new();
        let dst = temp.path().join("copy.txt");
        fs.copy_file(&src, &dst).await.unwrap();

        let meta = std::fs::metadata(&dst).unwrap();
        assert!(meta.permissions().readonly());
        assert_eq!(meta.modified().unwrap(), past);
    }

    #[test]
    fn test_with_home_expansion() {
        let fs = LocalFs::with_home("/srv/agent");
        assert_eq!(fs.expand("~/x.txt"), PathBuf::from("/srv/agent/x.txt"));
    }
}
