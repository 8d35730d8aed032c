use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Staging area for uploads and conversion outputs.
///
/// Every path handed out lives inside one dedicated directory and carries a
/// freshly generated UUID base name, so concurrent requests can never collide.
/// Nothing is written until the caller writes to the path.
pub struct TempStore {
    root: PathBuf,
}

impl TempStore {
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Allocate a unique path preserving the extension of `original_name`
    /// (including no extension at all).
    pub fn allocate(&self, original_name: &str) -> PathBuf {
        let id = Uuid::new_v4();
        let name = match Path::new(original_name).extension() {
            Some(ext) => format!("{}.{}", id, ext.to_string_lossy()),
            None => id.to_string(),
        };
        self.root.join(name)
    }

    /// Allocate a unique path whose name ends in `suffix`, e.g.
    /// `allocate_named("merged.pdf")` -> `<uuid>_merged.pdf`.
    ///
    /// Keeps download-facing names readable while staying collision-free.
    pub fn allocate_named(&self, suffix: &str) -> PathBuf {
        self.root.join(format!("{}_{}", Uuid::new_v4(), suffix))
    }

    /// Create a fresh per-request subdirectory, used as an isolated output
    /// directory for external converters that pick their own file names.
    pub fn scratch_dir(&self) -> io::Result<PathBuf> {
        let dir = self.root.join(Uuid::new_v4().to_string());
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Write uploaded bytes to a freshly allocated path.
    pub async fn persist(&self, original_name: &str, data: &[u8]) -> io::Result<PathBuf> {
        let path = self.allocate(original_name);
        tokio::fs::write(&path, data).await?;
        Ok(path)
    }

    /// Delete leftovers from previous runs. Returns the number of entries
    /// removed; individual failures are skipped.
    pub fn sweep(&self) -> usize {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(_) => return 0,
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            let result = if path.is_dir() {
                std::fs::remove_dir_all(&path)
            } else {
                std::fs::remove_file(&path)
            };
            if result.is_ok() {
                removed += 1;
            }
        }
        removed
    }
}

/// Remove a file, ignoring a missing path and any other failure.
///
/// Input temp copies are deleted with this on every exit path; cleanup is
/// best-effort and never surfaces to the client.
pub fn remove_quietly(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != io::ErrorKind::NotFound {
            tracing::debug!("Could not remove {}: {}", path.display(), e);
        }
    }
}

/// Remove a directory tree, ignoring failures.
pub fn remove_dir_quietly(path: &Path) {
    if let Err(e) = std::fs::remove_dir_all(path) {
        if e.kind() != io::ErrorKind::NotFound {
            tracing::debug!("Could not remove {}: {}", path.display(), e);
        }
    }
}
