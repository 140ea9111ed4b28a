//! Filesystem access for compose projects.
//!
//! [`FileSystem`] is the seam the loader reads through; [`LocalFileSystem`]
//! implements it against the real disk with `walkdir` and `tokio::fs`.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dockscope_common::constants::{COMPOSE_FILE_NAMES, IGNORED_DIRECTORIES};
use walkdir::{DirEntry, WalkDir};

/// Read-only filesystem operations needed to load compose projects.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Finds compose files under `root`, at most `max_depth` levels deep.
    ///
    /// Walk errors are suppressed. Results are sorted.
    async fn discover(&self, root: &Path, max_depth: usize) -> Vec<PathBuf>;

    /// Reads a file as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    async fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Returns whether `path` exists.
    async fn exists(&self, path: &Path) -> bool;
}

/// [`FileSystem`] over the local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

#[async_trait]
impl FileSystem for LocalFileSystem {
    async fn discover(&self, root: &Path, max_depth: usize) -> Vec<PathBuf> {
        let root = root.to_path_buf();
        let walk = tokio::task::spawn_blocking(move || discover_blocking(&root, max_depth));
        match walk.await {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!(error = %e, "compose discovery task failed");
                Vec::new()
            }
        }
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        tokio::fs::read_to_string(path).await
    }

    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }
}

/// Returns whether `name` is a recognised compose file name.
#[must_use]
pub fn is_compose_file_name(name: &str) -> bool {
    COMPOSE_FILE_NAMES.contains(&name)
}

fn is_ignored(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| IGNORED_DIRECTORIES.contains(&name))
}

fn discover_blocking(root: &Path, max_depth: usize) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .max_depth(max_depth)
        .into_iter()
        .filter_entry(|entry| !is_ignored(entry))
        .filter_map(Result::ok)
        .filter(|entry| {
            entry.file_type().is_file()
                && entry.file_name().to_str().is_some_and(is_compose_file_name)
        })
        .map(DirEntry::into_path)
        .collect();
    files.sort();
    tracing::debug!(root = %root.display(), count = files.len(), "discovered compose files");
    files
}
