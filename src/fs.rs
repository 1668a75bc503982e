//! Filesystem port
//!
//! The cache logic only touches the disk through this trait, so it can be
//! exercised against a fault-injecting or in-memory implementation.

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Minimal filesystem capabilities needed by the cache
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Create a directory and all of its parents if missing
    async fn ensure_dir(&self, path: &Path) -> io::Result<()>;

    /// Create an empty file (and its parents) if nothing exists at `path`
    async fn ensure_file(&self, path: &Path) -> io::Result<()>;

    /// Delete everything inside `path`, creating it if it does not exist
    async fn empty_dir(&self, path: &Path) -> io::Result<()>;

    /// Remove a file or a whole directory tree. A missing path is not an error.
    async fn remove(&self, path: &Path) -> io::Result<()>;

    /// Read a UTF-8 file
    async fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write a file, replacing any previous contents
    async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// List every file below `dir`, as paths relative to `dir`.
    ///
    /// A missing directory yields an empty list.
    async fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;
}

/// `FileSystem` backed by `tokio::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFs;

#[async_trait]
impl FileSystem for TokioFs {
    async fn ensure_dir(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path).await
    }

    async fn ensure_file(&self, path: &Path) -> io::Result<()> {
        if fs::symlink_metadata(path).await.is_ok() {
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map(drop)
    }

    async fn empty_dir(&self, path: &Path) -> io::Result<()> {
        let mut entries = match fs::read_dir(path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return fs::create_dir_all(path).await;
            }
            Err(e) => return Err(e),
        };

        while let Some(entry) = entries.next_entry().await? {
            self.remove(&entry.path()).await?;
        }
        Ok(())
    }

    async fn remove(&self, path: &Path) -> io::Result<()> {
        let meta = match fs::symlink_metadata(path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        };

        let result = if meta.is_dir() {
            fs::remove_dir_all(path).await
        } else {
            fs::remove_file(path).await
        };

        match result {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path).await
    }

    async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        fs::write(path, contents).await
    }

    async fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut pending = vec![PathBuf::new()];

        while let Some(relative) = pending.pop() {
            let mut entries = match fs::read_dir(dir.join(&relative)).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == io::ErrorKind::NotFound && relative.as_os_str().is_empty() => {
                    return Ok(files);
                }
                Err(e) => return Err(e),
            };

            while let Some(entry) = entries.next_entry().await? {
                let path = relative.join(entry.file_name());
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                } else {
                    files.push(path);
                }
            }
        }

        files.sort();
        Ok(files)
    }
}
