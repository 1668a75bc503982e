//! Whole-tree content hashing
//!
//! Produces one fingerprint for a directory tree so the cache can tell
//! whether anything under it changed since it was last sealed.

use async_trait::async_trait;
use futures_util::future::{BoxFuture, FutureExt};
use sha2::{Digest, Sha256};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncReadExt;

const FILE_TAG: u8 = b'f';
const DIR_TAG: u8 = b'd';
const READ_CHUNK: usize = 64 * 1024;

/// Computes a deterministic fingerprint of a directory tree
#[async_trait]
pub trait TreeHasher: Send + Sync {
    /// Hash everything under `root` except the given root-relative paths.
    ///
    /// A missing root hashes as an empty tree.
    async fn hash(&self, root: &Path, exclude: &[PathBuf]) -> io::Result<String>;
}

/// SHA-256 Merkle-style tree hasher.
///
/// Each directory digest covers its children sorted by raw name bytes, every
/// child contributing a kind tag, its name and its own digest. File digests cover
/// the file bytes. The name of the root itself, timestamps and permissions
/// are not part of the result. Symlinks and special files are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256TreeHasher;

impl Sha256TreeHasher {
    fn hash_dir<'a>(
        &'a self,
        dir: PathBuf,
        relative: PathBuf,
        exclude: &'a [PathBuf],
    ) -> BoxFuture<'a, io::Result<[u8; 32]>> {
        async move {
            let mut entries = fs::read_dir(&dir).await?;
            let mut children = Vec::new();

            while let Some(entry) = entries.next_entry().await? {
                let name = entry.file_name();
                let child_relative = relative.join(&name);
                if exclude.iter().any(|path| *path == child_relative) {
                    continue;
                }

                let file_type = entry.file_type().await?;
                let (tag, digest) = if file_type.is_dir() {
                    let digest = self
                        .hash_dir(entry.path(), child_relative, exclude)
                        .await?;
                    (DIR_TAG, digest)
                } else if file_type.is_file() {
                    (FILE_TAG, hash_file(&entry.path()).await?)
                } else {
                    continue;
                };

                children.push((name, tag, digest));
            }

            children.sort_by(|a, b| a.0.as_encoded_bytes().cmp(b.0.as_encoded_bytes()));

            let mut hasher = Sha256::new();
            for (name, tag, digest) in &children {
                let name = name.as_encoded_bytes();
                hasher.update([*tag]);
                hasher.update((name.len() as u64).to_le_bytes());
                hasher.update(name);
                hasher.update(digest);
            }
            Ok(finish(hasher))
        }
        .boxed()
    }
}

#[async_trait]
impl TreeHasher for Sha256TreeHasher {
    async fn hash(&self, root: &Path, exclude: &[PathBuf]) -> io::Result<String> {
        match fs::metadata(root).await {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(hex::encode(Sha256::new().finalize()));
            }
            Err(e) => return Err(e),
        }

        let digest = self
            .hash_dir(root.to_path_buf(), PathBuf::new(), exclude)
            .await?;
        Ok(hex::encode(digest))
    }
}

async fn hash_file(path: &Path) -> io::Result<[u8; 32]> {
    let mut file = fs::File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; READ_CHUNK];

    loop {
        let read = file.read(&mut buf).await?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Ok(finish(hasher))
}

fn finish(hasher: Sha256) -> [u8; 32] {
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&hasher.finalize());
    digest
}
