//! Cache stamp persistence
//!
//! The stamp is the only metadata describing whether a cache can be
//! trusted: the tree hash at seal time, the tool version that sealed it
//! and the fingerprint of the build configuration it was built with.

use crate::error::{EwaError, EwaResult};
use crate::fs::FileSystem;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// File name of the stamp inside the cache root
pub const STAMP_FILE: &str = "cache-hash.json";

/// Persisted record proving the state of the cache at its last seal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStamp {
    /// Tree hash of the cache root, excluding this file
    pub hash: String,

    /// Version of the tool that sealed the cache
    pub version: String,

    /// Fingerprint of the build configuration
    #[serde(rename = "config")]
    pub config_hash: String,
}

impl CacheStamp {
    pub fn new(
        hash: impl Into<String>,
        version: impl Into<String>,
        config_hash: impl Into<String>,
    ) -> Self {
        Self {
            hash: hash.into(),
            version: version.into(),
            config_hash: config_hash.into(),
        }
    }

    /// Read the stamp from `cache_root`, creating an empty stamp file first
    /// if none exists.
    ///
    /// Returns `None` when the file is missing, empty, unreadable or not a
    /// valid stamp. Callers treat that exactly like a mismatching stamp.
    pub async fn load(fs: &dyn FileSystem, cache_root: &Path) -> Option<Self> {
        let path = cache_root.join(STAMP_FILE);

        if let Err(e) = fs.ensure_file(&path).await {
            debug!("Could not create stamp file {}: {}", path.display(), e);
            return None;
        }

        Self::read(fs, cache_root).await
    }

    /// Read the stamp from `cache_root` without creating anything
    pub async fn read(fs: &dyn FileSystem, cache_root: &Path) -> Option<Self> {
        let path = cache_root.join(STAMP_FILE);

        let content = match fs.read_to_string(&path).await {
            Ok(content) => content,
            Err(e) => {
                debug!("Could not read stamp file {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(stamp) => Some(stamp),
            Err(e) => {
                debug!("Ignoring unparsable stamp {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Write the stamp into `cache_root`, replacing any previous one
    pub async fn save(&self, fs: &dyn FileSystem, cache_root: &Path) -> EwaResult<()> {
        let path = cache_root.join(STAMP_FILE);
        let content = serde_json::to_vec_pretty(self)?;

        fs.write(&path, &content)
            .await
            .map_err(|source| EwaError::StampWrite { path, source })
    }
}
