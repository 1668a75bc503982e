//! Immutable settings for one cache session

use crate::cache::{ITEMS_DIR, STAMP_FILE};
use crate::config::Config;
use crate::error::EwaResult;
use std::path::{Path, PathBuf};

/// Version of this tool, recorded in every cache stamp
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Everything the cache needs to know about the current run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheContext {
    /// Root directory of the cache
    pub cache_path: PathBuf,

    /// Whether the cache is kept between runs
    pub use_cache: bool,

    /// Fingerprint of the active build configuration
    pub config_hash: String,

    /// Version of the running tool
    pub version: String,
}

impl CacheContext {
    pub fn new(
        cache_path: impl Into<PathBuf>,
        use_cache: bool,
        config_hash: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            cache_path: cache_path.into(),
            use_cache,
            config_hash: config_hash.into(),
            version: version.into(),
        }
    }

    /// Build a context from project configuration and the running tool version
    pub fn from_config(config: &Config) -> EwaResult<Self> {
        Ok(Self::new(
            config.cache_path(),
            config.cache.enabled,
            config.fingerprint()?,
            TOOL_VERSION,
        ))
    }

    /// Replace the computed config fingerprint with a precomputed one
    pub fn with_config_hash(mut self, config_hash: impl Into<String>) -> Self {
        self.config_hash = config_hash.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.cache_path
    }

    pub fn stamp_path(&self) -> PathBuf {
        self.cache_path.join(STAMP_FILE)
    }

    pub fn subdir(&self, name: &str) -> PathBuf {
        self.cache_path.join(name)
    }

    pub fn items_dir(&self) -> PathBuf {
        self.subdir(ITEMS_DIR)
    }
}
