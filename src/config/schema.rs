//! Configuration schema for ewa-cache
//!
//! Configuration is stored in the project's `ewa.toml`

use crate::error::EwaResult;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::borrow::Cow;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project paths
    pub paths: PathsConfig,

    /// Cache settings
    pub cache: CacheConfig,

    /// Options that shape the generated artifacts
    pub build: BuildConfig,
}

impl Config {
    /// Fingerprint of the settings that influence cached artifacts.
    ///
    /// Hex SHA-256 over the JSON encoding of `paths.input`, `paths.output`
    /// (as written, lossily decoded) and `build`. `paths.root` and the cache
    /// settings are left out: the same project keeps its fingerprint
    /// wherever it lives on disk and however its config file was found.
    pub fn fingerprint(&self) -> EwaResult<String> {
        #[derive(Serialize)]
        struct Fingerprinted<'a> {
            input: Cow<'a, str>,
            output: Cow<'a, str>,
            build: &'a BuildConfig,
        }

        let encoded = serde_json::to_vec(&Fingerprinted {
            input: self.paths.input.to_string_lossy(),
            output: self.paths.output.to_string_lossy(),
            build: &self.build,
        })?;

        Ok(hex::encode(Sha256::digest(&encoded)))
    }

    /// Absolute (or root-relative) location of the cache directory
    pub fn cache_path(&self) -> PathBuf {
        if self.cache.path.is_absolute() {
            self.cache.path.clone()
        } else {
            self.paths.root.join(&self.cache.path)
        }
    }
}

/// Project layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Project root; relative paths below are resolved against it
    pub root: PathBuf,

    /// Folder holding the website sources
    pub input: PathBuf,

    /// Folder receiving the finished site
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            input: PathBuf::from("source"),
            output: PathBuf::from("public"),
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Keep the cache between runs (default: true)
    pub enabled: bool,

    /// Cache directory, relative to `paths.root` unless absolute
    pub path: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: PathBuf::from(".ewa/cache"),
        }
    }
}

/// Build options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Minify HTML, CSS, JS and SVG files
    pub minify: bool,

    /// Render icon sets from the source logo
    pub icons: bool,

    /// Generate a service worker
    pub service_worker: bool,

    /// Globs of source files excluded from the output
    pub file_exceptions: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            minify: true,
            icons: true,
            service_worker: true,
            file_exceptions: vec![],
        }
    }
}
