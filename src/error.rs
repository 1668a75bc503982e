//! Error types for ewa-cache
//!
//! All modules use `EwaResult<T>` as their return type. Cache staleness is
//! never represented here: an untrusted cache is rebuilt, not reported.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ewa-cache operations
pub type EwaResult<T> = Result<T, EwaError>;

/// All errors that can occur in ewa-cache
#[derive(Error, Debug)]
pub enum EwaError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Cache errors
    #[error("Failed to write cache stamp {path}: {source}")]
    StampWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create cache directory {path}: {source}")]
    CacheScaffold {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to hash cache tree at {path}: {source}")]
    TreeHash {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl EwaError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Whether the error must end the current build session.
    ///
    /// A cache that cannot be stamped or scaffolded cannot be trusted by the
    /// next run, so the session must not continue silently.
    pub fn is_fatal_for_session(&self) -> bool {
        matches!(
            self,
            Self::StampWrite { .. } | Self::CacheScaffold { .. } | Self::TreeHash { .. }
        )
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ConfigNotFound(_) => Some("Create it with: ewa-cache --config <path> config init"),
            Self::StampWrite { .. } | Self::CacheScaffold { .. } => {
                Some("Check that the cache directory is writable, or set cache.enabled = false")
            }
            Self::TreeHash { .. } => Some("Run: ewa-cache clear"),
            _ => None,
        }
    }
}
