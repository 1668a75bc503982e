//! Session-start integrity check
//!
//! Decides whether the cache left by a previous run can be trusted. Anything
//! doubtful (disabled caching, tampered contents, another tool version, a
//! changed build configuration, a missing or corrupt stamp) is resolved the
//! same way: the cache root is emptied and the fixed layout recreated.

use crate::cache::hasher::TreeHasher;
use crate::cache::stamp::{CacheStamp, STAMP_FILE};
use crate::cache::tasks::TaskGroup;
use crate::cache::CACHE_SUBDIRS;
use crate::error::{EwaError, EwaResult};
use crate::fs::FileSystem;
use crate::session::CacheContext;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info};

/// Why an existing cache was not trusted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidation {
    /// Caching is turned off for this run
    Disabled,
    /// The stamp file is missing, empty or unparsable
    MissingStamp,
    /// The tree no longer matches the hash recorded at the last seal
    HashMismatch { stamped: String, actual: String },
    /// The cache was sealed by another version of the tool
    VersionMismatch { stamped: String, running: String },
    /// The build configuration changed since the last seal
    ConfigMismatch,
    /// The tree could not be hashed
    Unreadable(String),
}

impl fmt::Display for Invalidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "caching is disabled by configuration"),
            Self::MissingStamp => write!(f, "no valid cache stamp found"),
            Self::HashMismatch { .. } => write!(f, "cache contents changed since the last seal"),
            Self::VersionMismatch { stamped, running } => {
                write!(f, "cache was sealed by version {}, running {}", stamped, running)
            }
            Self::ConfigMismatch => write!(f, "build configuration changed since the last seal"),
            Self::Unreadable(reason) => write!(f, "cache tree could not be read: {}", reason),
        }
    }
}

/// Result of the integrity check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Existing contents were trusted and left untouched
    Reused,
    /// The cache was wiped and recreated for the listed reasons
    Rebuilt(Vec<Invalidation>),
}

impl Verdict {
    /// Whether the previous contents were valid and kept
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Reused)
    }

    pub fn reasons(&self) -> &[Invalidation] {
        match self {
            Self::Reused => &[],
            Self::Rebuilt(reasons) => reasons,
        }
    }
}

/// Validates the cache at session start
pub struct IntegrityGuard<'a> {
    fs: &'a dyn FileSystem,
    hasher: &'a dyn TreeHasher,
}

impl<'a> IntegrityGuard<'a> {
    pub fn new(fs: &'a dyn FileSystem, hasher: &'a dyn TreeHasher) -> Self {
        Self { fs, hasher }
    }

    /// Check the cache and wipe it if it cannot be trusted.
    ///
    /// Staleness is never an error. Only a failure to recreate the cache
    /// layout is returned as one.
    pub async fn ensure(&self, ctx: &CacheContext) -> EwaResult<Verdict> {
        info!("Making sure the cache at {} is valid", ctx.root().display());

        let stamp = CacheStamp::load(self.fs, ctx.root()).await;
        let reasons = self.check(ctx, stamp).await;

        if reasons.is_empty() {
            info!("The cache and its contents seem to be valid");
            return Ok(Verdict::Reused);
        }

        for reason in &reasons {
            info!("Cache will be rebuilt: {}", reason);
        }
        self.rebuild(ctx).await?;

        Ok(Verdict::Rebuilt(reasons))
    }

    /// Report why the cache would be rebuilt, without touching it.
    ///
    /// An empty list means `ensure` would reuse the cache.
    pub async fn inspect(&self, ctx: &CacheContext) -> Vec<Invalidation> {
        let stamp = CacheStamp::read(self.fs, ctx.root()).await;
        self.check(ctx, stamp).await
    }

    async fn check(&self, ctx: &CacheContext, stamp: Option<CacheStamp>) -> Vec<Invalidation> {
        if !ctx.use_cache {
            return vec![Invalidation::Disabled];
        }

        let mut reasons = Vec::new();

        let actual = match self
            .hasher
            .hash(ctx.root(), &[PathBuf::from(STAMP_FILE)])
            .await
        {
            Ok(hash) => Some(hash),
            Err(e) => {
                reasons.push(Invalidation::Unreadable(e.to_string()));
                None
            }
        };

        let Some(stamp) = stamp else {
            reasons.push(Invalidation::MissingStamp);
            return reasons;
        };

        if let Some(actual) = actual {
            if actual != stamp.hash {
                debug!("Stamped hash {} differs from tree hash {}", stamp.hash, actual);
                reasons.push(Invalidation::HashMismatch {
                    stamped: stamp.hash.clone(),
                    actual,
                });
            }
        }

        if stamp.version != ctx.version {
            reasons.push(Invalidation::VersionMismatch {
                stamped: stamp.version.clone(),
                running: ctx.version.clone(),
            });
        }

        if stamp.config_hash != ctx.config_hash {
            reasons.push(Invalidation::ConfigMismatch);
        }

        reasons
    }

    /// Empty the cache root, then recreate every required subdirectory
    async fn rebuild(&self, ctx: &CacheContext) -> EwaResult<()> {
        self.fs
            .empty_dir(ctx.root())
            .await
            .map_err(|source| EwaError::CacheScaffold {
                path: ctx.cache_path.clone(),
                source,
            })?;

        let mut group = TaskGroup::new();
        for name in CACHE_SUBDIRS {
            let path = ctx.subdir(name);
            group.push(path.clone(), async move { self.fs.ensure_dir(&path).await });
        }

        for settled in group.settle().await {
            settled
                .outcome
                .map_err(|source| EwaError::CacheScaffold {
                    path: settled.path,
                    source,
                })?;
        }

        debug!("Recreated cache layout at {}", ctx.root().display());
        Ok(())
    }
}
