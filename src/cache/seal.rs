//! Session-end finalization
//!
//! With caching enabled, stale artifacts are pruned first and the cache is
//! then re-stamped, so the stamp describes the pruned tree. With caching
//! disabled the whole cache root is removed.

use crate::cache::collector::{PruneReport, StaleArtifactCollector};
use crate::cache::hasher::TreeHasher;
use crate::cache::stamp::{CacheStamp, STAMP_FILE};
use crate::error::{EwaError, EwaResult};
use crate::fs::FileSystem;
use crate::session::{BuildSession, CacheContext};
use std::path::PathBuf;
use tracing::{info, warn};

/// What sealing did to the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SealOutcome {
    /// Stale artifacts were pruned and a new stamp written
    Stamped {
        stamp: CacheStamp,
        prune: PruneReport,
    },
    /// Caching is disabled and the cache root was removed
    /// (`clean` is false if removal failed and data may remain on disk)
    Removed { clean: bool },
}

/// Finalizes the cache at session end
pub struct SessionSeal<'a> {
    fs: &'a dyn FileSystem,
    hasher: &'a dyn TreeHasher,
}

impl<'a> SessionSeal<'a> {
    pub fn new(fs: &'a dyn FileSystem, hasher: &'a dyn TreeHasher) -> Self {
        Self { fs, hasher }
    }

    /// Prune and re-stamp the cache, or remove it when caching is disabled.
    ///
    /// Failing to hash the pruned tree or to write the stamp is returned as
    /// an error: an unstamped cache must not outlive the session silently.
    pub async fn seal(&self, ctx: &CacheContext, session: &BuildSession) -> EwaResult<SealOutcome> {
        if !ctx.use_cache {
            info!("Caching is disabled, removing cache at {}", ctx.root().display());
            let clean = match self.fs.remove(ctx.root()).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(
                        "Could not remove cache at {}, stale data may remain on disk: {}",
                        ctx.root().display(),
                        e
                    );
                    false
                }
            };
            return Ok(SealOutcome::Removed { clean });
        }

        info!("Cleaning and sealing cache to make it ready for the next run");

        let prune = StaleArtifactCollector::new(self.fs)
            .prune(ctx.root(), session.live_identities())
            .await;

        let hash = self
            .hasher
            .hash(ctx.root(), &[PathBuf::from(STAMP_FILE)])
            .await
            .map_err(|source| EwaError::TreeHash {
                path: ctx.cache_path.clone(),
                source,
            })?;

        let stamp = CacheStamp::new(hash, ctx.version.clone(), ctx.config_hash.clone());
        stamp.save(self.fs, ctx.root()).await?;

        info!(
            "Sealed cache with {} live item(s), {} removed",
            prune.kept,
            prune.removed.len()
        );
        Ok(SealOutcome::Stamped { stamp, prune })
    }
}
