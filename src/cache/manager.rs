//! Cache lifecycle facade
//!
//! Owns the filesystem and hashing backends together with the session
//! context, and exposes the start-of-session and end-of-session steps.

use crate::cache::guard::{IntegrityGuard, Invalidation, Verdict};
use crate::cache::hasher::{Sha256TreeHasher, TreeHasher};
use crate::cache::seal::{SealOutcome, SessionSeal};
use crate::cache::stamp::CacheStamp;
use crate::error::{EwaError, EwaResult};
use crate::fs::{FileSystem, TokioFs};
use crate::session::{BuildSession, CacheContext};
use tracing::info;

/// Manages one cache root for one build session
pub struct CacheManager {
    ctx: CacheContext,
    fs: Box<dyn FileSystem>,
    hasher: Box<dyn TreeHasher>,
}

impl CacheManager {
    /// Create a manager using the real filesystem and SHA-256 tree hashing
    pub fn new(ctx: CacheContext) -> Self {
        Self::with_backends(ctx, Box::new(TokioFs), Box::new(Sha256TreeHasher))
    }

    /// Create a manager with explicit backends
    pub fn with_backends(
        ctx: CacheContext,
        fs: Box<dyn FileSystem>,
        hasher: Box<dyn TreeHasher>,
    ) -> Self {
        Self { ctx, fs, hasher }
    }

    pub fn context(&self) -> &CacheContext {
        &self.ctx
    }

    /// Validate the cache at session start, rebuilding it if untrusted
    pub async fn ensure(&self) -> EwaResult<Verdict> {
        IntegrityGuard::new(&*self.fs, &*self.hasher)
            .ensure(&self.ctx)
            .await
    }

    /// List the reasons the cache would be rebuilt, without changing it
    pub async fn inspect(&self) -> Vec<Invalidation> {
        IntegrityGuard::new(&*self.fs, &*self.hasher)
            .inspect(&self.ctx)
            .await
    }

    /// The stamp currently on disk, if any
    pub async fn stamp(&self) -> Option<CacheStamp> {
        CacheStamp::read(&*self.fs, self.ctx.root()).await
    }

    /// Finalize the cache at session end
    pub async fn seal(&self, session: &BuildSession) -> EwaResult<SealOutcome> {
        SessionSeal::new(&*self.fs, &*self.hasher)
            .seal(&self.ctx, session)
            .await
    }

    /// Delete the whole cache root
    pub async fn clear(&self) -> EwaResult<()> {
        self.fs.remove(self.ctx.root()).await.map_err(|e| {
            EwaError::io(format!("removing cache {}", self.ctx.root().display()), e)
        })?;
        info!("Removed cache at {}", self.ctx.root().display());
        Ok(())
    }
}
