//! Removal of cached artifacts no longer used by the build

use crate::cache::tasks::TaskGroup;
use crate::cache::ITEMS_DIR;
use crate::fs::FileSystem;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Identity of an artifact: its file name up to the first `.`
///
/// `3f2a9c.min.js` and `3f2a9c.br` both belong to `3f2a9c`.
pub fn identity_of(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

/// What a pruning pass did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    /// Artifacts left in place because their identity is live
    pub kept: usize,
    /// Artifacts removed, relative to `items/`
    pub removed: Vec<PathBuf>,
    /// Artifacts that could not be removed, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

impl PruneReport {
    /// Whether every stale artifact was removed
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Removes stale artifacts from `items/`
pub struct StaleArtifactCollector<'a> {
    fs: &'a dyn FileSystem,
}

impl<'a> StaleArtifactCollector<'a> {
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self { fs }
    }

    /// Remove every artifact whose identity is not in `live`.
    ///
    /// Removals run concurrently. A failed removal is logged and reported
    /// but never stops the others; the file stays behind until the next
    /// full wipe.
    pub async fn prune(&self, cache_root: &Path, live: &BTreeSet<String>) -> PruneReport {
        let items_dir = cache_root.join(ITEMS_DIR);
        let mut report = PruneReport::default();

        let files = match self.fs.list_files(&items_dir).await {
            Ok(files) => files,
            Err(e) => {
                warn!("Could not list cached items in {}: {}", items_dir.display(), e);
                return report;
            }
        };

        let mut group = TaskGroup::new();
        for relative in files {
            let name = relative
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();

            if live.contains(identity_of(&name)) {
                report.kept += 1;
                continue;
            }

            info!(
                "Removing item '{}' from cache, as it is no longer used",
                relative.display()
            );
            let path = items_dir.join(&relative);
            group.push(relative, async move { self.fs.remove(&path).await });
        }

        for settled in group.settle().await {
            match settled.outcome {
                Ok(()) => report.removed.push(settled.path),
                Err(e) => {
                    warn!(
                        "Failed to remove cached item '{}': {}",
                        settled.path.display(),
                        e
                    );
                    report.failed.push((settled.path, e.to_string()));
                }
            }
        }

        debug!(
            "Pruned cache items: {} kept, {} removed, {} failed",
            report.kept,
            report.removed.len(),
            report.failed.len()
        );
        report
    }
}
