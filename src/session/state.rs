//! Per-session mutable state

use crate::error::{EwaError, EwaResult};
use std::collections::BTreeSet;
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// State accumulated while a build runs
#[derive(Debug, Clone, Default)]
pub struct BuildSession {
    /// Identities of the cached artifacts this session produced or still needs
    live: BTreeSet<String>,
}

impl BuildSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an artifact identity as live. Returns `false` if it already was.
    pub fn record(&mut self, identity: impl Into<String>) -> bool {
        self.live.insert(identity.into())
    }

    pub fn extend<I, S>(&mut self, identities: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.live.extend(identities.into_iter().map(Into::into));
    }

    pub fn is_live(&self, identity: &str) -> bool {
        self.live.contains(identity)
    }

    pub fn live_identities(&self) -> &BTreeSet<String> {
        &self.live
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Add identities listed in a file, one per line.
    ///
    /// Blank lines and lines starting with `#` are skipped. Returns the
    /// number of identities that were not already live.
    pub async fn load_live_file(&mut self, path: &Path) -> EwaResult<usize> {
        let content = fs::read_to_string(path).await.map_err(|e| {
            EwaError::io(format!("reading live identities from {}", path.display()), e)
        })?;

        let before = self.live.len();
        self.extend(parse_live_list(&content));
        let added = self.live.len() - before;

        debug!("Loaded {} live identities from {}", added, path.display());
        Ok(added)
    }
}

fn parse_live_list(content: &str) -> impl Iterator<Item = &str> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}
