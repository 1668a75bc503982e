//! Persistent build cache
//!
//! Stores intermediate artifacts (minified files, icon renditions, service
//! worker fragments) between runs. The cache is trusted only when its stamp
//! matches the current tree, tool version and build configuration.
//!
//! # Layout
//!
//! | Path | Contents |
//! |------|----------|
//! | `cache-hash.json` | Stamp written at the end of each session |
//! | `items/` | Artifacts named `<content hash>.<suffixes>` |
//! | `icons/` | Rendered icon sets |
//! | `icons-injectables/` | Icon markup injected into pages |
//! | `serviceworker/` | Service worker fragments |
//!
//! # Session lifecycle
//!
//! 1. `IntegrityGuard::ensure` keeps the cache or wipes and recreates it
//! 2. The build pipeline fills the cache and records live identities
//! 3. `SessionSeal::seal` prunes unused items and writes a new stamp

pub mod collector;
pub mod guard;
pub mod hasher;
pub mod manager;
pub mod seal;
pub mod stamp;
pub mod tasks;

pub use collector::{identity_of, PruneReport, StaleArtifactCollector};
pub use guard::{IntegrityGuard, Invalidation, Verdict};
pub use hasher::{Sha256TreeHasher, TreeHasher};
pub use manager::CacheManager;
pub use seal::{SealOutcome, SessionSeal};
pub use stamp::{CacheStamp, STAMP_FILE};
pub use tasks::{Settled, TaskGroup};

/// Directory holding cached artifacts
pub const ITEMS_DIR: &str = "items";

/// Subdirectories every valid cache contains
pub const CACHE_SUBDIRS: [&str; 4] = [ITEMS_DIR, "icons", "icons-injectables", "serviceworker"];
