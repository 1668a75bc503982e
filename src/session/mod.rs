//! Build session context
//!
//! A session is described by an immutable `CacheContext` and a mutable
//! `BuildSession` that accumulates the artifact identities in use.

pub mod context;
pub mod state;

pub use context::{CacheContext, TOOL_VERSION};
pub use state::BuildSession;
