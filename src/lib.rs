//! ewa-cache - Persistent build cache for Easy-WebApp
//!
//! Decides at the start of a build whether the on-disk artifact cache can be
//! trusted, and at the end prunes unused artifacts and stamps the cache so
//! the next run can verify it.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod fs;
pub mod session;

pub use error::{EwaError, EwaResult};
