//! Concurrent filesystem task groups
//!
//! Tasks are awaited together and every outcome is kept. A failing task
//! never cancels its siblings; the caller decides what a failure means.

use futures_util::future::{join_all, BoxFuture, FutureExt};
use std::future::Future;
use std::io;
use std::path::PathBuf;

/// Outcome of one task, labelled with the path it operated on
#[derive(Debug)]
pub struct Settled<T> {
    pub path: PathBuf,
    pub outcome: io::Result<T>,
}

/// A group of independent I/O tasks awaited as a unit
pub struct TaskGroup<'a, T> {
    tasks: Vec<(PathBuf, BoxFuture<'a, io::Result<T>>)>,
}

impl<'a, T: Send + 'a> TaskGroup<'a, T> {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Add a task operating on `path`
    pub fn push<F>(&mut self, path: PathBuf, task: F)
    where
        F: Future<Output = io::Result<T>> + Send + 'a,
    {
        self.tasks.push((path, task.boxed()));
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Run every task concurrently and collect each outcome in push order
    pub async fn settle(self) -> Vec<Settled<T>> {
        let (paths, futures): (Vec<_>, Vec<_>) = self.tasks.into_iter().unzip();
        let outcomes = join_all(futures).await;

        paths
            .into_iter()
            .zip(outcomes)
            .map(|(path, outcome)| Settled { path, outcome })
            .collect()
    }
}

impl<'a, T: Send + 'a> Default for TaskGroup<'a, T> {
    fn default() -> Self {
        Self::new()
    }
}
