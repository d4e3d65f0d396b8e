//! Where snapshots get recorded after they are written.
//!
//! The pipeline only sees [`HistorySink`]; `git` lives behind
//! [`git::GitHistory`].

pub mod git;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::types::WatchResult;

pub use git::GitHistory;

/// A revision-control backend for snapshot files.
#[async_trait]
pub trait HistorySink: Send + Sync {
    /// Whether [`HistorySink::record`] actually keeps anything.
    fn enabled(&self) -> bool {
        true
    }

    /// Make sure there is a repository to record into.
    async fn ensure_initialized(&self) -> WatchResult<()>;

    /// Stage `paths` and commit them with `message`.
    async fn record(&self, paths: &[PathBuf], message: &str) -> WatchResult<()>;
}

/// Sink that records nothing. Used when commits are turned off.
pub struct NoopHistory;

#[async_trait]
impl HistorySink for NoopHistory {
    fn enabled(&self) -> bool {
        false
    }

    async fn ensure_initialized(&self) -> WatchResult<()> {
        Ok(())
    }

    async fn record(&self, paths: &[PathBuf], message: &str) -> WatchResult<()> {
        tracing::debug!("history disabled, not recording {} path(s): {message}", paths.len());
        Ok(())
    }
}

/// Commit message for the snapshot taken at `timestamp`.
pub fn commit_message(timestamp: &str) -> String {
    format!("Update JS snapshot: {timestamp}")
}
