//! Core data types for one snapshot run.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A downloaded script body together with the URL it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedAsset {
    pub url: String,
    pub body: String,
}

impl DownloadedAsset {
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
        }
    }
}

/// Summary of a single pipeline run.
///
/// Returned by [`crate::pipeline::run_once`] instead of being kept as
/// watcher state; the driver only logs or prints it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// `YYYYMMDD_HHMMSS` stamp used for the file name and commit message.
    pub timestamp: String,
    /// Script URLs discovered on the page (after normalization).
    pub scripts_found: usize,
    /// URLs whose bodies made it into the snapshot, in order.
    pub downloaded: Vec<String>,
    /// URLs that were skipped because their download failed.
    pub failed: Vec<String>,
    /// Where the snapshot was written, if the write succeeded.
    pub snapshot_path: Option<PathBuf>,
    /// Whether the history sink accepted the record.
    pub recorded: bool,
}

impl RunReport {
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            scripts_found: 0,
            downloaded: Vec::new(),
            failed: Vec::new(),
            snapshot_path: None,
            recorded: false,
        }
    }
}

/// One entry of the snapshot history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommitInfo {
    pub hash: String,
    pub date: chrono::DateTime<chrono::FixedOffset>,
    pub message: String,
}

/// Errors that can occur while taking a snapshot.
#[derive(thiserror::Error, Debug)]
pub enum WatchError {
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("failed to download {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("history error: {0}")]
    Persistence(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Convenience result type.
pub type WatchResult<T> = Result<T, WatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_url() {
        let err = WatchError::Download {
            url: "https://example.com/a.js".to_string(),
            reason: "HTTP 404".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to download https://example.com/a.js: HTTP 404"
        );
    }

    #[test]
    fn test_run_report_starts_empty() {
        let report = RunReport::new("20240101_000000");
        assert_eq!(report.scripts_found, 0);
        assert!(report.downloaded.is_empty());
        assert!(report.snapshot_path.is_none());
        assert!(!report.recorded);
    }
}
