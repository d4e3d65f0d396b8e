//! Snapshot files on disk and the `latest.js` alias.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::types::WatchResult;

/// Name of the alias that always points at the newest snapshot.
pub const LATEST_ALIAS: &str = "latest.js";

/// Second-resolution stamp used in file names and commit messages.
pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format("%Y%m%d_%H%M%S").to_string()
}

/// Writes timestamped snapshot files into one output directory.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    output_dir: PathBuf,
    file_prefix: String,
}

impl SnapshotStore {
    pub fn new(output_dir: impl Into<PathBuf>, file_prefix: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            file_prefix: file_prefix.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// `<prefix><timestamp>.js`
    pub fn file_name(&self, timestamp: &str) -> String {
        format!("{}{timestamp}.js", self.file_prefix)
    }

    pub fn snapshot_path(&self, timestamp: &str) -> PathBuf {
        self.output_dir.join(self.file_name(timestamp))
    }

    pub fn latest_path(&self) -> PathBuf {
        self.output_dir.join(LATEST_ALIAS)
    }

    /// Create the output directory if it does not exist yet.
    pub fn ensure_dir(&self) -> WatchResult<()> {
        std::fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }

    /// Write `blob` as the snapshot for `timestamp`, replacing any file of
    /// the same name, and return its path.
    pub fn write(&self, blob: &str, timestamp: &str) -> WatchResult<PathBuf> {
        self.ensure_dir()?;
        let path = self.snapshot_path(timestamp);
        std::fs::write(&path, blob)?;
        Ok(path)
    }

    /// Point `latest.js` at `file_name` (a name inside the output dir).
    ///
    /// The new alias is created under a temporary name and renamed over
    /// the old one, so readers see either the old or the new target.
    pub fn update_latest(&self, file_name: &str) -> WatchResult<PathBuf> {
        self.ensure_dir()?;
        let latest = self.latest_path();
        let tmp = self
            .output_dir
            .join(format!(".{LATEST_ALIAS}.tmp-{}", std::process::id()));

        if tmp.symlink_metadata().is_ok() {
            std::fs::remove_file(&tmp)?;
        }
        link_alias(&self.output_dir, file_name, &tmp)?;
        if let Err(e) = std::fs::rename(&tmp, &latest) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(latest)
    }

    /// File name `latest.js` currently resolves to, if any.
    pub fn latest_target(&self) -> Option<String> {
        alias_target(&self.output_dir, &self.file_prefix)
    }
}

#[cfg(unix)]
fn link_alias(_dir: &Path, file_name: &str, at: &Path) -> std::io::Result<()> {
    // Relative target: resolved against the alias's own directory.
    std::os::unix::fs::symlink(file_name, at)
}

#[cfg(not(unix))]
fn link_alias(dir: &Path, file_name: &str, at: &Path) -> std::io::Result<()> {
    std::fs::copy(dir.join(file_name), at).map(|_| ())
}

#[cfg(unix)]
fn alias_target(dir: &Path, _prefix: &str) -> Option<String> {
    std::fs::read_link(dir.join(LATEST_ALIAS))
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
}

#[cfg(not(unix))]
fn alias_target(dir: &Path, prefix: &str) -> Option<String> {
    // The alias is a copy; pick the newest snapshot with identical content.
    let content = std::fs::read(dir.join(LATEST_ALIAS)).ok()?;
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.starts_with(prefix))
        .collect();
    names.sort();
    names.into_iter().rev().find(|n| match std::fs::read(dir.join(n)) {
        Ok(bytes) => bytes == content,
        Err(_) => false,
    })
}
