//! `git` command-line backend for snapshot history.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;

use crate::history::HistorySink;
use crate::types::{CommitInfo, WatchError, WatchResult};

/// Author used for snapshot commits unless overridden.
pub const DEFAULT_AUTHOR_NAME: &str = "jswatch";
pub const DEFAULT_AUTHOR_EMAIL: &str = "jswatch@localhost";

/// Field separator for `git log --format`.
const LOG_SEP: char = '\u{1f}';

/// Records snapshots as commits in a git working tree.
#[derive(Debug, Clone)]
pub struct GitHistory {
    repo_dir: PathBuf,
    author_name: String,
    author_email: String,
}

/// Whether a `git` executable is on `PATH`.
pub fn git_available() -> bool {
    which::which("git").is_ok()
}

impl GitHistory {
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            author_name: DEFAULT_AUTHOR_NAME.to_string(),
            author_email: DEFAULT_AUTHOR_EMAIL.to_string(),
        }
    }

    pub fn with_author(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.author_name = name.into();
        self.author_email = email.into();
        self
    }

    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    pub fn is_initialized(&self) -> bool {
        self.repo_dir.join(".git").exists()
    }

    /// Most recent commits first. A missing or empty repository has none.
    pub async fn log(&self, limit: usize) -> WatchResult<Vec<CommitInfo>> {
        if limit == 0 || !self.is_initialized() {
            return Ok(Vec::new());
        }
        if self.git(&["rev-parse", "--verify", "--quiet", "HEAD"]).await.is_err() {
            return Ok(Vec::new());
        }

        let format = format!("--format=%H{LOG_SEP}%aI{LOG_SEP}%s");
        let limit = format!("--max-count={limit}");
        let out = self.git(&["log", &format, &limit]).await?;
        Ok(parse_log(&out))
    }

    /// Run `git <args>` in the repository and return stdout.
    async fn git(&self, args: &[&str]) -> WatchResult<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_dir)
            .env("GIT_AUTHOR_NAME", &self.author_name)
            .env("GIT_AUTHOR_EMAIL", &self.author_email)
            .env("GIT_COMMITTER_NAME", &self.author_name)
            .env("GIT_COMMITTER_EMAIL", &self.author_email)
            .output()
            .await
            .map_err(|e| WatchError::Persistence(format!("failed to run git: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let detail = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(WatchError::Persistence(format!(
                "git {} exited with {}: {detail}",
                args.first().copied().unwrap_or_default(),
                output.status
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Express `path` relative to the repository when it lives inside it.
    fn pathspec(&self, path: &Path) -> String {
        let abs = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        let root = std::path::absolute(&self.repo_dir).unwrap_or_else(|_| self.repo_dir.clone());
        match abs.strip_prefix(&root) {
            Ok(rel) => rel.to_string_lossy().into_owned(),
            Err(_) => abs.to_string_lossy().into_owned(),
        }
    }
}

#[async_trait]
impl HistorySink for GitHistory {
    async fn ensure_initialized(&self) -> WatchResult<()> {
        if self.is_initialized() {
            return Ok(());
        }
        std::fs::create_dir_all(&self.repo_dir)?;
        self.git(&["init", "--quiet"]).await?;
        tracing::info!("initialized git repository in {}", self.repo_dir.display());
        Ok(())
    }

    async fn record(&self, paths: &[PathBuf], message: &str) -> WatchResult<()> {
        for path in paths {
            let spec = self.pathspec(path);
            self.git(&["add", "--", &spec]).await?;
        }
        self.git(&["commit", "--quiet", "-m", message]).await?;
        Ok(())
    }
}

fn parse_log(out: &str) -> Vec<CommitInfo> {
    out.lines()
        .filter_map(|line| {
            let mut parts = line.splitn(3, LOG_SEP);
            let hash = parts.next()?.trim();
            let date = chrono::DateTime::parse_from_rfc3339(parts.next()?.trim()).ok()?;
            let message = parts.next().unwrap_or_default().to_string();
            if hash.is_empty() {
                return None;
            }
            Some(CommitInfo {
                hash: hash.to_string(),
                date,
                message,
            })
        })
        .collect()
}
