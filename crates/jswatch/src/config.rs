//! Run configuration and its resolution from the environment.

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveTime;

use crate::types::{WatchError, WatchResult};

pub const DEFAULT_BASE_URL: &str = "https://www.starbucks.com.tr";
pub const DEFAULT_OUTPUT_DIR: &str = "js_snapshots";
pub const DEFAULT_FILE_PREFIX: &str = "starbucks_js_";
pub const DEFAULT_POLL_SECS: u64 = 60;

/// Sent only with the page fetch; script downloads use client defaults.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                                      AppleWebKit/537.36 (KHTML, like Gecko) \
                                      Chrome/91.0.4472.124 Safari/537.36";

/// Immutable configuration for the snapshot pipeline and its driver.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Page whose `<script src>` tags are snapshotted.
    pub base_url: String,
    /// Directory holding snapshot files and `latest.js`.
    pub output_dir: PathBuf,
    /// Root of the git working tree that records snapshots.
    pub repo_dir: PathBuf,
    /// File name prefix; the timestamp and `.js` follow it.
    pub file_prefix: String,
    /// Local wall-clock time of the daily run.
    pub daily_at: NaiveTime,
    /// How often the driver checks whether the daily run is due.
    pub poll_interval: Duration,
    /// Per-request timeout. `None` leaves requests unbounded.
    pub request_timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            repo_dir: PathBuf::from("."),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            daily_at: NaiveTime::MIN,
            poll_interval: Duration::from_secs(DEFAULT_POLL_SECS),
            request_timeout: None,
            user_agent: BROWSER_USER_AGENT.to_string(),
        }
    }
}

impl WatchConfig {
    /// Defaults overridden by `JSWATCH_*` environment variables.
    pub fn from_env() -> WatchResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`WatchConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> WatchResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut cfg = Self::default();
        if let Some(url) = read("JSWATCH_URL") {
            cfg.base_url = url;
        }
        if let Some(dir) = read("JSWATCH_OUTPUT_DIR") {
            cfg.output_dir = PathBuf::from(dir);
        }
        if let Some(dir) = read("JSWATCH_REPO_DIR") {
            cfg.repo_dir = PathBuf::from(dir);
        }
        if let Some(prefix) = read("JSWATCH_FILE_PREFIX") {
            cfg.file_prefix = prefix;
        }
        if let Some(at) = read("JSWATCH_DAILY_AT") {
            cfg.daily_at = parse_daily_at(&at)?;
        }
        if let Some(secs) = read("JSWATCH_POLL_SECS") {
            cfg.poll_interval = Duration::from_secs(parse_u64("JSWATCH_POLL_SECS", &secs)?.max(1));
        }
        if let Some(ms) = read("JSWATCH_TIMEOUT_MS") {
            let ms = parse_u64("JSWATCH_TIMEOUT_MS", &ms)?;
            cfg.request_timeout = (ms > 0).then(|| Duration::from_millis(ms));
        }
        Ok(cfg)
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> WatchResult<()> {
        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| WatchError::Config(format!("base URL {:?}: {e}", self.base_url)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(WatchError::Config(format!(
                "base URL must be http(s), got {:?}",
                self.base_url
            )));
        }
        if self.file_prefix.contains('/') || self.file_prefix.contains('\\') {
            return Err(WatchError::Config(format!(
                "file prefix must not contain path separators: {:?}",
                self.file_prefix
            )));
        }
        if self.poll_interval.is_zero() {
            return Err(WatchError::Config("poll interval must be non-zero".into()));
        }
        Ok(())
    }

    /// Base URL without a trailing slash, the form normalization prefixes.
    pub fn base_url_trimmed(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Whether the target is itself a script rather than an HTML page.
    pub fn is_direct_script(&self) -> bool {
        url::Url::parse(&self.base_url)
            .map(|u| u.path().to_ascii_lowercase().ends_with(".js"))
            .unwrap_or(false)
    }
}

/// Parse a `HH:MM` daily trigger time.
pub fn parse_daily_at(raw: &str) -> WatchResult<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|e| WatchError::Config(format!("daily time {raw:?} is not HH:MM: {e}")))
}

fn parse_u64(name: &str, raw: &str) -> WatchResult<u64> {
    raw.parse::<u64>()
        .map_err(|e| WatchError::Config(format!("{name}={raw:?} is not a whole number: {e}")))
}
