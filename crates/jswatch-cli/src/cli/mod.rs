//! CLI subcommand implementations for the jswatch binary.

pub mod doctor;
pub mod history_cmd;
pub mod run_cmd;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use jswatch::config::parse_daily_at;
use jswatch::{GitHistory, HistorySink, NoopHistory, WatchConfig};

/// Flags that override `JSWATCH_*` variables and built-in defaults.
#[derive(Args, Debug, Default, Clone)]
pub struct ConfigOverrides {
    /// Page to snapshot (a URL ending in .js is downloaded directly)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Directory for snapshot files and latest.js
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Git working tree that records snapshots
    #[arg(long, global = true)]
    pub repo_dir: Option<PathBuf>,

    /// Daily run time, HH:MM local time
    #[arg(long, global = true)]
    pub at: Option<String>,

    /// Seconds between schedule checks
    #[arg(long, global = true)]
    pub poll_secs: Option<u64>,

    /// Per-request timeout in milliseconds (0 disables)
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Write snapshots without committing them
    #[arg(long, global = true)]
    pub no_commit: bool,
}

impl ConfigOverrides {
    /// Environment + defaults, then these flags, then validation.
    pub fn resolve(&self) -> Result<WatchConfig> {
        let cfg = WatchConfig::from_env().context("invalid JSWATCH_* environment")?;
        self.apply(cfg)
    }

    fn apply(&self, mut cfg: WatchConfig) -> Result<WatchConfig> {
        if let Some(url) = &self.url {
            cfg.base_url = url.clone();
        }
        if let Some(dir) = &self.output_dir {
            cfg.output_dir = dir.clone();
        }
        if let Some(dir) = &self.repo_dir {
            cfg.repo_dir = dir.clone();
        }
        if let Some(at) = &self.at {
            cfg.daily_at = parse_daily_at(at)?;
        }
        if let Some(secs) = self.poll_secs {
            cfg.poll_interval = Duration::from_secs(secs);
        }
        if let Some(ms) = self.timeout_ms {
            cfg.request_timeout = (ms > 0).then(|| Duration::from_millis(ms));
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// History sink for this configuration.
    pub fn history(&self, cfg: &WatchConfig) -> Box<dyn HistorySink> {
        if self.no_commit {
            Box::new(NoopHistory)
        } else {
            Box::new(GitHistory::new(&cfg.repo_dir))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn test_flags_override_config() {
        let overrides = ConfigOverrides {
            url: Some("https://example.com".into()),
            output_dir: Some(PathBuf::from("/tmp/snaps")),
            at: Some("03:15".into()),
            poll_secs: Some(10),
            timeout_ms: Some(0),
            ..ConfigOverrides::default()
        };
        let base = WatchConfig {
            request_timeout: Some(Duration::from_secs(1)),
            ..WatchConfig::default()
        };
        let cfg = overrides.apply(base).unwrap();
        assert_eq!(cfg.base_url, "https://example.com");
        assert_eq!(cfg.output_dir, PathBuf::from("/tmp/snaps"));
        assert_eq!(cfg.daily_at, NaiveTime::from_hms_opt(3, 15, 0).unwrap());
        assert_eq!(cfg.poll_interval, Duration::from_secs(10));
        assert!(cfg.request_timeout.is_none());
    }

    #[test]
    fn test_no_flags_keep_defaults() {
        let cfg = ConfigOverrides::default()
            .apply(WatchConfig::default())
            .unwrap();
        assert_eq!(cfg.base_url, jswatch::config::DEFAULT_BASE_URL);
    }

    #[test]
    fn test_invalid_flags_rejected() {
        let bad_url = ConfigOverrides {
            url: Some("nope".into()),
            ..ConfigOverrides::default()
        };
        assert!(bad_url.apply(WatchConfig::default()).is_err());

        let zero_poll = ConfigOverrides {
            poll_secs: Some(0),
            ..ConfigOverrides::default()
        };
        assert!(zero_poll.apply(WatchConfig::default()).is_err());
    }
}
