//! One snapshot run: fetch → extract → download → combine → persist.
//!
//! Every step catches its own failures, logs them and carries on, so
//! [`run_once`] always returns a report and never an error.

use std::path::PathBuf;

use chrono::NaiveDateTime;

use crate::acquisition::downloader::{download_all, DownloadOutcome};
use crate::acquisition::http_client::HttpClient;
use crate::acquisition::page::fetch_page;
use crate::acquisition::script_extractor::extract_script_urls;
use crate::config::WatchConfig;
use crate::history::{commit_message, HistorySink};
use crate::snapshot::{combine, format_timestamp, SnapshotStore};
use crate::types::RunReport;

/// Script URLs to download for this run.
///
/// A direct `.js` target is its own only script. Otherwise the page is
/// fetched and parsed; a failed fetch yields no URLs.
pub async fn discover_scripts(cfg: &WatchConfig, client: &HttpClient) -> Vec<String> {
    if cfg.is_direct_script() {
        return vec![cfg.base_url.clone()];
    }

    match fetch_page(client, &cfg.base_url, &cfg.user_agent).await {
        Ok(html) => extract_script_urls(&html, cfg.base_url_trimmed()),
        Err(e) => {
            tracing::error!("error fetching JS URLs: {e}");
            Vec::new()
        }
    }
}

/// Run the whole pipeline once, stamping the snapshot with `now`.
pub async fn run_once(
    cfg: &WatchConfig,
    client: &HttpClient,
    history: &dyn HistorySink,
    now: NaiveDateTime,
) -> RunReport {
    let timestamp = format_timestamp(now);
    let mut report = RunReport::new(&timestamp);
    tracing::info!("checking for updates at {}", now.format("%Y-%m-%d %H:%M:%S"));

    let urls = discover_scripts(cfg, client).await;
    report.scripts_found = urls.len();
    tracing::info!("found {} script(s) on {}", urls.len(), cfg.base_url);

    let DownloadOutcome { assets, failed } = download_all(client, &urls).await;
    report.downloaded = assets.iter().map(|a| a.url.clone()).collect();
    report.failed = failed;

    let blob = combine(&assets);
    if assets.is_empty() {
        tracing::warn!("no scripts downloaded, writing an empty snapshot");
    }

    let store = SnapshotStore::new(&cfg.output_dir, &cfg.file_prefix);
    let snapshot_path = match store.write(&blob, &timestamp) {
        Ok(path) => path,
        Err(e) => {
            tracing::error!("failed to write snapshot for {timestamp}: {e}");
            return report;
        }
    };
    report.snapshot_path = Some(snapshot_path.clone());

    let mut to_record: Vec<PathBuf> = vec![snapshot_path.clone()];
    match store.update_latest(&store.file_name(&timestamp)) {
        Ok(latest) => to_record.push(latest),
        Err(e) => tracing::error!("failed to update latest alias: {e}"),
    }

    if !history.enabled() {
        tracing::info!("saved snapshot (history disabled): {}", snapshot_path.display());
    } else if record(history, &to_record, &commit_message(&timestamp)).await {
        report.recorded = true;
        tracing::info!("saved and committed snapshot: {}", snapshot_path.display());
    } else {
        tracing::info!("saved snapshot (not committed): {}", snapshot_path.display());
    }

    tracing::info!(
        "run {} done: {} found, {} downloaded, {} failed",
        report.timestamp,
        report.scripts_found,
        report.downloaded.len(),
        report.failed.len()
    );
    report
}

async fn record(history: &dyn HistorySink, paths: &[PathBuf], message: &str) -> bool {
    let result = match history.ensure_initialized().await {
        Ok(()) => history.record(paths, message).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("error in git operations: {e}");
            false
        }
    }
}
