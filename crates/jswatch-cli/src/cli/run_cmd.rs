//! `run` and `once`: take snapshots.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Notify;

use jswatch::{Clock, Driver, HttpClient, SystemClock};

use super::ConfigOverrides;

/// Snapshot now, then daily until Ctrl-C.
pub async fn run(overrides: &ConfigOverrides) -> Result<()> {
    let cfg = overrides.resolve()?;
    let client = HttpClient::new(cfg.request_timeout)?;
    let history = overrides.history(&cfg);
    let driver = Driver::new(cfg, client, history, SystemClock);

    let shutdown = Arc::new(Notify::new());
    let signal = Arc::clone(&shutdown);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("received Ctrl-C");
            // notify_one stores a permit if no one is waiting yet.
            signal.notify_one();
        }
    });

    driver.run_forever(shutdown).await;
    Ok(())
}

/// Take one snapshot and print what happened.
pub async fn run_once(overrides: &ConfigOverrides, json: bool) -> Result<()> {
    let cfg = overrides.resolve()?;
    let client = HttpClient::new(cfg.request_timeout)?;
    let history = overrides.history(&cfg);

    let report = jswatch::run_once(&cfg, &client, history.as_ref(), SystemClock.now()).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("  Snapshot {}", report.timestamp);
    println!("  Scripts found:  {}", report.scripts_found);
    println!("  Downloaded:     {}", report.downloaded.len());
    for url in &report.failed {
        println!("  Failed:         {url}");
    }
    match &report.snapshot_path {
        Some(path) => println!("  Written to:     {}", path.display()),
        None => println!("  Written to:     (write failed)"),
    }
    let committed = if !history.enabled() {
        "no (disabled)"
    } else if report.recorded {
        "yes"
    } else {
        "no"
    };
    println!("  Committed:      {committed}");
    Ok(())
}
