//! Sequential script downloads.

use crate::acquisition::http_client::HttpClient;
use crate::types::{DownloadedAsset, WatchError, WatchResult};

/// What came back from downloading a list of scripts.
#[derive(Debug, Default)]
pub struct DownloadOutcome {
    /// Successful downloads, in the order the URLs were given.
    pub assets: Vec<DownloadedAsset>,
    /// URLs that failed and were left out.
    pub failed: Vec<String>,
}

/// Download one script with default headers.
pub async fn download_script(client: &HttpClient, url: &str) -> WatchResult<DownloadedAsset> {
    let resp = client.get(url, None).await.map_err(|e| WatchError::Download {
        url: url.to_string(),
        reason: format!("{e:#}"),
    })?;

    if !resp.is_success() {
        return Err(WatchError::Download {
            url: url.to_string(),
            reason: format!("HTTP {}", resp.status),
        });
    }

    Ok(DownloadedAsset::new(url, resp.body))
}

/// Download every URL one after another, skipping failures.
///
/// A failed URL is logged and recorded in [`DownloadOutcome::failed`]; it
/// never stops the remaining downloads.
pub async fn download_all<S: AsRef<str>>(client: &HttpClient, urls: &[S]) -> DownloadOutcome {
    let mut outcome = DownloadOutcome::default();

    for url in urls {
        let url = url.as_ref();
        match download_script(client, url).await {
            Ok(asset) => {
                tracing::debug!("downloaded {url} ({} bytes)", asset.body.len());
                outcome.assets.push(asset);
            }
            Err(e) => {
                tracing::warn!("{e}");
                outcome.failed.push(url.to_string());
            }
        }
    }

    outcome
}
