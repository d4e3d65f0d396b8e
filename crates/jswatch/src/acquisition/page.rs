//! Fetch the target page's HTML.

use crate::acquisition::http_client::HttpClient;
use crate::types::{WatchError, WatchResult};

/// GET `url` with a browser `User-Agent` and return the body.
///
/// Transport errors and 4xx/5xx statuses both come back as
/// [`WatchError::Fetch`]; callers decide what an empty page means.
pub async fn fetch_page(client: &HttpClient, url: &str, user_agent: &str) -> WatchResult<String> {
    let resp = client
        .get(url, Some(user_agent))
        .await
        .map_err(|e| WatchError::Fetch {
            url: url.to_string(),
            reason: format!("{e:#}"),
        })?;

    if !resp.is_success() {
        return Err(WatchError::Fetch {
            url: url.to_string(),
            reason: format!("HTTP {}", resp.status),
        });
    }

    tracing::debug!(
        "fetched {} ({} bytes, final URL {})",
        url,
        resp.body.len(),
        resp.final_url
    );
    Ok(resp.body)
}
