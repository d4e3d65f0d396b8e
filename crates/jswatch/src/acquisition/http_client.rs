//! Async HTTP client wrapping reqwest.
//!
//! One request at a time, no retries. Redirects are followed; the timeout
//! is whatever the configuration says, which by default is none at all.

use anyhow::{Context, Result};
use std::time::Duration;

/// Response from an HTTP GET request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Original requested URL.
    pub url: String,
    /// Final URL after redirects.
    pub final_url: String,
    /// HTTP status code.
    pub status: u16,
    /// Response body as text (lossy for non-UTF-8 bodies).
    pub body: String,
}

impl HttpResponse {
    /// 2xx and 3xx count as success; redirects that were not followed
    /// still carry a body worth keeping.
    pub fn is_success(&self) -> bool {
        (200..400).contains(&self.status)
    }
}

/// HTTP client for page fetches and script downloads.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Create a client. `timeout` of `None` leaves requests unbounded.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder =
            reqwest::Client::builder().redirect(reqwest::redirect::Policy::limited(10));
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build().context("failed to build HTTP client")?;
        Ok(Self { client })
    }

    /// Perform a single GET request.
    ///
    /// `user_agent` is set only when given; script downloads pass `None`
    /// and go out with reqwest's default headers.
    pub async fn get(&self, url: &str, user_agent: Option<&str>) -> Result<HttpResponse> {
        let mut request = self.client.get(url);
        if let Some(ua) = user_agent {
            request = request.header(reqwest::header::USER_AGENT, ua);
        }

        let r = request
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;
        let status = r.status().as_u16();
        let final_url = r.url().to_string();
        let body = r
            .text()
            .await
            .with_context(|| format!("failed to read body of {url}"))?;

        Ok(HttpResponse {
            url: url.to_string(),
            final_url,
            status,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_client_creation() {
        assert!(HttpClient::new(None).is_ok());
        assert!(HttpClient::new(Some(Duration::from_millis(500))).is_ok());
    }

    #[test]
    fn test_success_range() {
        let mut resp = HttpResponse {
            url: "https://example.com".to_string(),
            final_url: "https://example.com/".to_string(),
            status: 200,
            body: String::new(),
        };
        assert!(resp.is_success());
        resp.status = 304;
        assert!(resp.is_success());
        resp.status = 404;
        assert!(!resp.is_success());
        resp.status = 503;
        assert!(!resp.is_success());
    }
}
