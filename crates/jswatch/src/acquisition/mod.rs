//! Page fetch, script discovery and script download.
//!
//! Everything here talks HTTP through [`http_client::HttpClient`] and runs
//! strictly one request after another.

pub mod downloader;
pub mod http_client;
pub mod page;
pub mod script_extractor;
