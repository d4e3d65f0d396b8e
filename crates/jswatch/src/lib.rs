// Copyright 2026 jswatch contributors
// SPDX-License-Identifier: MIT

//! jswatch: snapshot every script a page loads and keep the history in git.
//!
//! A run fetches the target page, collects its `<script src>` URLs,
//! downloads them one by one, concatenates the bodies into a single
//! attributed file and commits that file. [`scheduler::Driver`] repeats the
//! run daily.

pub mod acquisition;
pub mod config;
pub mod history;
pub mod pipeline;
pub mod scheduler;
pub mod snapshot;
pub mod types;

pub use acquisition::http_client::HttpClient;
pub use config::WatchConfig;
pub use history::{GitHistory, HistorySink, NoopHistory};
pub use pipeline::run_once;
pub use scheduler::{Clock, DailyTrigger, Driver, DriverState, SystemClock};
pub use snapshot::SnapshotStore;
pub use types::*;
