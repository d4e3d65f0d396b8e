//! Building and persisting snapshot files.

pub mod combine;
pub mod store;

pub use combine::{combine, SEPARATOR_WIDTH};
pub use store::{format_timestamp, SnapshotStore, LATEST_ALIAS};
