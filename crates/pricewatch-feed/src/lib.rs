//! Quote snapshot fetching.
//!
//! - `SnapshotFetcher`: the boundary the scheduler consumes
//! - `BrsApiClient`: HTTP adapter for the BrsApi gold/currency endpoint
//! - `parser`: normalization of the raw response into a complete `Snapshot`
//! - `MockFetcher`: scripted fetcher for tests and dry runs

pub mod client;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod parser;

pub use client::BrsApiClient;
pub use config::FeedConfig;
pub use error::{FetchError, FetchResult};
pub use fetcher::{BoxFuture, MockFetcher, SnapshotFetcher};
