//! Snapshot fetcher trait.
//!
//! Provides a trait-based abstraction over the quote source so the
//! scheduler can be driven by a scripted fetcher in tests.

use crate::error::{FetchError, FetchResult};
use parking_lot::Mutex;
use pricewatch_core::Snapshot;
use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Source of quote snapshots.
///
/// Implementations must return a snapshot covering every configured
/// symbol (unavailable quotes included) or fail as a whole.
pub trait SnapshotFetcher: Send + Sync {
    /// Fetch one snapshot.
    fn fetch(&self) -> BoxFuture<'_, FetchResult<Snapshot>>;

    /// Name for logs.
    fn name(&self) -> &str;
}

/// Scripted fetcher for testing.
///
/// Returns queued results in order; once the queue is drained, returns the
/// fallback snapshot if one is set, otherwise a `Malformed` error.
#[derive(Debug, Default)]
pub struct MockFetcher {
    script: Mutex<VecDeque<FetchResult<Snapshot>>>,
    fallback: Mutex<Option<Snapshot>>,
    delay: Mutex<Option<Duration>>,
    calls: AtomicUsize,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetcher that always returns `snapshot`.
    pub fn always(snapshot: Snapshot) -> Self {
        let fetcher = Self::new();
        fetcher.set_fallback(snapshot);
        fetcher
    }

    /// Queue a successful fetch.
    pub fn push_snapshot(&self, snapshot: Snapshot) {
        self.script.lock().push_back(Ok(snapshot));
    }

    /// Queue a failed fetch.
    pub fn push_error(&self, error: FetchError) {
        self.script.lock().push_back(Err(error));
    }

    pub fn set_fallback(&self, snapshot: Snapshot) {
        *self.fallback.lock() = Some(snapshot);
    }

    /// Sleep before answering, to exercise timeouts.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    /// Number of fetches performed.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_result(&self) -> FetchResult<Snapshot> {
        if let Some(result) = self.script.lock().pop_front() {
            return result;
        }
        self.fallback
            .lock()
            .clone()
            .ok_or_else(|| FetchError::Malformed("mock fetcher has no scripted response".to_string()))
    }
}

impl SnapshotFetcher for MockFetcher {
    fn fetch(&self) -> BoxFuture<'_, FetchResult<Snapshot>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let delay = *self.delay.lock();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            self.next_result()
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}
