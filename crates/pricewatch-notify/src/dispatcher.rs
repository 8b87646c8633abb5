//! Dispatcher trait for outbound channels.
//!
//! Provides a trait-based abstraction over the chat transport so the
//! fan-out and the tick loop can be tested without network access.

use crate::error::{DispatchError, DispatchResult};
use parking_lot::Mutex;
use pricewatch_scheduler::{Audience, NoticeKind};
use std::pin::Pin;
use std::sync::Arc;
use tracing::info;

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// A notice rendered to text, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub kind: NoticeKind,
    pub audience: Audience,
    pub text: String,
}

/// One outbound channel.
///
/// At most one attempt per call; retry policy, if any, belongs to the
/// implementation.
pub trait Dispatcher: Send + Sync {
    /// Channel name for logs, metrics and the journal.
    fn name(&self) -> &str;

    /// Send a message.
    fn send<'a>(&'a self, message: &'a RenderedMessage) -> BoxFuture<'a, DispatchResult<()>>;
}

/// Arc wrapper for Dispatcher trait objects.
pub type DynDispatcher = Arc<dyn Dispatcher>;

/// Dispatcher that writes messages to the log instead of sending them.
#[derive(Debug, Clone)]
pub struct LogDispatcher {
    name: String,
}

impl LogDispatcher {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Dispatcher for LogDispatcher {
    fn name(&self) -> &str {
        &self.name
    }

    fn send<'a>(&'a self, message: &'a RenderedMessage) -> BoxFuture<'a, DispatchResult<()>> {
        Box::pin(async move {
            info!(
                channel = %self.name,
                kind = %message.kind,
                text = %message.text,
                "Dry run, message not sent"
            );
            Ok(())
        })
    }
}

/// Mock dispatcher for testing.
#[derive(Debug)]
pub struct MockDispatcher {
    name: String,
    /// Recorded sends for verification.
    sends: Mutex<Vec<RenderedMessage>>,
    /// Error to return instead of succeeding.
    failure: Mutex<Option<DispatchError>>,
}

impl MockDispatcher {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sends: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
        }
    }

    /// Fail every subsequent send with `error`, or succeed again with `None`.
    pub fn set_failure(&self, error: Option<DispatchError>) {
        *self.failure.lock() = error;
    }

    /// Get recorded sends, failed attempts included.
    pub fn get_sends(&self) -> Vec<RenderedMessage> {
        self.sends.lock().clone()
    }
}

impl Dispatcher for MockDispatcher {
    fn name(&self) -> &str {
        &self.name
    }

    fn send<'a>(&'a self, message: &'a RenderedMessage) -> BoxFuture<'a, DispatchResult<()>> {
        Box::pin(async move {
            self.sends.lock().push(message.clone());
            let failure = self.failure.lock().clone();
            match failure {
                Some(error) => Err(error),
                None => Ok(()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> RenderedMessage {
        RenderedMessage {
            kind: NoticeKind::SessionOpen,
            audience: Audience::Subscribers,
            text: "open".to_string(),
        }
    }

    #[tokio::test]
    async fn test_mock_dispatcher_records_sends() {
        let dispatcher = MockDispatcher::new("mock");
        assert!(dispatcher.send(&message()).await.is_ok());
        assert_eq!(dispatcher.get_sends(), vec![message()]);
    }

    #[tokio::test]
    async fn test_mock_dispatcher_failure() {
        let dispatcher = MockDispatcher::new("mock");
        dispatcher.set_failure(Some(DispatchError::Rejected("chat not found".to_string())));
        assert!(matches!(
            dispatcher.send(&message()).await,
            Err(DispatchError::Rejected(_))
        ));
        // attempts are still recorded
        assert_eq!(dispatcher.get_sends().len(), 1);
    }

    #[tokio::test]
    async fn test_log_dispatcher_always_succeeds() {
        let dispatcher = LogDispatcher::new("dry-run");
        assert_eq!(dispatcher.name(), "dry-run");
        assert!(dispatcher.send(&message()).await.is_ok());
    }
}
