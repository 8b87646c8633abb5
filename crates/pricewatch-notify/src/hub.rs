//! Fan-out across channels.

use crate::dispatcher::{DynDispatcher, RenderedMessage};
use crate::error::DispatchError;
use futures_util::future::join_all;
use pricewatch_scheduler::Audience;
use tracing::{debug, warn};

/// Result of one channel's attempt.
#[derive(Debug, Clone)]
pub struct ChannelOutcome {
    pub channel: String,
    pub result: Result<(), DispatchError>,
}

impl ChannelOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-channel results for one message.
#[derive(Debug, Clone, Default)]
pub struct DeliveryReport {
    pub outcomes: Vec<ChannelOutcome>,
}

impl DeliveryReport {
    /// No channel was addressed.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn delivered_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.delivered_count()
    }

    pub fn all_delivered(&self) -> bool {
        self.outcomes.iter().all(ChannelOutcome::is_ok)
    }
}

/// Routes messages to every channel of the matching audience.
#[derive(Default)]
pub struct ChannelHub {
    channels: Vec<(Audience, DynDispatcher)>,
}

impl ChannelHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_channel(&mut self, audience: Audience, dispatcher: DynDispatcher) {
        self.channels.push((audience, dispatcher));
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn channels_for(&self, audience: Audience) -> usize {
        self.channels.iter().filter(|(a, _)| *a == audience).count()
    }

    /// Send `message` to every matching channel concurrently.
    ///
    /// Waits for all of them; one channel's failure never affects another.
    pub async fn deliver(&self, message: &RenderedMessage) -> DeliveryReport {
        let targets: Vec<&DynDispatcher> = self
            .channels
            .iter()
            .filter(|(audience, _)| *audience == message.audience)
            .map(|(_, d)| d)
            .collect();

        if targets.is_empty() {
            debug!(kind = %message.kind, audience = ?message.audience, "No channel for audience");
            return DeliveryReport::default();
        }

        let sends = targets.iter().map(|dispatcher| async move {
            let result = dispatcher.send(message).await;
            if let Err(e) = &result {
                warn!(channel = dispatcher.name(), kind = %message.kind, error = %e, "Delivery failed");
            }
            ChannelOutcome {
                channel: dispatcher.name().to_string(),
                result,
            }
        });

        DeliveryReport {
            outcomes: join_all(sends).await,
        }
    }
}
