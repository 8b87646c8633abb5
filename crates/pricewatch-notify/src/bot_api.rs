//! Bot API dispatcher (Telegram and Bale).

use crate::config::ChannelConfig;
use crate::dispatcher::{BoxFuture, Dispatcher, RenderedMessage};
use crate::error::{DispatchError, DispatchResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Request body for `sendMessage`.
#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Response envelope shared by every Bot API method.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Sends messages through a Bot API `sendMessage` endpoint.
pub struct BotApiDispatcher {
    name: String,
    client: Client,
    /// `{base_url}/bot{token}/sendMessage`. Never logged.
    endpoint: String,
    chat_id: String,
}

impl BotApiDispatcher {
    /// Create a dispatcher from channel configuration.
    pub fn new(config: &ChannelConfig) -> DispatchResult<Self> {
        config.validate().map_err(DispatchError::Config)?;

        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| DispatchError::Http(format!("Failed to create HTTP client: {e}")))?;

        info!(
            channel = %config.name,
            kind = ?config.kind,
            host = %config.base_url(),
            audience = ?config.audience,
            "Bot API channel created"
        );

        Ok(Self {
            name: config.name.clone(),
            client,
            endpoint: format!("{}/bot{}/sendMessage", config.base_url(), config.token),
            chat_id: config.chat_id.clone(),
        })
    }

    async fn send_message(&self, text: &str) -> DispatchResult<()> {
        let request = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            // without_url keeps the bot token out of logs
            .map_err(|e| DispatchError::Http(format!("HTTP request failed: {}", e.without_url())))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let parsed: Option<ApiResponse> = serde_json::from_str(&body).ok();

        if !status.is_success() {
            let description = parsed
                .and_then(|r| r.description)
                .unwrap_or(body);
            return Err(DispatchError::Status {
                status: status.as_u16(),
                description,
            });
        }

        match parsed {
            Some(ApiResponse { ok: true, .. }) => {
                debug!(channel = %self.name, "Message delivered");
                Ok(())
            }
            Some(ApiResponse { description, .. }) => Err(DispatchError::Rejected(
                description.unwrap_or_else(|| "ok=false".to_string()),
            )),
            None => Err(DispatchError::Rejected(format!(
                "unexpected response body: {body}"
            ))),
        }
    }
}

impl Dispatcher for BotApiDispatcher {
    fn name(&self) -> &str {
        &self.name
    }

    fn send<'a>(&'a self, message: &'a RenderedMessage) -> BoxFuture<'a, DispatchResult<()>> {
        Box::pin(self.send_message(&message.text))
    }
}
