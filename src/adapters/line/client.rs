//! LINE Messaging API client.
//!
//! Translates [`OutboundMessage`] values into the platform wire format
//! and delivers them through the reply and push endpoints.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::LineConfig;
use crate::domain::foundation::LineUserId;
use crate::ports::{MessagingError, MessagingGateway, OutboundMessage};

/// Messaging gateway backed by the LINE Messaging API.
pub struct LineMessagingClient {
    config: LineConfig,
    client: Client,
}

impl LineMessagingClient {
    /// Creates a client from the channel configuration.
    pub fn new(config: LineConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base, path)
    }

    async fn post(&self, path: &str, body: Value) -> Result<(), MessagingError> {
        let response = self
            .client
            .post(self.endpoint(path))
            .bearer_auth(self.config.channel_access_token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| MessagingError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MessagingError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

/// Converts an outbound message into the platform message object.
fn to_wire(message: &OutboundMessage) -> Value {
    match message {
        OutboundMessage::Text(text) => json!({ "type": "text", "text": text }),
        OutboundMessage::TextWithQuickReply { text, options } => json!({
            "type": "text",
            "text": text,
            "quickReply": {
                "items": options
                    .iter()
                    .map(|option| json!({
                        "type": "action",
                        "action": {
                            "type": "message",
                            "label": option.label,
                            "text": option.text,
                        }
                    }))
                    .collect::<Vec<_>>()
            }
        }),
        OutboundMessage::Flex { alt_text, contents } => json!({
            "type": "flex",
            "altText": alt_text,
            "contents": contents,
        }),
    }
}

#[async_trait]
impl MessagingGateway for LineMessagingClient {
    async fn reply(
        &self,
        reply_token: &str,
        messages: Vec<OutboundMessage>,
    ) -> Result<(), MessagingError> {
        let body = json!({
            "replyToken": reply_token,
            "messages": messages.iter().map(to_wire).collect::<Vec<_>>(),
        });
        self.post("/v2/bot/message/reply", body).await
    }

    async fn push(
        &self,
        to: &LineUserId,
        messages: Vec<OutboundMessage>,
    ) -> Result<(), MessagingError> {
        let body = json!({
            "to": to.as_str(),
            "messages": messages.iter().map(to_wire).collect::<Vec<_>>(),
        });
        self.post("/v2/bot/message/push", body).await
    }
}
