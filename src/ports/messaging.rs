//! Messaging Gateway Port - outbound chat delivery.
//!
//! Replies are bound to the triggering event's one-shot reply token; any
//! further messages for the same event (badge notifications) must go
//! through the push channel addressed by user identity.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::foundation::LineUserId;

/// A message the bot sends.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    /// Plain text.
    Text(String),
    /// Text with tappable quick-reply options.
    TextWithQuickReply {
        text: String,
        options: Vec<QuickReplyOption>,
    },
    /// A flex bubble; `contents` is the platform-native payload.
    Flex { alt_text: String, contents: Value },
}

impl OutboundMessage {
    /// Creates a plain text message.
    pub fn text(text: impl Into<String>) -> Self {
        OutboundMessage::Text(text.into())
    }

    /// Creates a text message with quick-reply options.
    pub fn quick_reply(text: impl Into<String>, options: Vec<QuickReplyOption>) -> Self {
        OutboundMessage::TextWithQuickReply {
            text: text.into(),
            options,
        }
    }

    /// Creates a flex message.
    pub fn flex(alt_text: impl Into<String>, contents: Value) -> Self {
        OutboundMessage::Flex {
            alt_text: alt_text.into(),
            contents,
        }
    }
}

/// One tappable option; tapping sends `text` back as a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickReplyOption {
    pub label: String,
    pub text: String,
}

impl QuickReplyOption {
    /// Creates a quick-reply option.
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

/// Messaging delivery errors.
#[derive(Debug, thiserror::Error)]
pub enum MessagingError {
    /// Network error while reaching the platform.
    #[error("network error: {0}")]
    Network(String),

    /// The platform rejected the call.
    #[error("messaging API error {status}: {body}")]
    Api { status: u16, body: String },
}

/// Port for delivering reply and push messages.
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    /// Sends messages bound to a reply token. The token is usable once.
    async fn reply(
        &self,
        reply_token: &str,
        messages: Vec<OutboundMessage>,
    ) -> Result<(), MessagingError>;

    /// Pushes messages to a user outside a reply context.
    async fn push(
        &self,
        to: &LineUserId,
        messages: Vec<OutboundMessage>,
    ) -> Result<(), MessagingError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_build_expected_variants() {
        let msg = OutboundMessage::text("สวัสดี");
        assert_eq!(msg, OutboundMessage::Text("สวัสดี".to_string()));

        let msg = OutboundMessage::quick_reply(
            "เลือก",
            vec![QuickReplyOption::new("Beginner", "BEGINNER")],
        );
        match msg {
            OutboundMessage::TextWithQuickReply { text, options } => {
                assert_eq!(text, "เลือก");
                assert_eq!(options.len(), 1);
                assert_eq!(options[0].text, "BEGINNER");
            }
            _ => panic!("expected quick reply"),
        }
    }
}
