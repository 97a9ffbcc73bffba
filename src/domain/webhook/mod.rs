//! Inbound webhook event model.
//!
//! LINE delivers a signed batch of events per webhook call. Shapes we do
//! not handle deserialize into `Unknown`/`Unsupported` variants so one odd
//! event never poisons its siblings.

mod signature;

pub use signature::{LineSignatureVerifier, SignatureError};

#[cfg(test)]
pub(crate) use signature::compute_test_signature;

use serde::Deserialize;

use crate::domain::registration::ProfileField;

/// The whole webhook body.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

/// One webhook event.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WebhookEvent {
    Message {
        #[serde(rename = "replyToken")]
        reply_token: String,
        source: EventSource,
        message: MessageContent,
    },
    Postback {
        #[serde(rename = "replyToken")]
        reply_token: String,
        source: EventSource,
        postback: PostbackContent,
    },
    Follow {
        #[serde(rename = "replyToken")]
        reply_token: String,
        source: EventSource,
    },
    Unfollow {
        source: EventSource,
    },
    /// Any event type we do not handle (join, beacon, ...).
    #[serde(other)]
    Unknown,
}

/// Who triggered the event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    #[serde(default)]
    pub user_id: Option<String>,
}

/// The message attached to a message event.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageContent {
    Text {
        text: String,
    },
    /// Stickers, images, audio - acknowledged but not processed.
    #[serde(other)]
    Unsupported,
}

/// The raw postback payload.
#[derive(Debug, Clone, Deserialize)]
pub struct PostbackContent {
    pub data: String,
}

/// A recognized postback action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostbackAction {
    Register,
    FeedbackMode,
    SubmitMode,
    Practice,
    MyProfile,
    EditProfile { field: ProfileField },
}

/// Parses a postback `data` string.
///
/// The payload is a `key=value` list joined with `&`; the `action` key
/// selects the handler and `field` qualifies `edit_profile`. Values are
/// not percent-decoded: the bot generates every postback payload itself
/// from a fixed alphabet. Unknown actions return `None` and are skipped.
pub fn parse_postback(data: &str) -> Option<PostbackAction> {
    let mut action = None;
    let mut field = None;

    for pair in data.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        match key {
            "action" => action = Some(value),
            "field" => field = Some(value),
            _ => {}
        }
    }

    match action? {
        "register" => Some(PostbackAction::Register),
        "feedback_mode" => Some(PostbackAction::FeedbackMode),
        "submit_mode" => Some(PostbackAction::SubmitMode),
        "practice" => Some(PostbackAction::Practice),
        "my_profile" => Some(PostbackAction::MyProfile),
        "edit_profile" => {
            let field = ProfileField::parse(field?)?;
            Some(PostbackAction::EditProfile { field })
        }
        _ => None,
    }
}
