//! Inbound Slack Events API envelope and the event shapes the relay acts on.

use serde::Deserialize;
use serde_json::Value;

use crate::{AppError, Result};

/// Outer JSON body of an Events API delivery.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct EventEnvelope {
    /// `url_verification` or `event_callback`.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Handshake token echoed back during URL verification.
    #[serde(default)]
    pub challenge: Option<String>,
    /// Unique delivery identifier.
    #[serde(default)]
    pub event_id: Option<String>,
    /// Unix seconds at which the event was dispatched.
    #[serde(default)]
    pub event_time: Option<i64>,
    /// Inner event, decoded lazily by [`EventEnvelope::classify`].
    #[serde(default)]
    pub event: Option<Value>,
}

impl EventEnvelope {
    /// Decode an envelope from a raw request body.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Parse` if the body is not a JSON object.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Whether this delivery is the endpoint-ownership handshake.
    #[must_use]
    pub fn is_url_verification(&self) -> bool {
        self.kind.as_deref() == Some("url_verification")
    }

    /// The `type` tag of the inner event, if any.
    #[must_use]
    pub fn event_type(&self) -> Option<&str> {
        self.event
            .as_ref()
            .and_then(|event| event.get("type"))
            .and_then(Value::as_str)
    }

    /// Decode the inner event into a [`SlackEvent`].
    ///
    /// Unknown event types map to [`SlackEvent::Unsupported`].
    ///
    /// # Errors
    ///
    /// Returns `AppError::Parse` when the envelope carries no event or the
    /// event body does not match its declared type.
    pub fn classify(&self) -> Result<SlackEvent> {
        let event = self
            .event
            .as_ref()
            .ok_or_else(|| AppError::Parse("envelope carries no event".into()))?;
        SlackEvent::deserialize(event).map_err(|err| {
            AppError::Parse(format!(
                "malformed {} event: {err}",
                self.event_type().unwrap_or("untyped")
            ))
        })
    }
}

/// Events the dispatcher routes, discriminated by `event.type`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlackEvent {
    /// A new member joined the workspace.
    TeamJoin {
        /// The member who joined.
        user: JoinedUser,
    },
    /// A user reacted to an item.
    ReactionAdded {
        /// Reacting user.
        user: String,
        /// Item that received the reaction.
        item: ReactionItem,
    },
    /// A user pinned an item.
    PinAdded {
        /// Pinning user.
        user: String,
        /// Channel the item was pinned in.
        channel_id: String,
    },
    /// A message was posted.
    Message(MessageEvent),
    /// Any other event type.
    #[serde(other)]
    Unsupported,
}

/// User object carried by `team_join`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct JoinedUser {
    /// Slack user id.
    pub id: String,
}

/// Target of a `reaction_added` event.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
pub struct ReactionItem {
    /// Channel of the reacted message; absent for file reactions.
    #[serde(default)]
    pub channel: Option<String>,
}

/// Body of a `message` event.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
pub struct MessageEvent {
    /// Conversation the message was posted in.
    #[serde(default)]
    pub channel: Option<String>,
    /// Author, absent for some bot messages.
    #[serde(default)]
    pub user: Option<String>,
    /// Message text.
    #[serde(default)]
    pub text: Option<String>,
    /// Legacy secondary attachments (crash reporters post these).
    #[serde(default)]
    pub attachments: Option<Vec<Attachment>>,
}

/// Legacy Slack message attachment.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
pub struct Attachment {
    /// Plain-text summary of the attachment.
    #[serde(default)]
    pub fallback: Option<String>,
    /// Titled key/value fields.
    #[serde(default)]
    pub fields: Option<Vec<AttachmentField>>,
}

/// A single titled field inside an [`Attachment`].
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
pub struct AttachmentField {
    /// Field title, e.g. `Platform`.
    #[serde(default)]
    pub title: Option<String>,
    /// Field value.
    #[serde(default)]
    pub value: Option<String>,
}
