//! Inbound webhook payloads.
//!
//! Only the fields needed to answer a text message are modelled; everything
//! else in the Bot API `Update` object is ignored.

use serde::Deserialize;

use crate::errors::TrackerError;

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub edited_message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

/// A text message the bot should answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub chat_id: i64,
    pub text: String,
}

impl Update {
    /// The text message carried by this update, if any. Edited messages are
    /// answered like new ones.
    #[must_use]
    pub fn into_inbound(self) -> Option<InboundMessage> {
        let message = self.message.or(self.edited_message)?;
        let text = message.text.filter(|t| !t.trim().is_empty())?;
        Some(InboundMessage {
            chat_id: message.chat.id,
            text,
        })
    }
}

/// # Errors
///
/// Returns `TrackerError::ParseError` if the body is not a Bot API update.
pub fn parse_update(body: &str) -> Result<Update, TrackerError> {
    serde_json::from_str(body)
        .map_err(|e| TrackerError::ParseError(format!("Invalid Telegram update: {}", e)))
}
