//! Transport boundary.
//!
//! A transport delivers [`CallbackMessage`]s and expects two things back:
//! reply text sent to the original sender through a [`ReplySink`], and an
//! [`Ack`] for the event itself.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ChatResult;

/// Opaque sender metadata, passed through untouched to the reply.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SenderContext {
    /// Conversation or chat the message arrived in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation: Option<String>,
    /// Who sent it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    /// Anything else the transport needs to route the reply
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub extra: serde_json::Value,
}

impl SenderContext {
    pub fn new(conversation: impl Into<String>, sender: impl Into<String>) -> Self {
        Self {
            conversation: Some(conversation.into()),
            sender: Some(sender.into()),
            extra: serde_json::Value::Null,
        }
    }
}

/// One inbound chat event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CallbackMessage {
    pub text: String,
    #[serde(default)]
    pub sender: SenderContext,
}

impl CallbackMessage {
    pub fn new(text: impl Into<String>, sender: SenderContext) -> Self {
        Self {
            text: text.into(),
            sender,
        }
    }

    /// Message with empty sender metadata.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(text, SenderContext::default())
    }
}

/// Acknowledgement status returned to the transport.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum AckStatus {
    Ok,
    Failed,
}

/// Acknowledgement for one processed event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ack {
    pub status: AckStatus,
    pub detail: String,
}

impl Ack {
    pub fn ok() -> Self {
        Self {
            status: AckStatus::Ok,
            detail: "OK".to_string(),
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            status: AckStatus::Failed,
            detail: detail.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == AckStatus::Ok
    }
}

/// Sends reply text back to whoever sent a message.
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn reply_text(&self, text: &str, to: &CallbackMessage) -> ChatResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ack_constructors() {
        assert!(Ack::ok().is_ok());
        assert_eq!(Ack::ok().detail, "OK");

        let failed = Ack::failed("Error: boom");
        assert!(!failed.is_ok());
        assert_eq!(failed.status, AckStatus::Failed);
    }

    #[test]
    fn test_callback_message_from_json() {
        let message: CallbackMessage = serde_json::from_str(
            r#"{"text": "hi", "sender": {"conversation": "c", "sender": "u", "extra": {"k": 1}}}"#,
        )
        .unwrap();

        assert_eq!(message.text, "hi");
        assert_eq!(message.sender.sender.as_deref(), Some("u"));
        assert_eq!(message.sender.extra["k"], 1);

        let bare: CallbackMessage = serde_json::from_str(r#"{"text": "hi"}"#).unwrap();
        assert_eq!(bare, CallbackMessage::text("hi"));
    }

    #[test]
    fn test_ack_status_serialization() {
        assert_eq!(serde_json::to_string(&AckStatus::Failed).unwrap(), "\"FAILED\"");
    }
}
