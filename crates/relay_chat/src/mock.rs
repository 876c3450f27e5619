//! Test doubles for the backends and the transport.
//!
//! Both mock backends return queued responses in order and capture every
//! call for verification. Once the queue runs dry they fall back to a
//! default reply.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::backend::{LocalBackend, RemoteBackend, RemoteReply};
use crate::error::{ChatError, ChatResult};
use crate::transport::{CallbackMessage, ReplySink};

/// Captured remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCall {
    pub message: String,
    pub model: String,
    pub conversation_id: Option<String>,
}

/// Mock local backend.
#[derive(Clone, Default)]
pub struct MockLocalBackend {
    responses: Arc<RwLock<VecDeque<String>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockLocalBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for the next call.
    pub fn add_response(self, reply: impl Into<String>) -> Self {
        self.responses.write().push_back(reply.into());
        self
    }

    /// Messages received so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().len()
    }
}

impl LocalBackend for MockLocalBackend {
    fn run(&self, message: &str) -> String {
        self.calls.write().push(message.to_string());
        self.responses
            .write()
            .pop_front()
            .unwrap_or_else(|| format!("local: {}", message))
    }
}

/// Mock remote backend.
#[derive(Clone, Default)]
pub struct MockRemoteBackend {
    responses: Arc<RwLock<VecDeque<RemoteReply>>>,
    calls: Arc<RwLock<Vec<RemoteCall>>>,
}

impl MockRemoteBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for the next call.
    pub fn add_response(self, reply: RemoteReply) -> Self {
        self.responses.write().push_back(reply);
        self
    }

    /// Calls received so far.
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.read().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().len()
    }
}

impl RemoteBackend for MockRemoteBackend {
    fn run(&self, message: &str, model: &str, conversation_id: Option<&str>) -> RemoteReply {
        self.calls.write().push(RemoteCall {
            message: message.to_string(),
            model: model.to_string(),
            conversation_id: conversation_id.map(str::to_string),
        });
        self.responses
            .write()
            .pop_front()
            .unwrap_or_else(|| RemoteReply::failure(format!("remote: {}", message)))
    }
}

/// Reply sink that records what would have been sent.
#[derive(Clone, Default)]
pub struct RecordingSink {
    replies: Arc<RwLock<Vec<(String, CallbackMessage)>>>,
    fail_with: Arc<RwLock<Option<String>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every delivery fail with a transport error.
    pub fn failing(self, reason: impl Into<String>) -> Self {
        *self.fail_with.write() = Some(reason.into());
        self
    }

    /// Reply texts sent so far.
    pub fn texts(&self) -> Vec<String> {
        self.replies.read().iter().map(|(text, _)| text.clone()).collect()
    }

    /// Reply texts together with the message each one answered.
    pub fn replies(&self) -> Vec<(String, CallbackMessage)> {
        self.replies.read().clone()
    }
}

#[async_trait]
impl ReplySink for RecordingSink {
    async fn reply_text(&self, text: &str, to: &CallbackMessage) -> ChatResult<()> {
        if let Some(reason) = self.fail_with.read().clone() {
            return Err(ChatError::TransportError(reason));
        }
        self.replies.write().push((text.to_string(), to.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_local_queue_then_default() {
        let backend = MockLocalBackend::new().add_response("first");

        assert_eq!(backend.run("a"), "first");
        assert_eq!(backend.run("b"), "local: b");
        assert_eq!(backend.calls(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_mock_remote_captures_calls() {
        let backend = MockRemoteBackend::new()
            .add_response(RemoteReply::new("hi", Some("c1".to_string())));

        let reply = backend.run("hello", "deepseek", None);
        assert_eq!(reply.conversation_id.as_deref(), Some("c1"));

        backend.run("again", "deepseek", Some("c1"));
        let calls = backend.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].conversation_id.as_deref(), Some("c1"));
    }
}
