//! Remote chat-completion adapter.
//!
//! Talks to an OpenAI-style `/v1/chat/completions` endpoint that also
//! understands a `conversation_id` field for multi-turn context.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::backend::{RemoteBackend, RemoteReply};

/// Reply when the request fails or the service answers with an error status.
pub const REMOTE_FAILURE_REPLY: &str = "Request failed, please try again later.";

/// Reply when the service answers 200 without any choices.
pub const REMOTE_EMPTY_REPLY: &str = "Something went wrong, please try again later.";

/// Default endpoint for a locally hosted completion service.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/v1/chat/completions";

/// Default request timeout in seconds.
pub const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 120;

/// Remote backend that POSTs one user message per call.
#[derive(Debug, Clone)]
pub struct RemoteChatAdapter {
    endpoint: String,
    auth_token: String,
    timeout: Duration,
}

impl Default for RemoteChatAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT, "")
    }
}

impl RemoteChatAdapter {
    /// Create an adapter. An empty token sends no `Authorization` header.
    pub fn new(endpoint: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            auth_token: auth_token.into(),
            timeout: Duration::from_secs(DEFAULT_REMOTE_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Build the JSON request body.
    pub fn build_request<'a>(
        message: &'a str,
        model: &'a str,
        conversation_id: Option<&'a str>,
    ) -> ChatRequest<'a> {
        ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: message,
            }],
            stream: false,
            conversation_id,
        }
    }

    fn send(&self, request: &ChatRequest<'_>) -> reqwest::Result<(u16, String)> {
        // A blocking client owns a runtime thread; building it per call keeps
        // its whole lifetime on the worker thread.
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;

        let mut builder = client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(request);
        if !self.auth_token.is_empty() {
            builder = builder.header("Authorization", format!("Bearer {}", self.auth_token));
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok((status, body))
    }
}

impl RemoteBackend for RemoteChatAdapter {
    fn run(&self, message: &str, model: &str, conversation_id: Option<&str>) -> RemoteReply {
        let request = Self::build_request(message, model, conversation_id);
        debug!(
            "Sending chat request to {}: model={}, conversation={:?}",
            self.endpoint, model, conversation_id
        );

        match self.send(&request) {
            Ok((status, body)) => {
                let reply = interpret_response(status, &body);
                info!("Remote reply ({}): {}", status, reply.text);
                reply
            }
            Err(e) => {
                error!("Remote chat request failed: {}", e);
                RemoteReply::failure(REMOTE_FAILURE_REPLY)
            }
        }
    }
}

/// Turn a raw HTTP status and body into a reply.
///
/// Only a 200 carrying `choices[0].message.content` yields real text; the
/// top-level `id` becomes the next conversation id.
pub fn interpret_response(status: u16, body: &str) -> RemoteReply {
    if status != 200 {
        error!("Remote chat request failed with status code: {}", status);
        return RemoteReply::failure(REMOTE_FAILURE_REPLY);
    }

    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => {
            error!("Remote chat response is not JSON: {}", e);
            return RemoteReply::failure(REMOTE_FAILURE_REPLY);
        }
    };

    let first = match value
        .get("choices")
        .and_then(|choices| choices.as_array())
        .and_then(|choices| choices.first())
    {
        Some(choice) => choice,
        None => {
            error!("Remote chat response missing 'choices' or empty");
            return RemoteReply::failure(REMOTE_EMPTY_REPLY);
        }
    };

    let Some(content) = first
        .pointer("/message/content")
        .and_then(|content| content.as_str())
    else {
        error!("Remote chat response has no message content");
        return RemoteReply::failure(REMOTE_FAILURE_REPLY);
    };

    let conversation_id = value
        .get("id")
        .and_then(|id| id.as_str())
        .filter(|id| !id.is_empty())
        .map(str::to_string);

    RemoteReply::new(content, conversation_id)
}

/// Request body for the completion endpoint.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}
