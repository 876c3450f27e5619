//! Console transport.
//!
//! Stand-in for a chat platform connection: each stdin line is one message
//! and replies are written to stdout.

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use relay_chat::{CallbackMessage, ChatError, ChatResult, ReplySink, SenderContext};

/// Conversation name attached to console messages.
pub const CONSOLE_CONVERSATION: &str = "console";

/// Turn one input line into a message, skipping blank lines.
pub fn message_from_line(line: &str, sender: &str) -> Option<CallbackMessage> {
    if line.trim().is_empty() {
        return None;
    }
    Some(CallbackMessage::new(
        line,
        SenderContext::new(CONSOLE_CONVERSATION, sender),
    ))
}

/// Prefix every reply line with `> `.
pub fn format_reply(text: &str) -> String {
    if text.is_empty() {
        return ">\n".to_string();
    }
    text.lines().map(|line| format!("> {}\n", line)).collect()
}

/// Writes replies to an async writer, one reply at a time.
pub struct ConsoleSink<W> {
    out: Mutex<W>,
}

impl ConsoleSink<tokio::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

#[async_trait]
impl<W> ReplySink for ConsoleSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn reply_text(&self, text: &str, _to: &CallbackMessage) -> ChatResult<()> {
        let mut out = self.out.lock().await;
        out.write_all(format_reply(text).as_bytes())
            .await
            .map_err(|e| ChatError::TransportError(e.to_string()))?;
        out.flush()
            .await
            .map_err(|e| ChatError::TransportError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_from_line() {
        assert!(message_from_line("   ", "me").is_none());

        let message = message_from_line("hello", "me").unwrap();
        assert_eq!(message.text, "hello");
        assert_eq!(message.sender.sender.as_deref(), Some("me"));
        assert_eq!(message.sender.conversation.as_deref(), Some("console"));
    }

    #[test]
    fn test_format_reply() {
        assert_eq!(format_reply("hi"), "> hi\n");
        assert_eq!(format_reply("a\nb"), "> a\n> b\n");
        assert_eq!(format_reply(""), ">\n");
    }

    #[tokio::test]
    async fn test_sink_writes_formatted_reply() {
        let sink = ConsoleSink::new(Vec::<u8>::new());

        sink.reply_text("Choose:\nStandard: deepseek", &CallbackMessage::text("switch model"))
            .await
            .unwrap();

        let written = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(written, "> Choose:\n> Standard: deepseek\n");
    }
}
