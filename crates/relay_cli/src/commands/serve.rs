//! Serve command - relay stdin lines until EOF or Ctrl-C.

use anyhow::Result;
use clap::Args;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

use relay_chat::{RelayRouter, ReplySink};

use super::{start_mode, GlobalArgs};
use crate::console::{message_from_line, ConsoleSink};

#[derive(Args)]
pub struct ServeArgs {
    /// Start in remote mode instead of local
    #[arg(long)]
    remote: bool,

    /// Sender name attached to every message
    #[arg(long, env = "USER", default_value = "console")]
    sender: String,
}

pub async fn execute(global: &GlobalArgs, args: ServeArgs) -> Result<()> {
    let router = global.build_router(start_mode(args.remote))?;
    let sink = ConsoleSink::stdout();

    info!(
        "Relay ready in {} mode; one message per line, Ctrl-D to stop",
        router.mode().await
    );

    let input = tokio::io::BufReader::new(tokio::io::stdin());
    tokio::select! {
        handled = relay_lines(&router, input, &sink, &args.sender) => {
            info!("Input closed after {} message(s)", handled?);
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, stopping");
        }
    }

    Ok(())
}

/// Relay every non-blank line of `input` in order. Each message is answered
/// before the next line is read, so `switch AI` followed by chat text always
/// reaches the new backend. Returns how many messages were handled.
pub async fn relay_lines<R>(
    router: &RelayRouter,
    input: R,
    sink: &dyn ReplySink,
    sender: &str,
) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut handled = 0;

    while let Some(line) = lines.next_line().await? {
        let Some(message) = message_from_line(&line, sender) else {
            continue;
        };

        let ack = router.process(&message, sink).await;
        if !ack.is_ok() {
            warn!("Message not acknowledged: {}", ack.detail);
        }
        handled += 1;
    }

    Ok(handled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use relay_chat::{MemoryStore, MockLocalBackend, MockRemoteBackend, RemoteReply};

    #[tokio::test]
    async fn test_lines_are_relayed_in_order() {
        let local = MockLocalBackend::new();
        let remote = MockRemoteBackend::new().add_response(RemoteReply::new("from remote", None));
        let router = RelayRouter::new(
            Arc::new(MemoryStore::new()),
            Arc::new(local.clone()),
            Arc::new(remote.clone()),
        )
        .unwrap();
        let sink = ConsoleSink::new(Vec::<u8>::new());

        let input: &[u8] = b"switch AI\n\n   \nhello\n";
        let handled = relay_lines(&router, input, &sink, "tester").await.unwrap();

        assert_eq!(handled, 2);
        assert_eq!(local.call_count(), 0);
        assert_eq!(remote.calls()[0].message, "hello");

        let written = String::from_utf8(sink.into_inner()).unwrap();
        let switched = written.find("remote backend").unwrap();
        let answered = written.find("> from remote").unwrap();
        assert!(switched < answered);
    }
}
