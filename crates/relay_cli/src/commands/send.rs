//! Send command - relay a single message.

use anyhow::Result;
use clap::Args;

use relay_chat::CallbackMessage;

use super::{start_mode, GlobalArgs};
use crate::console::ConsoleSink;

#[derive(Args)]
pub struct SendArgs {
    /// Message text (multiple words are joined with spaces)
    #[arg(required = true, num_args = 1..)]
    text: Vec<String>,

    /// Handle the message in remote mode
    #[arg(long)]
    remote: bool,
}

pub async fn execute(global: &GlobalArgs, args: SendArgs) -> Result<()> {
    let router = global.build_router(start_mode(args.remote))?;
    let sink = ConsoleSink::stdout();

    let message = CallbackMessage::text(args.text.join(" "));
    let ack = router.process(&message, &sink).await;

    if !ack.is_ok() {
        anyhow::bail!("Message failed: {}", ack.detail);
    }
    Ok(())
}
