//! State command - show the persisted session.

use anyhow::{Context, Result};
use clap::Args;

use relay_chat::{ModelCatalog, SessionStore};

use super::GlobalArgs;

#[derive(Args)]
pub struct StateArgs {
    /// Print the raw JSON record
    #[arg(long)]
    json: bool,
}

pub async fn execute(global: &GlobalArgs, args: StateArgs) -> Result<()> {
    let config = global.load_config()?;
    let store = config.session_store();
    let state = store
        .load()
        .with_context(|| format!("Failed to read {}", store.path().display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&state)?);
        return Ok(());
    }

    let catalog = ModelCatalog::standard();
    let label = catalog
        .find_id(&state.active_model)
        .map(|entry| entry.label)
        .unwrap_or("unknown");

    println!("State file:   {}", store.path().display());
    println!("Model:        {} ({})", state.active_model, label);
    println!(
        "Conversation: {}",
        state.conversation_id.as_deref().unwrap_or("(none)")
    );
    Ok(())
}
