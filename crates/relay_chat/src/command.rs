//! Command parsing.
//!
//! Every incoming message is parsed into a [`Command`] before routing. The
//! parse is pure and mode-independent; what a command means in each mode is
//! decided by the router.

use crate::types::ModelCatalog;

/// Literal that flips between the local and remote backend.
pub const TOGGLE_COMMANDS: &[&str] = &["switch AI", "切换AI"];

/// Literal that starts a new remote conversation.
pub const RESET_COMMANDS: &[&str] = &["reset", "重置"];

/// Prefix that asks for the model menu.
pub const MODEL_MENU_PREFIXES: &[&str] = &["switch model", "切换模型"];

/// A parsed incoming message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Flip the active backend
    ToggleMode,
    /// Clear the conversation and restore the default model
    Reset,
    /// Show the model menu
    ModelMenu,
    /// Text that exactly names a catalog model
    SelectModel {
        label: &'static str,
        id: &'static str,
    },
    /// Anything else, forwarded to a backend
    Chat(String),
}

impl Command {
    /// Parse raw message text. Surrounding whitespace is ignored.
    pub fn parse(text: &str, catalog: &ModelCatalog) -> Self {
        let text = text.trim();

        if TOGGLE_COMMANDS.contains(&text) {
            return Self::ToggleMode;
        }
        if RESET_COMMANDS.contains(&text) {
            return Self::Reset;
        }
        if MODEL_MENU_PREFIXES
            .iter()
            .any(|prefix| text.starts_with(prefix))
        {
            return Self::ModelMenu;
        }
        if let Some(entry) = catalog.find_label(text) {
            return Self::SelectModel {
                label: entry.label,
                id: entry.id,
            };
        }

        Self::Chat(text.to_string())
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ToggleMode => "toggle-mode",
            Self::Reset => "reset",
            Self::ModelMenu => "model-menu",
            Self::SelectModel { .. } => "select-model",
            Self::Chat(_) => "chat",
        }
    }
}
