//! Core types for the relay.

use serde::{Deserialize, Serialize};

/// Model identifier used when nothing else has been chosen.
pub const DEFAULT_MODEL: &str = "deepseek";

/// Which backend answers forwarded chat text.
///
/// Kept in memory only: every process starts in [`Mode::Local`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Local executable, plain chat only
    #[default]
    Local,
    /// Remote chat-completion API with model selection and reset
    Remote,
}

impl Mode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            Self::Local => Self::Remote,
            Self::Remote => Self::Local,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

/// Persisted session record.
///
/// Field names match the on-disk JSON: `{"conversation_id": .., "model": ..}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionState {
    /// Conversation id returned by the remote backend
    pub conversation_id: Option<String>,
    /// Active model identifier
    #[serde(rename = "model")]
    pub active_model: String,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            conversation_id: None,
            active_model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl SessionState {
    pub fn new(conversation_id: Option<String>, active_model: impl Into<String>) -> Self {
        Self {
            conversation_id,
            active_model: active_model.into(),
        }
    }
}

/// One selectable model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelEntry {
    /// Label shown in the menu and typed by the user
    pub label: &'static str,
    /// Alternate label accepted on input
    pub alias: &'static str,
    /// Identifier sent to the backend
    pub id: &'static str,
}

const MODELS: &[ModelEntry] = &[
    ModelEntry {
        label: "Standard",
        alias: "普通",
        id: "deepseek",
    },
    ModelEntry {
        label: "Deep Thinking",
        alias: "深度思考",
        id: "deepseek-think",
    },
    ModelEntry {
        label: "Web Search",
        alias: "联网搜索",
        id: "deepseek-search",
    },
    ModelEntry {
        label: "Deep Thinking + Web Search",
        alias: "深度思考+联网搜索",
        id: "deepseek-think-search",
    },
];

/// Fixed, ordered catalog of selectable models.
#[derive(Debug, Clone, Copy)]
pub struct ModelCatalog {
    entries: &'static [ModelEntry],
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl ModelCatalog {
    /// The built-in catalog.
    pub fn standard() -> Self {
        Self { entries: MODELS }
    }

    pub fn entries(&self) -> &'static [ModelEntry] {
        self.entries
    }

    /// Identifier used after a reset.
    pub fn default_id(&self) -> &'static str {
        DEFAULT_MODEL
    }

    /// Exact lookup by label or alias.
    pub fn find_label(&self, text: &str) -> Option<&'static ModelEntry> {
        self.entries
            .iter()
            .find(|entry| entry.label == text || entry.alias == text)
    }

    /// Lookup by backend identifier.
    pub fn find_id(&self, id: &str) -> Option<&'static ModelEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.find_id(id).is_some()
    }

    /// Menu text, one `label: id` line per entry.
    pub fn menu(&self) -> String {
        self.entries
            .iter()
            .map(|entry| format!("{}: {}", entry.label, entry.id))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
