//! Command router.
//!
//! This module is the main entry point for message handling, coordinating
//! between the command parser, the session store and the two backends.
//!
//! Routing, per message:
//!
//! | Command        | Local mode            | Remote mode                         |
//! |----------------|-----------------------|-------------------------------------|
//! | `ToggleMode`   | switch to remote      | switch to local                     |
//! | `Reset`        | rejected              | clear conversation, default model   |
//! | `ModelMenu`    | rejected              | list catalog                        |
//! | `SelectModel`  | forwarded as text     | set active model                    |
//! | `Chat`         | local backend         | remote backend, keep conversation id|

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::backend::{LocalBackend, RemoteBackend};
use crate::command::Command;
use crate::error::ChatResult;
use crate::persistence::SessionStore;
use crate::transport::{Ack, CallbackMessage, ReplySink};
use crate::types::{Mode, ModelCatalog, SessionState};

/// Reply after switching to the remote backend.
pub const SWITCHED_TO_REMOTE_REPLY: &str =
    "AI switched to the remote backend. Reset and model switching are now available.";

/// Reply after switching back to the local backend.
pub const SWITCHED_TO_LOCAL_REPLY: &str =
    "AI switched back to the local backend. Only basic chat is supported; reset and model switching are unavailable.";

/// Reply to reset or model commands while in local mode.
pub const LOCAL_UNSUPPORTED_REPLY: &str =
    "The local backend does not support reset or model switching.";

/// Which branch of the router produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Mode flipped; carries the new mode
    ModeSwitched(Mode),
    /// Command not available in the current mode
    Rejected,
    /// Conversation cleared
    Reset,
    /// Model menu shown
    ModelMenu,
    /// Active model changed
    ModelSelected,
    /// Answered by the local backend
    Local,
    /// Answered by the remote backend
    Remote,
}

/// Reply text for the user plus the route that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub route: Route,
}

impl Reply {
    fn new(text: impl Into<String>, route: Route) -> Self {
        Self {
            text: text.into(),
            route,
        }
    }
}

struct RouterState {
    mode: Mode,
    session: SessionState,
}

/// Routes messages between the two backends and owns the session state.
///
/// The state lock is only held while reading or persisting state, never
/// across a backend call. Two chat messages in flight at once may both start
/// from the same conversation id; the later response wins.
pub struct RelayRouter {
    state: Mutex<RouterState>,
    store: Arc<dyn SessionStore>,
    local: Arc<dyn LocalBackend>,
    remote: Arc<dyn RemoteBackend>,
    catalog: ModelCatalog,
}

impl RelayRouter {
    /// Create a router, loading the persisted session once.
    ///
    /// A stored model that is not in the catalog resets the record to
    /// defaults.
    pub fn new(
        store: Arc<dyn SessionStore>,
        local: Arc<dyn LocalBackend>,
        remote: Arc<dyn RemoteBackend>,
    ) -> ChatResult<Self> {
        let catalog = ModelCatalog::standard();

        let mut session = store.load()?;
        if !catalog.contains_id(&session.active_model) {
            warn!(
                "Stored model '{}' is not in the catalog, using defaults",
                session.active_model
            );
            session = SessionState::default();
        }
        info!(
            "Loaded session: model={}, conversation={:?}",
            session.active_model, session.conversation_id
        );

        Ok(Self {
            state: Mutex::new(RouterState {
                mode: Mode::default(),
                session,
            }),
            store,
            local,
            remote,
            catalog,
        })
    }

    /// Start in a specific mode instead of the default.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.state.get_mut().mode = mode;
        self
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    /// Current mode.
    pub async fn mode(&self) -> Mode {
        self.state.lock().await.mode
    }

    /// Snapshot of the in-memory session record.
    pub async fn session(&self) -> SessionState {
        self.state.lock().await.session.clone()
    }

    /// Transport entry point.
    ///
    /// Reply text goes through `sink`; the returned [`Ack`] reports whether
    /// the event was handled. Errors never reach the user as reply text.
    pub async fn process(&self, message: &CallbackMessage, sink: &dyn ReplySink) -> Ack {
        info!("Received message: {}", message.text.trim());

        match self.dispatch(message, sink).await {
            Ok(()) => Ack::ok(),
            Err(e) => {
                error!("Error processing message: {}", e);
                Ack::failed(format!("Error: {}", e))
            }
        }
    }

    async fn dispatch(&self, message: &CallbackMessage, sink: &dyn ReplySink) -> ChatResult<()> {
        let reply = self.handle(&message.text).await?;
        debug!("Replying via {:?}", reply.route);
        sink.reply_text(&reply.text, message).await
    }

    /// Handle one message and produce the reply text.
    pub async fn handle(&self, text: &str) -> ChatResult<Reply> {
        let command = Command::parse(text, &self.catalog);
        let mode = self.mode().await;
        debug!("Parsed '{}' in {} mode", command.name(), mode);

        match (mode, command) {
            (_, Command::ToggleMode) => Ok(self.toggle_mode().await),

            (Mode::Local, Command::Reset | Command::ModelMenu) => {
                Ok(Reply::new(LOCAL_UNSUPPORTED_REPLY, Route::Rejected))
            }
            // Forwarded as typed, so an alias stays an alias.
            (Mode::Local, Command::SelectModel { .. }) => self.ask_local(text.trim()).await,
            (Mode::Local, Command::Chat(text)) => self.ask_local(&text).await,

            (Mode::Remote, Command::Reset) => self.reset().await,
            (Mode::Remote, Command::ModelMenu) => Ok(Reply::new(
                format!("Choose a model to switch to:\n{}", self.catalog.menu()),
                Route::ModelMenu,
            )),
            (Mode::Remote, Command::SelectModel { label, id }) => {
                self.select_model(label, id).await
            }
            (Mode::Remote, Command::Chat(text)) => self.ask_remote(text).await,
        }
    }

    async fn toggle_mode(&self) -> Reply {
        let mut state = self.state.lock().await;
        state.mode = state.mode.toggled();
        info!("Switched to {} mode", state.mode);

        let text = match state.mode {
            Mode::Remote => SWITCHED_TO_REMOTE_REPLY,
            Mode::Local => SWITCHED_TO_LOCAL_REPLY,
        };
        Reply::new(text, Route::ModeSwitched(state.mode))
    }

    async fn reset(&self) -> ChatResult<Reply> {
        let default_id = self.catalog.default_id();
        let mut state = self.state.lock().await;

        self.store.save(None, default_id)?;
        state.session = SessionState::new(None, default_id);
        info!("Session reset, model={}", default_id);

        let label = self
            .catalog
            .find_id(default_id)
            .map(|entry| entry.label)
            .unwrap_or(default_id);
        Ok(Reply::new(
            format!("Started a new conversation; model reset to the default ({}).", label),
            Route::Reset,
        ))
    }

    async fn select_model(&self, label: &str, id: &str) -> ChatResult<Reply> {
        let mut state = self.state.lock().await;

        self.store
            .save(state.session.conversation_id.as_deref(), id)?;
        state.session.active_model = id.to_string();
        info!("Active model set to {}", id);

        Ok(Reply::new(
            format!("Model switched, current model: {}", label),
            Route::ModelSelected,
        ))
    }

    async fn ask_local(&self, text: &str) -> ChatResult<Reply> {
        let local = Arc::clone(&self.local);
        let message = text.to_string();

        let reply = tokio::task::spawn_blocking(move || local.run(&message)).await?;
        info!("Local backend reply: {}", reply);

        Ok(Reply::new(reply, Route::Local))
    }

    async fn ask_remote(&self, text: String) -> ChatResult<Reply> {
        let (model, conversation_id) = {
            let state = self.state.lock().await;
            (
                state.session.active_model.clone(),
                state.session.conversation_id.clone(),
            )
        };

        let remote = Arc::clone(&self.remote);
        let reply = tokio::task::spawn_blocking(move || {
            remote.run(&text, &model, conversation_id.as_deref())
        })
        .await?;

        if let Some(new_id) = reply.conversation_id.as_deref() {
            let mut state = self.state.lock().await;
            self.store.save(Some(new_id), &state.session.active_model)?;
            state.session.conversation_id = Some(new_id.to_string());
            debug!("Conversation id now {}", new_id);
        }
        info!("Remote backend reply: {}", reply.text);

        Ok(Reply::new(reply.text, Route::Remote))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockLocalBackend, MockRemoteBackend};
    use crate::persistence::MemoryStore;

    fn router(store: MemoryStore) -> RelayRouter {
        RelayRouter::new(
            Arc::new(store),
            Arc::new(MockLocalBackend::new()),
            Arc::new(MockRemoteBackend::new()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_starts_in_local_mode() {
        let router = router(MemoryStore::new());
        assert_eq!(router.mode().await, Mode::Local);
    }

    #[tokio::test]
    async fn test_unknown_stored_model_falls_back_to_default() {
        let store = MemoryStore::with_state(SessionState::new(Some("c".to_string()), "gpt-4"));
        let router = router(store);

        assert_eq!(router.session().await, SessionState::default());
    }

    #[tokio::test]
    async fn test_with_mode() {
        let router = router(MemoryStore::new()).with_mode(Mode::Remote);
        assert_eq!(router.mode().await, Mode::Remote);
    }
}
