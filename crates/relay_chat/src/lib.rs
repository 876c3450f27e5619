//! # relay_chat - Message routing for chat-relay
//!
//! This crate turns incoming chat events into replies:
//! - Parses each message into a closed [`Command`] set
//! - Routes chat text to a local executable or a remote chat-completion API
//!   depending on the current [`Mode`]
//! - Persists the active model and conversation id between runs
//! - Separates the reply sent to the user from the acknowledgement sent to
//!   the transport
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌──────────────────┐
//! │    Transport    │────▶│   RelayRouter   │────▶│   SessionStore   │
//! └─────────────────┘     └────────┬────────┘     └──────────────────┘
//!                                  │ spawn_blocking
//!                   ┌──────────────┴──────────────┐
//!                   ▼                             ▼
//!         ┌──────────────────┐          ┌──────────────────┐
//!         │   LocalBackend   │          │  RemoteBackend   │
//!         │  (process run)   │          │  (HTTP POST)     │
//!         └──────────────────┘          └──────────────────┘
//! ```

pub mod backend;
pub mod command;
pub mod config;
pub mod error;
pub mod llm;
pub mod mock;
pub mod persistence;
pub mod session;
pub mod transport;
pub mod types;

pub use backend::*;
pub use command::*;
pub use config::*;
pub use error::*;
pub use llm::*;
pub use mock::*;
pub use persistence::*;
pub use session::*;
pub use transport::*;
pub use types::*;
