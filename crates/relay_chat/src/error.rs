//! Error types for the relay.

use std::fmt;

/// Relay errors.
///
/// Adapter failures never show up here: backends turn them into reply text.
/// These are the failures that end in a failed acknowledgement.
#[derive(Debug)]
pub enum ChatError {
    /// File system error
    IoError(std::io::Error),
    /// Serialization error
    SerializationError(String),
    /// Configuration could not be loaded
    ConfigError(String),
    /// A blocking backend call did not complete
    WorkerError(String),
    /// The transport could not deliver a reply
    TransportError(String),
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "I/O error: {}", e),
            Self::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            Self::WorkerError(msg) => write!(f, "Worker error: {}", msg),
            Self::TransportError(msg) => write!(f, "Transport error: {}", msg),
        }
    }
}

impl std::error::Error for ChatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ChatError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err)
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<toml::de::Error> for ChatError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigError(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ChatError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::WorkerError(err.to_string())
    }
}

/// Result type for relay operations
pub type ChatResult<T> = Result<T, ChatError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display() {
        let err = ChatError::TransportError("socket closed".to_string());
        assert_eq!(err.to_string(), "Transport error: socket closed");

        let err = ChatError::ConfigError("bad key".to_string());
        assert_eq!(err.to_string(), "Configuration error: bad key");
    }

    #[test]
    fn test_io_source() {
        let err: ChatError = std::io::Error::new(std::io::ErrorKind::Other, "disk").into();
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("I/O error"));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ChatError = json_err.into();
        assert!(matches!(err, ChatError::SerializationError(_)));
    }
}
