//! Error types for PacketForge

use thiserror::Error;

/// Result type alias for PacketForge operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed user input or a wizard step that is not reachable yet
    #[error("Validation error: {0}")]
    Validation(String),

    /// The server could not be reached
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Send error: {0}")]
    Send(String),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Error::Validation(msg.into())
    }

    pub fn connection<S: Into<String>>(msg: S) -> Self {
        Error::Connection(msg.into())
    }

    /// Message without the category prefix
    pub fn message(&self) -> String {
        match self {
            Error::Validation(msg)
            | Error::Connection(msg)
            | Error::Send(msg)
            | Error::Upload(msg)
            | Error::Config(msg) => msg.clone(),
            Error::Io(e) => e.to_string(),
            Error::Json(e) => e.to_string(),
        }
    }

    /// Whether the error came from user input rather than the backend
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}
