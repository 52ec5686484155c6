// models/src/errors.rs

use thiserror::Error;

pub type HmsResult<T> = Result<T, HmsError>;

/// Coarse failure classes, mirroring the variants of [`HmsError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Client-detected before any network call; blocks submission.
    Validation,
    /// Gateway-reported credential or session failure.
    Auth,
    /// Gateway-reported CRUD failure or unusable payload.
    DataAccess,
    /// Transport-level failure reaching the Gateway.
    Network,
    /// Unusable application configuration.
    Config,
    /// Local durable storage failure (remembered credentials).
    Storage,
}

/// Every failure in the application carries its class plus a
/// human-readable message; nothing here is fatal to the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HmsError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Authentication error: {0}")]
    Auth(String),
    #[error("Data access error: {0}")]
    DataAccess(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

impl HmsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HmsError::Validation(_) => ErrorKind::Validation,
            HmsError::Auth(_) => ErrorKind::Auth,
            HmsError::DataAccess(_) => ErrorKind::DataAccess,
            HmsError::Network(_) => ErrorKind::Network,
            HmsError::Config(_) => ErrorKind::Config,
            HmsError::Storage(_) => ErrorKind::Storage,
        }
    }

    /// The message without the class prefix, as shown inline in the UI.
    pub fn message(&self) -> &str {
        match self {
            HmsError::Validation(msg)
            | HmsError::Auth(msg)
            | HmsError::DataAccess(msg)
            | HmsError::Network(msg)
            | HmsError::Config(msg)
            | HmsError::Storage(msg) => msg,
        }
    }
}

impl From<serde_json::Error> for HmsError {
    fn from(err: serde_json::Error) -> Self {
        HmsError::DataAccess(format!("JSON processing error: {}", err))
    }
}
