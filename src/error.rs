//! Error types for the Strader application.

use crate::form::FieldError;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Strader.
#[derive(Error, Debug)]
pub enum Error {
    /// IO errors (file operations, terminal, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Application settings errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A credential or ticker file could not be read or parsed.
    #[error("Failed to load '{}': {reason}", path.display())]
    CredentialFile { path: PathBuf, reason: String },

    /// The form did not pass validation.
    #[error("Invalid configuration: {}", summarize(.0))]
    Validation(Vec<FieldError>),

    /// Failure raised by the external trading engine, kept verbatim.
    #[error("{0}")]
    Engine(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Channel communication errors
    #[error("Channel error: {0}")]
    Channel(String),
}

/// Alias for Result with our Error type.
pub type Result<T> = std::result::Result<T, Error>;

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    /// Create a new config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new credential file error.
    pub fn credential_file(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::CredentialFile {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a new engine error.
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }

    /// Create a new channel error.
    pub fn channel(msg: impl Into<String>) -> Self {
        Self::Channel(msg.into())
    }

    /// Field errors carried by a validation failure, empty otherwise.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Validation(errors) => errors,
            _ => &[],
        }
    }

    /// Check if this error is recoverable (user can correct and retry).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::CredentialFile { .. } | Self::Channel(_)
        )
    }
}
