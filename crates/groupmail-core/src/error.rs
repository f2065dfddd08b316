//! Error types for the core library.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ValidationError;

/// Errors that stop a run before any group is reviewed.
#[derive(Debug, Error)]
pub enum Error {
    /// A recipient row names a department no department row registered.
    #[error("recipient {recipient} references unknown department {code}")]
    UnknownDepartment {
        /// Department code from the recipient row.
        code: String,
        /// Full name from the recipient row.
        recipient: String,
    },

    /// The attachment directory could not be listed.
    #[error("cannot read attachment directory {}: {source}", .path.display())]
    AttachmentSourceUnreadable {
        /// Directory that failed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The roster file could not be read or parsed.
    #[error("cannot load roster {}: {reason}", .path.display())]
    Roster {
        /// Roster file.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// Configuration file could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Settings parsed but failed validation.
    #[error("invalid settings: {}", describe(.0))]
    InvalidSettings(Vec<ValidationError>),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

fn describe(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("{} ({})", e.message(), e.field()))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
