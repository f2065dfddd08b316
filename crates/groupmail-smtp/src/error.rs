//! Error types for SMTP sessions.

use std::io;

/// Result type alias for SMTP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures raised while talking to an SMTP server.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error on the underlying socket.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// TLS configuration or handshake error.
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    /// The server answered with a non-success reply.
    #[error("server replied {code}: {message}")]
    Rejected {
        /// Reply code (e.g. 550).
        code: u16,
        /// Reply text from the server.
        message: String,
    },

    /// The server sent something that is not a valid SMTP reply.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Envelope address failed validation.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// A required extension is not advertised by the server.
    #[error("server does not support {0}")]
    NotSupported(&'static str),
}

impl Error {
    /// Creates a rejection error from a reply code and text.
    #[must_use]
    pub fn rejected(code: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            code,
            message: message.into(),
        }
    }

    /// Returns true for permanent (5xx) rejections.
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        matches!(self, Self::Rejected { code, .. } if *code >= 500 && *code < 600)
    }
}
