//! The sender boundary used by the review workflow.

use std::path::PathBuf;

/// Separator between addresses in [`GroupMessage::to`] and [`GroupMessage::cc`].
pub const ADDRESS_DELIMITER: char = ',';

/// One message for one group, as confirmed by the operator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroupMessage {
    /// Primary recipients, comma-delimited.
    pub to: String,
    /// Copied recipients, comma-delimited.
    pub cc: String,
    /// Subject line.
    pub subject: String,
    /// Plain text body.
    pub body: String,
    /// Files to attach.
    pub attachments: Vec<PathBuf>,
}

impl GroupMessage {
    /// Individual `to` addresses, blanks dropped.
    pub fn to_addresses(&self) -> impl Iterator<Item = &str> {
        split_addresses(&self.to)
    }

    /// Individual `cc` addresses, blanks dropped.
    pub fn cc_addresses(&self) -> impl Iterator<Item = &str> {
        split_addresses(&self.cc)
    }

    /// Everyone the message is delivered to: `to` then `cc`.
    #[must_use]
    pub fn envelope(&self) -> Vec<&str> {
        self.to_addresses().chain(self.cc_addresses()).collect()
    }
}

fn split_addresses(list: &str) -> impl Iterator<Item = &str> {
    list.split(ADDRESS_DELIMITER)
        .map(str::trim)
        .filter(|addr| !addr.is_empty())
}

/// Why a message was not delivered.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    /// Neither `to` nor `cc` holds an address.
    #[error("no recipients selected")]
    NoRecipients,

    /// An address or the sender failed validation.
    #[error("invalid address: {0}")]
    InvalidAddress(#[source] groupmail_smtp::Error),

    /// Connecting, greeting or TLS negotiation failed.
    #[error("connection failed: {0}")]
    Connection(#[source] groupmail_smtp::Error),

    /// The server refused the credentials.
    #[error("authentication failed: {0}")]
    Authentication(#[source] groupmail_smtp::Error),

    /// The server refused the sender, a recipient or the message.
    #[error("send failed: {0}")]
    Rejected(#[source] groupmail_smtp::Error),

    /// An attachment file could not be read.
    #[error("cannot read attachment {}: {source}", .path.display())]
    Attachment {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

/// Delivers one [`GroupMessage`].
///
/// The review workflow awaits each send before it moves on, so an
/// implementation never sees two messages in flight from the same run.
#[allow(async_fn_in_trait)]
pub trait Mailer {
    /// Composes and transmits the message.
    ///
    /// # Errors
    ///
    /// Returns a [`SendError`] describing why the message was not delivered.
    async fn send(&self, message: &GroupMessage) -> Result<(), SendError>;
}
