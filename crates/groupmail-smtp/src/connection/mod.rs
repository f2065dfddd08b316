//! Connections and the type-state session client.

mod client;
mod stream;

pub use client::{Client, DataOpen, Greeted, MailStarted, Ready, RecipientsAccepted};
pub use stream::{SmtpStream, connect, connect_tls};

use crate::extension::{AuthMechanism, Extension};

/// What the server told us about itself.
#[derive(Debug, Clone, Default)]
pub struct ServerInfo {
    /// First word of the greeting.
    pub hostname: String,
    /// Extensions from the latest EHLO reply.
    pub extensions: Vec<Extension>,
}

impl ServerInfo {
    /// Returns true when STARTTLS was advertised.
    #[must_use]
    pub fn supports_starttls(&self) -> bool {
        self.extensions.contains(&Extension::StartTls)
    }

    /// Advertised SASL mechanisms.
    #[must_use]
    pub fn auth_mechanisms(&self) -> &[AuthMechanism] {
        self.extensions
            .iter()
            .find_map(|ext| match ext {
                Extension::Auth(mechanisms) => Some(mechanisms.as_slice()),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// Declared maximum message size.
    #[must_use]
    pub fn max_message_size(&self) -> Option<usize> {
        self.extensions.iter().find_map(|ext| match ext {
            Extension::Size(size) => *size,
            _ => None,
        })
    }
}
