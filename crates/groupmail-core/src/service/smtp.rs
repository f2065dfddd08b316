//! Delivery over SMTP.

use chrono::Local;
use groupmail_smtp::connection::{connect, connect_tls};
use groupmail_smtp::{Address, Client, Greeted};

use super::compose::{compose, read_attachments};
use super::mailer::{GroupMessage, Mailer, SendError};
use crate::config::{Security, Settings, SmtpConfig};

/// Name sent with EHLO.
const CLIENT_NAME: &str = "localhost";

/// Sends each message over its own SMTP session.
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    config: SmtpConfig,
    sender: String,
}

impl SmtpMailer {
    /// Creates a mailer sending as `sender` through `config`.
    #[must_use]
    pub fn new(config: SmtpConfig, sender: impl Into<String>) -> Self {
        Self {
            config,
            sender: sender.into(),
        }
    }

    /// Creates a mailer from loaded settings.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.smtp.clone(), settings.sender.clone())
    }

    /// Opens the connection and negotiates TLS as configured.
    async fn open(&self) -> Result<Client<Greeted>, SendError> {
        let host = &self.config.host;
        let port = self.config.effective_port();
        tracing::debug!(%host, port, security = ?self.config.security, "connecting");

        let stream = match self.config.security {
            Security::Tls => connect_tls(host, port).await,
            Security::StartTls | Security::None => connect(host, port).await,
        }
        .map_err(SendError::Connection)?;

        let client = Client::from_stream(stream)
            .await
            .map_err(SendError::Connection)?
            .ehlo(CLIENT_NAME)
            .await
            .map_err(SendError::Connection)?;

        if self.config.security == Security::StartTls {
            client
                .starttls(host, CLIENT_NAME)
                .await
                .map_err(SendError::Connection)
        } else {
            Ok(client)
        }
    }
}

impl Mailer for SmtpMailer {
    async fn send(&self, message: &GroupMessage) -> Result<(), SendError> {
        let envelope = message
            .envelope()
            .into_iter()
            .map(Address::new)
            .collect::<Result<Vec<_>, _>>()
            .map_err(SendError::InvalidAddress)?;
        let Some((first, rest)) = envelope.split_first() else {
            return Err(SendError::NoRecipients);
        };
        let from = Address::new(&self.sender).map_err(SendError::InvalidAddress)?;

        let parts = read_attachments(&message.attachments).await?;
        let now = Local::now().fixed_offset();
        let boundary = format!("=_groupmail_{}", now.timestamp_micros());
        let data = compose(from.as_str(), message, &parts, now, &boundary);

        let client = self.open().await?;
        if let Some(limit) = client.server_info().max_message_size()
            && data.len() > limit
        {
            let _ = client.quit().await;
            return Err(SendError::Rejected(groupmail_smtp::Error::Protocol(
                format!("message is {} bytes, server accepts {limit}", data.len()),
            )));
        }

        let client = if self.config.username.is_empty() {
            client.without_auth()
        } else {
            client
                .auth_plain(&self.config.username, &self.config.password)
                .await
                .map_err(SendError::Authentication)?
        };

        let mut client = client
            .mail_from(&from)
            .await
            .map_err(SendError::Rejected)?
            .rcpt_to(first)
            .await
            .map_err(SendError::Rejected)?;
        for address in rest {
            client = client.rcpt_to(address).await.map_err(SendError::Rejected)?;
        }

        let client = client
            .data()
            .await
            .map_err(SendError::Rejected)?
            .send_message(data.as_bytes())
            .await
            .map_err(SendError::Rejected)?;

        tracing::debug!(recipients = envelope.len(), attachments = parts.len(), "message accepted");

        // The message is already accepted; a failed QUIT does not undo that.
        if let Err(e) = client.quit().await {
            tracing::debug!(error = %e, "QUIT failed");
        }
        Ok(())
    }
}
