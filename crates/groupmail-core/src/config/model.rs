//! Settings model types.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::validation::validate_settings;
use crate::error::{Error, Result};

/// Roster location used when the settings file names none.
pub const DEFAULT_ROSTER: &str = "conf/roster.json";

/// Run log directory used when the settings file names none.
const DEFAULT_LOG_DIR: &str = "logs";

/// Security/encryption mode for the SMTP connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Security {
    /// No encryption (not recommended).
    None,
    /// Implicit TLS (connect directly with TLS).
    #[default]
    Tls,
    /// STARTTLS upgrade after plaintext connect.
    StartTls,
}

impl Security {
    /// Get display name for the security mode.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::None => "None (insecure)",
            Self::Tls => "SSL/TLS",
            Self::StartTls => "STARTTLS",
        }
    }
}

/// SMTP server configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    /// Server hostname.
    pub host: String,
    /// Server port; 0 picks the default for `security`.
    pub port: u16,
    /// Security mode.
    pub security: Security,
    /// Username for AUTH PLAIN; empty skips authentication.
    pub username: String,
    /// Password for authentication.
    pub password: String,
}

impl SmtpConfig {
    /// Get default port for the security mode.
    #[must_use]
    pub const fn default_port(security: Security) -> u16 {
        match security {
            Security::None => 25,
            Security::StartTls => 587,
            Security::Tls => 465,
        }
    }

    /// The configured port, or the security mode's default when unset.
    #[must_use]
    pub const fn effective_port(&self) -> u16 {
        if self.port == 0 {
            Self::default_port(self.security)
        } else {
            self.port
        }
    }
}

/// Everything a run needs besides the operator's subject and body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Outgoing server.
    pub smtp: SmtpConfig,
    /// Address messages are sent from.
    pub sender: String,
    /// Roster file.
    pub roster: PathBuf,
    /// Attachment directory; unset means no attachments.
    pub attachments: Option<PathBuf>,
    /// Directory receiving one log file per run.
    pub log_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            smtp: SmtpConfig::default(),
            sender: String::new(),
            roster: PathBuf::from(DEFAULT_ROSTER),
            attachments: None,
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
        }
    }
}

impl Settings {
    /// Parses settings JSON without validating it.
    ///
    /// # Errors
    ///
    /// Returns a JSON error if the document is malformed.
    pub fn parse(contents: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }

    /// Reads and parses a settings file.
    ///
    /// Nothing is validated here: listing the directory needs no SMTP
    /// account, so callers that send must also call [`Settings::validate`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file cannot be read or parsed.
    pub async fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        let settings = Self::parse(&contents)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;

        tracing::debug!(path = %path.display(), host = %settings.smtp.host, "settings read");
        Ok(settings)
    }

    /// Checks that the settings are complete enough to send mail.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSettings`] listing every problem found.
    pub fn validate(&self) -> Result<()> {
        validate_settings(self).map_err(Error::InvalidSettings)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let settings =
            Settings::parse(r#"{"smtp": {"host": "smtp.x.com"}, "sender": "a@x.com"}"#).unwrap();
        assert_eq!(settings.roster, PathBuf::from(DEFAULT_ROSTER));
        assert_eq!(settings.log_dir, PathBuf::from("logs"));
        assert_eq!(settings.attachments, None);
        assert_eq!(settings.smtp.security, Security::Tls);
        assert_eq!(settings.smtp.effective_port(), 465);
    }

    #[test]
    fn port_follows_security_when_unset() {
        let mut smtp = SmtpConfig {
            security: Security::StartTls,
            ..SmtpConfig::default()
        };
        assert_eq!(smtp.effective_port(), 587);
        smtp.security = Security::None;
        assert_eq!(smtp.effective_port(), 25);
        smtp.port = 2525;
        assert_eq!(smtp.effective_port(), 2525);
    }

    #[test]
    fn full_document_parses() {
        let settings = Settings::parse(
            r#"{
                "smtp": {"host": "smtp.163.com", "port": 994, "security": "StartTls",
                         "username": "u@163.com", "password": "pw"},
                "sender": "u@163.com",
                "roster": "data/roster.json",
                "attachments": "outbox",
                "log_dir": "var/log"
            }"#,
        )
        .unwrap();
        assert_eq!(settings.smtp.effective_port(), 994);
        assert_eq!(settings.smtp.security, Security::StartTls);
        assert_eq!(settings.attachments, Some(PathBuf::from("outbox")));
        assert_eq!(settings.log_dir, PathBuf::from("var/log"));
    }

    #[tokio::test]
    async fn read_accepts_settings_without_smtp_account() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.json");
        tokio::fs::write(&path, r#"{"roster": "r.json"}"#).await.unwrap();

        let settings = Settings::read(&path).await.unwrap();
        assert_eq!(settings.roster, PathBuf::from("r.json"));
        assert!(settings.smtp.host.is_empty());
    }

    #[tokio::test]
    async fn validate_rejects_incomplete_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.json");
        tokio::fs::write(&path, r#"{"sender": "nobody"}"#).await.unwrap();

        let settings = Settings::read(&path).await.unwrap();
        let err = settings.validate().unwrap_err();
        let Error::InvalidSettings(problems) = err else {
            panic!("expected invalid settings, got {err}");
        };
        assert_eq!(problems.len(), 2);
    }

    #[tokio::test]
    async fn read_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::read(dir.path().join("absent.json")).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
