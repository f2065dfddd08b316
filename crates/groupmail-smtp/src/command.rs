//! Client commands and their wire form.

use crate::address::Address;
use crate::extension::AuthMechanism;

/// A command sent by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `EHLO <domain>`
    Ehlo(String),
    /// `STARTTLS`
    StartTls,
    /// `AUTH <mechanism> [initial-response]`
    Auth {
        /// SASL mechanism.
        mechanism: AuthMechanism,
        /// Base64 initial response.
        initial_response: Option<String>,
    },
    /// `MAIL FROM:<address>`
    MailFrom(Address),
    /// `RCPT TO:<address>`
    RcptTo(Address),
    /// `DATA`
    Data,
    /// `QUIT`
    Quit,
}

impl Command {
    /// Renders the command line including the trailing CRLF.
    #[must_use]
    pub fn to_line(&self) -> String {
        let body = match self {
            Self::Ehlo(domain) => format!("EHLO {domain}"),
            Self::StartTls => "STARTTLS".to_string(),
            Self::Auth {
                mechanism,
                initial_response: Some(response),
            } => format!("AUTH {} {response}", mechanism.as_str()),
            Self::Auth {
                mechanism,
                initial_response: None,
            } => format!("AUTH {}", mechanism.as_str()),
            Self::MailFrom(from) => format!("MAIL FROM:<{from}>"),
            Self::RcptTo(to) => format!("RCPT TO:<{to}>"),
            Self::Data => "DATA".to_string(),
            Self::Quit => "QUIT".to_string(),
        };
        format!("{body}\r\n")
    }

    /// Name used in log lines; never includes credentials.
    #[must_use]
    pub const fn verb(&self) -> &'static str {
        match self {
            Self::Ehlo(_) => "EHLO",
            Self::StartTls => "STARTTLS",
            Self::Auth { .. } => "AUTH",
            Self::MailFrom(_) => "MAIL FROM",
            Self::RcptTo(_) => "RCPT TO",
            Self::Data => "DATA",
            Self::Quit => "QUIT",
        }
    }
}
