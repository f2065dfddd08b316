//! Type-state SMTP client.

use super::{ServerInfo, SmtpStream};
use crate::address::Address;
use crate::command::Command;
use crate::error::{Error, Result};
use crate::extension::{AuthMechanism, Extension};
use crate::reply::{Reply, ReplyCode, is_final_line, parse_reply};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::marker::PhantomData;

/// Greeting received; EHLO, STARTTLS and AUTH are allowed.
#[derive(Debug)]
pub struct Greeted;

/// Ready to open a mail transaction.
#[derive(Debug)]
pub struct Ready;

/// `MAIL FROM` accepted; waiting for the first recipient.
#[derive(Debug)]
pub struct MailStarted;

/// At least one recipient accepted.
#[derive(Debug)]
pub struct RecipientsAccepted;

/// `DATA` accepted; the server expects the message body.
#[derive(Debug)]
pub struct DataOpen;

/// SMTP client whose state parameter restricts the commands on offer.
#[derive(Debug)]
pub struct Client<State> {
    stream: SmtpStream,
    server_info: ServerInfo,
    _state: PhantomData<State>,
}

impl<S> Client<S> {
    /// Capabilities known so far.
    #[must_use]
    pub const fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    fn into_state<T>(self) -> Client<T> {
        Client {
            stream: self.stream,
            server_info: self.server_info,
            _state: PhantomData,
        }
    }

    async fn command(&mut self, cmd: Command) -> Result<Reply> {
        tracing::trace!(verb = cmd.verb(), "smtp command");
        self.stream.write_all(cmd.to_line().as_bytes()).await?;
        read_reply(&mut self.stream).await
    }

    /// Sends `QUIT`. Available in every state.
    ///
    /// # Errors
    ///
    /// Returns an error if the server does not acknowledge the QUIT.
    pub async fn quit(mut self) -> Result<()> {
        let reply = self.command(Command::Quit).await?;
        if reply.code == ReplyCode::CLOSING || reply.is_success() {
            Ok(())
        } else {
            Err(Error::rejected(reply.code.as_u16(), reply.text()))
        }
    }
}

impl Client<Greeted> {
    /// Reads the server greeting from a freshly opened stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the greeting cannot be read or is not a 220.
    pub async fn from_stream(mut stream: SmtpStream) -> Result<Self> {
        let greeting = read_reply(&mut stream)
            .await?
            .expect(ReplyCode::SERVICE_READY)?;

        let hostname = greeting
            .lines
            .first()
            .and_then(|line| line.split_whitespace().next())
            .unwrap_or("unknown")
            .to_string();
        tracing::debug!(%hostname, "smtp greeting received");

        Ok(Self {
            stream,
            server_info: ServerInfo {
                hostname,
                extensions: Vec::new(),
            },
            _state: PhantomData,
        })
    }

    /// Sends `EHLO` and records the advertised extensions.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the EHLO.
    pub async fn ehlo(mut self, client_name: &str) -> Result<Self> {
        let reply = self
            .command(Command::Ehlo(client_name.to_string()))
            .await?
            .expect_success()?;
        self.server_info.extensions = reply
            .lines
            .iter()
            .skip(1)
            .map(|line| Extension::parse(line))
            .collect();
        Ok(self)
    }

    /// Upgrades to TLS and repeats `EHLO`, as RFC 3207 requires.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSupported`] if STARTTLS was not advertised, or an
    /// error if the upgrade fails.
    pub async fn starttls(mut self, hostname: &str, client_name: &str) -> Result<Self> {
        if !self.server_info.supports_starttls() {
            return Err(Error::NotSupported("STARTTLS"));
        }
        self.command(Command::StartTls).await?.expect_success()?;
        self.stream = self.stream.upgrade(hostname).await?;
        self.ehlo(client_name).await
    }

    /// Authenticates with `AUTH PLAIN`.
    ///
    /// A server that lists its mechanisms without PLAIN is refused up
    /// front; one that lists none is still asked.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSupported`] if PLAIN is not offered, or an error
    /// if the server rejects the credentials.
    pub async fn auth_plain(mut self, username: &str, password: &str) -> Result<Client<Ready>> {
        let offered = self.server_info.auth_mechanisms();
        if !offered.is_empty() && !offered.contains(&AuthMechanism::Plain) {
            return Err(Error::NotSupported("AUTH PLAIN"));
        }
        let token = STANDARD.encode(format!("\0{username}\0{password}"));
        self.command(Command::Auth {
            mechanism: AuthMechanism::Plain,
            initial_response: Some(token),
        })
        .await?
        .expect_success()?;
        Ok(self.into_state())
    }

    /// Proceeds without authenticating (relays that trust the network).
    #[must_use]
    pub fn without_auth(self) -> Client<Ready> {
        self.into_state()
    }
}

impl Client<Ready> {
    /// Opens a transaction with `MAIL FROM`.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the sender.
    pub async fn mail_from(mut self, from: &Address) -> Result<Client<MailStarted>> {
        self.command(Command::MailFrom(from.clone()))
            .await?
            .expect_success()?;
        Ok(self.into_state())
    }
}

impl Client<MailStarted> {
    /// Adds the first recipient.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the recipient.
    pub async fn rcpt_to(mut self, to: &Address) -> Result<Client<RecipientsAccepted>> {
        self.command(Command::RcptTo(to.clone()))
            .await?
            .expect_success()?;
        Ok(self.into_state())
    }
}

impl Client<RecipientsAccepted> {
    /// Adds another recipient.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the recipient.
    pub async fn rcpt_to(mut self, to: &Address) -> Result<Self> {
        self.command(Command::RcptTo(to.clone()))
            .await?
            .expect_success()?;
        Ok(self)
    }

    /// Sends `DATA`.
    ///
    /// # Errors
    ///
    /// Returns an error unless the server answers 354.
    pub async fn data(mut self) -> Result<Client<DataOpen>> {
        self.command(Command::Data)
            .await?
            .expect(ReplyCode::START_DATA)?;
        Ok(self.into_state())
    }
}

impl Client<DataOpen> {
    /// Transmits the message and the terminating `.` line.
    ///
    /// Lines are normalized to CRLF and lines starting with `.` are
    /// dot-stuffed.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails or the server refuses the message.
    pub async fn send_message(mut self, message: &[u8]) -> Result<Client<Ready>> {
        let encoded = dot_stuff(message);
        self.stream.write_all(&encoded).await?;
        read_reply(&mut self.stream).await?.expect_success()?;
        Ok(self.into_state())
    }
}

async fn read_reply(stream: &mut SmtpStream) -> Result<Reply> {
    let mut lines = Vec::new();
    loop {
        let line = stream.read_line().await?;
        if line.is_empty() {
            continue;
        }
        let done = is_final_line(&line);
        lines.push(line);
        if done {
            return parse_reply(&lines);
        }
    }
}

/// Encodes a message body for the DATA phase, terminator included.
fn dot_stuff(message: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(message.len() + 64);
    let body = message.strip_suffix(b"\n").unwrap_or(message);
    for line in body.split(|&b| b == b'\n') {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.first() == Some(&b'.') {
            out.push(b'.');
        }
        out.extend_from_slice(line);
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(b".\r\n");
    out
}
