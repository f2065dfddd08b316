//! # groupmail-smtp
//!
//! Async SMTP client for delivering one composed message per session.
//!
//! ## Features
//!
//! - **Type-state sessions**: the compiler rejects out-of-order commands
//!   (no `RCPT TO` before `MAIL FROM`, no `DATA` without a recipient)
//! - **Transport security**: implicit TLS (port 465) and STARTTLS upgrade
//! - **Authentication**: `AUTH PLAIN` with an initial response
//!
//! ## Quick Start
//!
//! ```ignore
//! use groupmail_smtp::{Address, Client};
//! use groupmail_smtp::connection::connect_tls;
//!
//! #[tokio::main]
//! async fn main() -> groupmail_smtp::Result<()> {
//!     let stream = connect_tls("smtp.example.com", 465).await?;
//!     let client = Client::from_stream(stream).await?;
//!     let client = client.ehlo("localhost").await?;
//!     let client = client.auth_plain("user@example.com", "secret").await?;
//!
//!     let client = client.mail_from(&Address::new("user@example.com")?).await?;
//!     let client = client.rcpt_to(&Address::new("dept@example.com")?).await?;
//!     let client = client.data().await?;
//!     let client = client.send_message(b"Subject: hi\r\n\r\nhello\r\n").await?;
//!     client.quit().await
//! }
//! ```
//!
//! ## Session States
//!
//! ```text
//! Greeted ── auth_plain() / without_auth() ──→ Ready
//! Ready ── mail_from() ──→ MailStarted ── rcpt_to() ──→ RecipientsAccepted
//! RecipientsAccepted ── data() ──→ DataOpen ── send_message() ──→ Ready
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod address;
pub mod command;
pub mod connection;
mod error;
mod extension;
pub mod reply;

pub use address::Address;
pub use connection::{
    Client, DataOpen, Greeted, MailStarted, Ready, RecipientsAccepted, ServerInfo,
};
pub use error::{Error, Result};
pub use extension::{AuthMechanism, Extension};
pub use reply::{Reply, ReplyCode};
