//! Mail delivery: the message handed to a sender, its MIME form, and SMTP.

pub mod compose;
mod mailer;
mod smtp;

pub use mailer::{ADDRESS_DELIMITER, GroupMessage, Mailer, SendError};
pub use smtp::SmtpMailer;
