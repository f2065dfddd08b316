//! Server replies and their parser.
//!
//! A reply is one or more lines sharing a three-digit code. Continuation
//! lines use `-` after the code, the final line a space:
//!
//! ```text
//! 250-smtp.example.com
//! 250-AUTH PLAIN LOGIN
//! 250 8BITMIME
//! ```

use crate::error::{Error, Result};

/// A complete (possibly multi-line) server reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Reply code.
    pub code: ReplyCode,
    /// Text of each line, code and separator stripped.
    pub lines: Vec<String>,
}

impl Reply {
    /// Returns true for 2xx replies.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code.is_success()
    }

    /// Joins the reply text with newlines.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Converts the reply into an error unless its code is `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Rejected`] carrying the reply when the code differs.
    pub fn expect(self, expected: ReplyCode) -> Result<Self> {
        if self.code == expected {
            Ok(self)
        } else {
            Err(Error::rejected(self.code.as_u16(), self.text()))
        }
    }

    /// Converts the reply into an error unless it is a 2xx reply.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Rejected`] carrying the reply otherwise.
    pub fn expect_success(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::rejected(self.code.as_u16(), self.text()))
        }
    }
}

/// Three-digit SMTP reply code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReplyCode(u16);

impl ReplyCode {
    /// 220 service ready.
    pub const SERVICE_READY: Self = Self(220);
    /// 221 closing channel.
    pub const CLOSING: Self = Self(221);
    /// 235 authentication succeeded.
    pub const AUTH_OK: Self = Self(235);
    /// 250 action completed.
    pub const OK: Self = Self(250);
    /// 354 start mail input.
    pub const START_DATA: Self = Self(354);

    /// Wraps a raw code.
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Numeric value.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// 2xx.
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 >= 200 && self.0 < 300
    }
}

impl std::fmt::Display for ReplyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Returns true when `line` terminates a reply (`"250 ..."` or bare `"250"`).
#[must_use]
pub fn is_final_line(line: &str) -> bool {
    let bytes = line.as_bytes();
    bytes.len() == 3 || (bytes.len() >= 4 && bytes[3] == b' ')
}

/// Parses the collected lines of one reply.
///
/// # Errors
///
/// Returns [`Error::Protocol`] for an empty reply, a non-numeric code, or
/// lines whose codes disagree.
pub fn parse_reply(lines: &[String]) -> Result<Reply> {
    let first = lines
        .first()
        .ok_or_else(|| Error::Protocol("empty reply".into()))?;

    let code = parse_code(first)?;
    let mut text = Vec::with_capacity(lines.len());
    for line in lines {
        if parse_code(line)? != code {
            return Err(Error::Protocol(format!(
                "mixed reply codes in multi-line reply: {line}"
            )));
        }
        text.push(line.get(4..).unwrap_or_default().to_string());
    }

    Ok(Reply { code, lines: text })
}

fn parse_code(line: &str) -> Result<ReplyCode> {
    line.get(..3)
        .filter(|digits| digits.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|digits| digits.parse().ok())
        .map(ReplyCode::new)
        .ok_or_else(|| Error::Protocol(format!("invalid reply line: {line:?}")))
}
