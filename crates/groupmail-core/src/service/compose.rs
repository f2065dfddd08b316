//! RFC 5322 / MIME rendering of a [`GroupMessage`].
//!
//! Without attachments the message is a single base64 `text/plain` part.
//! With attachments it becomes `multipart/mixed`: the text part first, then
//! one base64 part per file.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, FixedOffset};

use super::mailer::{GroupMessage, SendError};

/// Maximum encoded line length in a base64 body (RFC 2045).
const BASE64_LINE: usize = 76;

/// Raw bytes per RFC 2047 encoded word; 39 bytes encode to a 64 character
/// word, which fits a 78 character line after `Subject: `.
const WORD_BYTES: usize = 39;

/// Longest value written verbatim; anything longer is split into encoded
/// words so no header line outgrows the 78 character recommendation.
const PLAIN_HEADER: usize = 60;

/// A file read into memory for attaching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentPart {
    /// Name shown to the receiver.
    pub filename: String,
    /// File contents.
    pub content: Vec<u8>,
}

impl AttachmentPart {
    /// Reads `path`, naming the part after the file.
    ///
    /// # Errors
    ///
    /// Returns [`SendError::Attachment`] if the file cannot be read.
    pub async fn read(path: &Path) -> Result<Self, SendError> {
        let content = tokio::fs::read(path)
            .await
            .map_err(|source| SendError::Attachment {
                path: path.to_path_buf(),
                source,
            })?;
        let filename = path.file_name().map_or_else(
            || path.display().to_string(),
            |n| n.to_string_lossy().into_owned(),
        );
        Ok(Self { filename, content })
    }
}

/// Reads every attachment of a message, in order.
///
/// # Errors
///
/// Returns the first [`SendError::Attachment`] encountered.
pub async fn read_attachments(paths: &[PathBuf]) -> Result<Vec<AttachmentPart>, SendError> {
    let mut parts = Vec::with_capacity(paths.len());
    for path in paths {
        parts.push(AttachmentPart::read(path).await?);
    }
    Ok(parts)
}

/// Encodes a header value as RFC 2047 UTF-8 words unless it is short
/// printable ASCII that is also safe inside a quoted parameter. Encoded
/// values are split over folded lines.
#[must_use]
pub fn encode_header(text: &str) -> String {
    let plain = text.len() <= PLAIN_HEADER
        && text.chars().all(|c| {
            c.is_ascii() && !c.is_ascii_control() && !matches!(c, '=' | '?' | '"' | '\\')
        });
    if plain {
        return text.to_string();
    }

    let mut words = Vec::new();
    let mut chunk = String::new();
    for c in text.chars() {
        if chunk.len() + c.len_utf8() > WORD_BYTES {
            words.push(encoded_word(&chunk));
            chunk.clear();
        }
        chunk.push(c);
    }
    if !chunk.is_empty() {
        words.push(encoded_word(&chunk));
    }
    words.join("\r\n ")
}

fn encoded_word(chunk: &str) -> String {
    format!("=?utf-8?B?{}?=", STANDARD.encode(chunk))
}

/// Base64 with CRLF line breaks every 76 characters.
#[must_use]
pub fn base64_lines(data: &[u8]) -> String {
    let encoded = STANDARD.encode(data);
    let mut out = String::with_capacity(encoded.len() + encoded.len() / BASE64_LINE * 2 + 2);
    for line in encoded.as_bytes().chunks(BASE64_LINE) {
        // base64 output is ASCII.
        out.push_str(&String::from_utf8_lossy(line));
        out.push_str("\r\n");
    }
    out
}

/// Renders the complete message.
///
/// `boundary` separates multipart sections and must not occur in any part.
#[must_use]
pub fn compose(
    from: &str,
    message: &GroupMessage,
    attachments: &[AttachmentPart],
    date: DateTime<FixedOffset>,
    boundary: &str,
) -> String {
    let mut out = String::new();
    let to: Vec<_> = message.to_addresses().collect();
    let cc: Vec<_> = message.cc_addresses().collect();

    let _ = write!(out, "From: {from}\r\n");
    if !to.is_empty() {
        let _ = write!(out, "To: {}\r\n", to.join(", "));
    }
    if !cc.is_empty() {
        let _ = write!(out, "Cc: {}\r\n", cc.join(", "));
    }
    let _ = write!(out, "Subject: {}\r\n", encode_header(&message.subject));
    let _ = write!(out, "Date: {}\r\n", date.to_rfc2822());
    out.push_str("MIME-Version: 1.0\r\n");

    if attachments.is_empty() {
        write_text_part(&mut out, &message.body);
        return out;
    }

    let _ = write!(
        out,
        "Content-Type: multipart/mixed; boundary=\"{boundary}\"\r\n\r\n"
    );
    let _ = write!(out, "--{boundary}\r\n");
    write_text_part(&mut out, &message.body);

    for part in attachments {
        let name = encode_header(&part.filename);
        let _ = write!(out, "--{boundary}\r\n");
        let _ = write!(
            out,
            "Content-Type: application/octet-stream; name=\"{name}\"\r\n"
        );
        out.push_str("Content-Transfer-Encoding: base64\r\n");
        let _ = write!(
            out,
            "Content-Disposition: attachment; filename=\"{name}\"\r\n\r\n"
        );
        out.push_str(&base64_lines(&part.content));
    }
    let _ = write!(out, "--{boundary}--\r\n");
    out
}

fn write_text_part(out: &mut String, body: &str) {
    out.push_str("Content-Type: text/plain; charset=utf-8\r\n");
    out.push_str("Content-Transfer-Encoding: base64\r\n\r\n");
    out.push_str(&base64_lines(body.as_bytes()));
}
