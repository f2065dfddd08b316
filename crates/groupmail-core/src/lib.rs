//! # groupmail-core
//!
//! Core logic for sending department-specific mail to organizational groups.
//!
//! This crate provides:
//! - **Directory model** - groups, departments and recipients built from
//!   roster rows
//! - **Attachment index** - files classified by the code prefix of their name
//! - **Matcher** - the recipients and attachments that apply to a group,
//!   including the `"000"` wildcard
//! - **Review workflow** - the per-group confirm/skip state machine
//! - **Mail service** - message composition and SMTP delivery
//! - **Settings and run log** - configuration file and per-run log naming
//!
//! # Example
//!
//! ```ignore
//! use groupmail_core::{AttachmentIndex, MessageTemplate, ReviewWorkflow, Roster};
//!
//! let directory = Roster::load("conf/roster.json").await?.into_directory()?;
//! let attachments = AttachmentIndex::scan(Some(Path::new("outbox")))?;
//! let template = MessageTemplate::new("Budget 2025", "Please see attached.");
//!
//! let mut workflow = ReviewWorkflow::new(&directory, &attachments, template, log_path);
//! while let Some(state) = workflow.current() {
//!     // render `state`, then toggle / confirm / skip
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod attachment;
pub mod config;
pub mod directory;
mod error;
pub mod matcher;
pub mod review;
pub mod runlog;
pub mod service;

pub use attachment::{AttachmentIndex, AttachmentRecord};
pub use config::{Security, Settings, SmtpConfig, ValidationError, validate_settings};
pub use directory::{
    Department, DepartmentRow, Directory, DirectoryBuilder, DirectoryCounts, Group, Recipient,
    RecipientRow, Roster,
};
pub use error::{Error, Result};
pub use review::{
    ConfirmOutcome, Included, MessageTemplate, Phase, ReviewState, ReviewWorkflow, RunSummary,
    Target,
};
pub use runlog::RunLog;
pub use service::{GroupMessage, Mailer, SendError, SmtpMailer};
