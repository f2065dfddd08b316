//! Attachment files classified by the code their name starts with.
//!
//! `D01budget.xlsx` and `D01_budget.xlsx` belong to whatever group or
//! department has code `D01`; `000_notice.pdf` belongs to everyone (see
//! [`crate::matcher::WILDCARD_CODE`]).

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Maximum number of leading characters that form a classification code.
pub const CODE_LEN: usize = 3;

/// Ends a code early, so `D1_report.pdf` is classified as `D1`.
pub const CODE_SEPARATOR: char = '_';

/// One discovered attachment file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRecord {
    code: String,
    name: String,
    path: PathBuf,
}

impl AttachmentRecord {
    /// Classifies `name` found in `directory`.
    ///
    /// The code is the first [`CODE_LEN`] characters, cut short at a
    /// [`CODE_SEPARATOR`]. Names shorter than that use the whole name.
    #[must_use]
    pub fn new(name: impl Into<String>, directory: impl AsRef<Path>) -> Self {
        let name = name.into();
        let path = directory.as_ref().join(&name);
        Self::classify(name, path)
    }

    /// Classifies the file at `directory/file_name`.
    ///
    /// The path keeps the name's exact bytes; only the displayed name and
    /// the code go through a lossy UTF-8 conversion.
    #[must_use]
    pub fn from_file_name(file_name: &OsStr, directory: &Path) -> Self {
        let name = file_name.to_string_lossy().into_owned();
        Self::classify(name, directory.join(file_name))
    }

    fn classify(name: String, path: PathBuf) -> Self {
        let code = name
            .chars()
            .take_while(|&c| c != CODE_SEPARATOR)
            .take(CODE_LEN)
            .collect();
        Self { code, name, path }
    }

    /// Classification code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// File name for display.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full path of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Every attachment available for the run, ordered by code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentIndex {
    records: Vec<AttachmentRecord>,
}

impl AttachmentIndex {
    /// An index with no attachments.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds an index from records, ordering them by code.
    ///
    /// The sort is stable, so records sharing a code keep their given order.
    #[must_use]
    pub fn from_records(mut records: Vec<AttachmentRecord>) -> Self {
        records.sort_by(|a, b| a.code.cmp(&b.code));
        Self { records }
    }

    /// Lists the files directly inside `directory`.
    ///
    /// `None` or an empty path yields an empty index. Subdirectories are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AttachmentSourceUnreadable`] if the directory cannot
    /// be listed.
    pub fn scan(directory: Option<&Path>) -> Result<Self> {
        let Some(directory) = directory.filter(|d| !d.as_os_str().is_empty()) else {
            return Ok(Self::empty());
        };

        let unreadable = |source: std::io::Error| Error::AttachmentSourceUnreadable {
            path: directory.to_path_buf(),
            source,
        };

        tracing::debug!(directory = %directory.display(), "scanning attachments");
        let mut records = Vec::new();
        for entry in std::fs::read_dir(directory).map_err(unreadable)? {
            let entry = entry.map_err(unreadable)?;
            if entry.path().is_dir() {
                tracing::debug!(path = %entry.path().display(), "skipping directory");
                continue;
            }

            let record = AttachmentRecord::from_file_name(&entry.file_name(), directory);
            tracing::debug!(
                name = record.name(),
                code = record.code(),
                "classified attachment"
            );
            records.push(record);
        }

        Ok(Self::from_records(records))
    }

    /// Records in code order.
    #[must_use]
    pub fn records(&self) -> &[AttachmentRecord] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true when there are no attachments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
