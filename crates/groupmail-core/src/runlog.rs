//! Per-run log file naming.
//!
//! Every run writes to a fresh file named after its start time, e.g.
//! `logs/2024-03-01 09-30-00.txt`. The file itself is filled by whatever
//! tracing subscriber the caller installs.

use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::error::Result;

/// `strftime` pattern for the file stem.
const NAME_FORMAT: &str = "%Y-%m-%d %H-%M-%S";

/// Attempts at a free name before giving up.
const MAX_SUFFIX: u32 = 100;

/// Location of the current run's log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    /// File name for a run started at `started`.
    #[must_use]
    pub fn file_name(started: NaiveDateTime) -> String {
        format!("{}.txt", started.format(NAME_FORMAT))
    }

    /// Creates the log file inside `dir`, creating `dir` if needed.
    ///
    /// An existing file is never reused: a second run within the same
    /// second gets a numbered name such as `2024-03-01 09-30-00 (1).txt`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] if the directory or file cannot be
    /// created.
    pub fn create(dir: &Path, started: NaiveDateTime) -> Result<(Self, File)> {
        std::fs::create_dir_all(dir)?;

        let stem = started.format(NAME_FORMAT).to_string();
        let mut attempt = 0;
        loop {
            let name = if attempt == 0 {
                Self::file_name(started)
            } else {
                format!("{stem} ({attempt}).txt")
            };
            let path = dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((Self { path }, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists && attempt < MAX_SUFFIX => {
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Path of the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Display for RunLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}
