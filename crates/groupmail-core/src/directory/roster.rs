//! JSON rendition of the two-sheet contact workbook.

use std::path::Path;

use serde::Deserialize;

use super::builder::{DepartmentRow, RecipientRow};
use super::model::Directory;
use crate::error::{Error, Result};

/// Both sheets of the roster, each a list of fixed-arity string rows.
///
/// ```json
/// {
///   "departments": [["G1", "GroupOne", "D1", "DeptOne"]],
///   "recipients":  [["Alice", "D1", "DeptOne", "Al", "是", "a@x.com", ""]]
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Roster {
    /// `(group_code, group_name, dept_code, dept_name)` rows.
    #[serde(default)]
    pub departments: Vec<DepartmentRow>,
    /// `(full_name, dept_code, dept_name, short_name, cc, address, note)` rows.
    #[serde(default)]
    pub recipients: Vec<RecipientRow>,
}

impl Roster {
    /// Reads and parses a roster file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Roster`] if the file cannot be read or a row has the
    /// wrong shape.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::Roster {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        Self::parse(&contents).map_err(|e| Error::Roster {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Parses roster JSON.
    ///
    /// # Errors
    ///
    /// Returns a JSON error if the document or any row is malformed.
    pub fn parse(contents: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }

    /// Builds the directory from the rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownDepartment`] for an orphan recipient.
    pub fn into_directory(self) -> Result<Directory> {
        Directory::from_rows(self.departments, self.recipients)
    }
}
