//! Builds a [`Directory`] from department and recipient rows.

use std::collections::HashMap;

use serde::Deserialize;

use super::model::{Department, Directory, Group, Recipient};
use crate::error::{Error, Result};

/// The only cc-flag value that marks a recipient as copied.
pub const CC_TOKEN: &str = "是";

/// One row of the department sheet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "(String, String, String, String)")]
pub struct DepartmentRow {
    /// Group code.
    pub group_code: String,
    /// Group display name.
    pub group_name: String,
    /// Department code.
    pub department_code: String,
    /// Department display name.
    pub department_name: String,
}

impl From<(String, String, String, String)> for DepartmentRow {
    fn from(
        (group_code, group_name, department_code, department_name): (
            String,
            String,
            String,
            String,
        ),
    ) -> Self {
        Self {
            group_code,
            group_name,
            department_code,
            department_name,
        }
    }
}

/// One row of the recipient sheet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "(String, String, String, String, String, String, String)")]
pub struct RecipientRow {
    /// Full legal name.
    pub full_name: String,
    /// Department code.
    pub department_code: String,
    /// Department display name.
    pub department_name: String,
    /// Short display name.
    pub short_name: String,
    /// Raw cc flag cell; see [`CC_TOKEN`].
    pub cc_flag: String,
    /// Email address.
    pub address: String,
    /// Free-text note.
    pub note: String,
}

impl From<(String, String, String, String, String, String, String)> for RecipientRow {
    fn from(
        (full_name, department_code, department_name, short_name, cc_flag, address, note): (
            String,
            String,
            String,
            String,
            String,
            String,
            String,
        ),
    ) -> Self {
        Self {
            full_name,
            department_code,
            department_name,
            short_name,
            cc_flag,
            address,
            note,
        }
    }
}

impl RecipientRow {
    fn into_recipient(self) -> Recipient {
        Recipient {
            cc: self.cc_flag == CC_TOKEN,
            full_name: self.full_name,
            department_code: self.department_code,
            department_name: self.department_name,
            short_name: self.short_name,
            address: self.address,
            note: self.note,
        }
    }
}

/// Accumulates rows into groups.
///
/// Department rows must all be added before recipient rows, since a
/// recipient can only attach to a department that is already known.
#[derive(Debug, Default)]
pub struct DirectoryBuilder {
    groups: Vec<Group>,
    group_slots: HashMap<String, usize>,
    /// Department code to (group index, department index).
    department_slots: HashMap<String, (usize, usize)>,
}

impl DirectoryBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a department and, on first sight, its group.
    ///
    /// A department code seen before is ignored, whatever group the row
    /// names: denormalized sheets repeat department rows per contact.
    pub fn add_department(&mut self, row: DepartmentRow) -> &mut Self {
        if self.department_slots.contains_key(&row.department_code) {
            return self;
        }

        let group_index = match self.group_slots.get(&row.group_code) {
            Some(&index) => index,
            None => {
                let index = self.groups.len();
                self.group_slots.insert(row.group_code.clone(), index);
                self.groups.push(Group {
                    code: row.group_code,
                    name: row.group_name,
                    departments: Vec::new(),
                });
                index
            }
        };

        let departments = &mut self.groups[group_index].departments;
        self.department_slots
            .insert(row.department_code.clone(), (group_index, departments.len()));
        departments.push(Department {
            code: row.department_code,
            name: row.department_name,
            recipients: Vec::new(),
        });
        self
    }

    /// Attaches a recipient to its department.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownDepartment`] if no department row registered
    /// the recipient's department code.
    pub fn add_recipient(&mut self, row: RecipientRow) -> Result<&mut Self> {
        let Some(&(group_index, department_index)) = self.department_slots.get(&row.department_code)
        else {
            return Err(Error::UnknownDepartment {
                code: row.department_code,
                recipient: row.full_name,
            });
        };

        self.groups[group_index].departments[department_index]
            .recipients
            .push(row.into_recipient());
        Ok(self)
    }

    /// Finishes the directory.
    #[must_use]
    pub fn build(self) -> Directory {
        Directory::new(self.groups)
    }
}

impl Directory {
    /// Builds a directory from both row streams, departments first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownDepartment`] for the first orphan recipient.
    pub fn from_rows(
        departments: impl IntoIterator<Item = DepartmentRow>,
        recipients: impl IntoIterator<Item = RecipientRow>,
    ) -> Result<Self> {
        let mut builder = DirectoryBuilder::new();
        for row in departments {
            builder.add_department(row);
        }
        for row in recipients {
            builder.add_recipient(row)?;
        }
        Ok(builder.build())
    }
}
