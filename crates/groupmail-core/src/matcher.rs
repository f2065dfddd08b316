//! Resolves which recipients and attachments apply to a group.
//!
//! An attachment applies to a group when its code is in the group's code
//! set or is the wildcard. Both rules are plain set membership; no prefix
//! comparison is involved.

use std::collections::HashSet;

use crate::attachment::{AttachmentIndex, AttachmentRecord};
use crate::directory::{Group, Recipient};

/// Attachment code that applies to every group.
pub const WILDCARD_CODE: &str = "000";

/// The group's own code plus the codes of its departments.
#[must_use]
pub fn code_set(group: &Group) -> HashSet<&str> {
    std::iter::once(group.code.as_str())
        .chain(group.departments.iter().map(|d| d.code.as_str()))
        .collect()
}

/// Returns true when `record` applies to the group owning `codes`.
#[must_use]
pub fn is_applicable(codes: &HashSet<&str>, record: &AttachmentRecord) -> bool {
    record.code() == WILDCARD_CODE || codes.contains(record.code())
}

/// Every recipient of the group, department by department, in row order.
///
/// A person listed under two departments appears twice.
#[must_use]
pub fn recipients(group: &Group) -> Vec<&Recipient> {
    group
        .departments
        .iter()
        .flat_map(|d| &d.recipients)
        .collect()
}

/// Attachments applying to the group, in index order.
#[must_use]
pub fn attachments<'a>(group: &Group, index: &'a AttachmentIndex) -> Vec<&'a AttachmentRecord> {
    let codes = code_set(group);
    index
        .records()
        .iter()
        .filter(|record| is_applicable(&codes, record))
        .collect()
}
