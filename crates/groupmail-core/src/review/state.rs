//! The operator's selection for the group under review.

use crate::attachment::{AttachmentIndex, AttachmentRecord};
use crate::directory::{Group, Recipient};
use crate::matcher;
use crate::service::{ADDRESS_DELIMITER, GroupMessage};

/// An item the operator can leave in or take out of the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Included<T> {
    /// The recipient or attachment.
    pub item: T,
    /// Whether it goes into the message.
    pub included: bool,
}

impl<T> Included<T> {
    const fn new(item: T) -> Self {
        Self {
            item,
            included: true,
        }
    }

    const fn toggle(&mut self) {
        self.included = !self.included;
    }
}

/// Entry to flip, by position in the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Position in [`ReviewState::recipients`].
    Recipient(usize),
    /// Position in [`ReviewState::attachments`].
    Attachment(usize),
}

/// Subject and body shared by every message of a run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessageTemplate {
    /// Subject line.
    pub subject: String,
    /// Plain text body.
    pub body: String,
}

impl MessageTemplate {
    /// Creates a template.
    #[must_use]
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// Matched recipients and attachments of one group, each with an
/// inclusion flag. Built fresh whenever the workflow enters a group.
#[derive(Debug, Clone)]
pub struct ReviewState<'a> {
    group: &'a Group,
    recipients: Vec<Included<&'a Recipient>>,
    attachments: Vec<Included<&'a AttachmentRecord>>,
}

impl<'a> ReviewState<'a> {
    /// Resolves the group's selection with everything included.
    #[must_use]
    pub fn new(group: &'a Group, index: &'a AttachmentIndex) -> Self {
        Self {
            group,
            recipients: matcher::recipients(group)
                .into_iter()
                .map(Included::new)
                .collect(),
            attachments: matcher::attachments(group, index)
                .into_iter()
                .map(Included::new)
                .collect(),
        }
    }

    /// The group under review.
    #[must_use]
    pub const fn group(&self) -> &'a Group {
        self.group
    }

    /// Recipients in department then row order.
    #[must_use]
    pub fn recipients(&self) -> &[Included<&'a Recipient>] {
        &self.recipients
    }

    /// Applicable attachments in index order.
    #[must_use]
    pub fn attachments(&self) -> &[Included<&'a AttachmentRecord>] {
        &self.attachments
    }

    /// Flips one inclusion flag. Returns false if `target` is out of range.
    pub fn toggle(&mut self, target: Target) -> bool {
        let flipped = match target {
            Target::Recipient(i) => self.recipients.get_mut(i).map(Included::toggle),
            Target::Attachment(i) => self.attachments.get_mut(i).map(Included::toggle),
        };
        flipped.is_some()
    }

    /// The message this selection would send.
    ///
    /// Included recipients are split into `to` and `cc` by their cc flag;
    /// attachments are the included records' full paths.
    #[must_use]
    pub fn message(&self, template: &MessageTemplate) -> GroupMessage {
        let included = || {
            self.recipients
                .iter()
                .filter(|r| r.included)
                .map(|r| r.item)
        };

        GroupMessage {
            to: join_addresses(included().filter(|r| !r.cc)),
            cc: join_addresses(included().filter(|r| r.cc)),
            subject: template.subject.clone(),
            body: template.body.clone(),
            attachments: self
                .attachments
                .iter()
                .filter(|a| a.included)
                .map(|a| a.item.path().to_path_buf())
                .collect(),
        }
    }
}

fn join_addresses<'r>(recipients: impl Iterator<Item = &'r Recipient>) -> String {
    let mut joined = String::new();
    for recipient in recipients {
        if !joined.is_empty() {
            joined.push(ADDRESS_DELIMITER);
        }
        joined.push_str(&recipient.address);
    }
    joined
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::directory::{DepartmentRow, Directory, RecipientRow};

    fn person(name: &str, code: &str, cc: bool) -> RecipientRow {
        RecipientRow {
            full_name: name.into(),
            department_code: code.into(),
            department_name: String::new(),
            short_name: name.into(),
            cc_flag: if cc { "是".into() } else { "否".into() },
            address: format!("{name}@x.com"),
            note: String::new(),
        }
    }

    fn dept(code: &str, name: &str) -> DepartmentRow {
        DepartmentRow::from((
            "G1".to_string(),
            "Sci".to_string(),
            code.to_string(),
            name.to_string(),
        ))
    }

    fn fixture() -> (Directory, AttachmentIndex) {
        let directory = Directory::from_rows(
            [dept("D1", "Math"), dept("D2", "Phys")],
            [
                person("ann", "D1", false),
                person("cat", "D1", true),
                person("bob", "D2", false),
            ],
        )
        .unwrap();
        let index = AttachmentIndex::from_records(vec![
            AttachmentRecord::new("D2_lab.pdf", "/out"),
            AttachmentRecord::new("000_all.pdf", "/out"),
            AttachmentRecord::new("D9_x.pdf", "/out"),
        ]);
        (directory, index)
    }

    #[test]
    fn everything_starts_included() {
        let (directory, index) = fixture();
        let state = ReviewState::new(&directory.groups()[0], &index);
        assert_eq!(state.recipients().len(), 3);
        assert_eq!(state.attachments().len(), 2);
        assert!(state.recipients().iter().all(|r| r.included));
        assert!(state.attachments().iter().all(|a| a.included));
    }

    #[test]
    fn message_splits_to_and_cc() {
        let (directory, index) = fixture();
        let state = ReviewState::new(&directory.groups()[0], &index);
        let message = state.message(&MessageTemplate::new("S", "B"));

        assert_eq!(message.to, "ann@x.com,bob@x.com");
        assert_eq!(message.cc, "cat@x.com");
        assert_eq!(message.subject, "S");
        assert_eq!(message.body, "B");
        assert_eq!(
            message.attachments,
            [PathBuf::from("/out/000_all.pdf"), PathBuf::from("/out/D2_lab.pdf")]
        );
    }

    #[test]
    fn excluded_entries_are_left_out() {
        let (directory, index) = fixture();
        let mut state = ReviewState::new(&directory.groups()[0], &index);
        assert!(state.toggle(Target::Recipient(0)));
        assert!(state.toggle(Target::Attachment(1)));

        let message = state.message(&MessageTemplate::default());
        assert_eq!(message.to, "bob@x.com");
        assert_eq!(message.attachments, [PathBuf::from("/out/000_all.pdf")]);
    }

    #[test]
    fn double_toggle_restores() {
        let (directory, index) = fixture();
        let mut state = ReviewState::new(&directory.groups()[0], &index);
        let before = state.message(&MessageTemplate::default());
        state.toggle(Target::Recipient(1));
        state.toggle(Target::Recipient(1));
        assert_eq!(state.message(&MessageTemplate::default()), before);
    }

    #[test]
    fn out_of_range_toggle_is_rejected() {
        let (directory, index) = fixture();
        let mut state = ReviewState::new(&directory.groups()[0], &index);
        assert!(!state.toggle(Target::Recipient(3)));
        assert!(!state.toggle(Target::Attachment(2)));
        assert!(state.recipients().iter().all(|r| r.included));
    }
}
