//! The confirm/skip state machine walking every group once.

use std::path::PathBuf;

use super::state::{MessageTemplate, ReviewState, Target};
use crate::attachment::AttachmentIndex;
use crate::directory::Directory;
use crate::service::{GroupMessage, Mailer, SendError};

/// Where the workflow stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Reviewing the group at this index.
    AtGroup(usize),
    /// Every group has been sent or skipped.
    Done,
}

/// Totals reported when the workflow finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of groups in the directory.
    pub groups: usize,
    /// Number of groups whose message was sent.
    pub sent: usize,
    /// Log file of the run.
    pub log_location: PathBuf,
}

/// Result of [`ReviewWorkflow::confirm`].
#[derive(Debug)]
pub enum ConfirmOutcome {
    /// The message was delivered and the workflow moved on.
    Sent {
        /// Identity of the group that was sent.
        group: String,
    },
    /// Delivery failed; the workflow is still on the same group.
    Failed {
        /// Identity of the group that failed.
        group: String,
        /// Why delivery failed.
        error: SendError,
    },
    /// The workflow was already done; nothing was sent.
    Finished,
}

/// Walks the directory's groups in order, one [`ReviewState`] at a time.
///
/// The directory and attachment index are borrowed for the whole run and
/// never modified; only the current selection changes.
#[derive(Debug)]
pub struct ReviewWorkflow<'a> {
    directory: &'a Directory,
    attachments: &'a AttachmentIndex,
    template: MessageTemplate,
    log_location: PathBuf,
    phase: Phase,
    state: Option<ReviewState<'a>>,
    sent: usize,
    summary: Option<RunSummary>,
}

impl<'a> ReviewWorkflow<'a> {
    /// Starts at the first group, or directly in [`Phase::Done`] when the
    /// directory is empty.
    pub fn new(
        directory: &'a Directory,
        attachments: &'a AttachmentIndex,
        template: MessageTemplate,
        log_location: impl Into<PathBuf>,
    ) -> Self {
        let mut workflow = Self {
            directory,
            attachments,
            template,
            log_location: log_location.into(),
            phase: Phase::Done,
            state: None,
            sent: 0,
            summary: None,
        };
        workflow.enter(0);
        workflow
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Selection for the group under review; `None` once done.
    #[must_use]
    pub const fn current(&self) -> Option<&ReviewState<'a>> {
        self.state.as_ref()
    }

    /// Number of groups sent so far.
    #[must_use]
    pub const fn sent(&self) -> usize {
        self.sent
    }

    /// Number of groups in the run.
    #[must_use]
    pub fn total(&self) -> usize {
        self.directory.len()
    }

    /// Final totals; `None` until the workflow is done.
    #[must_use]
    pub const fn summary(&self) -> Option<&RunSummary> {
        self.summary.as_ref()
    }

    /// Returns true once every group has been handled.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        matches!(self.phase, Phase::Done)
    }

    /// Flips an entry of the current selection.
    ///
    /// Returns false when done or when `target` is out of range.
    pub fn toggle(&mut self, target: Target) -> bool {
        self.state.as_mut().is_some_and(|state| state.toggle(target))
    }

    /// The message [`confirm`](Self::confirm) would send right now.
    #[must_use]
    pub fn pending_message(&self) -> Option<GroupMessage> {
        self.state.as_ref().map(|state| state.message(&self.template))
    }

    /// Sends the current selection.
    ///
    /// On success the sent count goes up and the workflow advances. On
    /// failure it stays on the same group with the selection untouched, so
    /// the operator can adjust and retry or skip.
    pub async fn confirm<M: Mailer>(&mut self, mailer: &M) -> ConfirmOutcome {
        let Some(state) = &self.state else {
            return ConfirmOutcome::Finished;
        };
        let group = state.group().identity();
        let message = state.message(&self.template);
        tracing::debug!(
            to = %message.to,
            cc = %message.cc,
            attachments = message.attachments.len(),
            "sending {group}"
        );

        match mailer.send(&message).await {
            Ok(()) => {
                self.sent += 1;
                tracing::info!("{group} sent");
                self.advance();
                ConfirmOutcome::Sent { group }
            }
            Err(error) => {
                tracing::error!("{group} failed: {error}");
                ConfirmOutcome::Failed { group, error }
            }
        }
    }

    /// Leaves the current group unsent and advances.
    ///
    /// Returns false if the workflow was already done.
    pub fn skip(&mut self) -> bool {
        let Some(state) = &self.state else {
            return false;
        };
        tracing::warn!("{} skipped", state.group().identity());
        self.advance();
        true
    }

    fn advance(&mut self) {
        if let Phase::AtGroup(index) = self.phase {
            self.enter(index + 1);
        }
    }

    /// Moves to the group at `index`, or finishes the run past the last one.
    fn enter(&mut self, index: usize) {
        if let Some(group) = self.directory.group(index) {
            let state = ReviewState::new(group, self.attachments);
            tracing::debug!(
                recipients = state.recipients().len(),
                attachments = state.attachments().len(),
                "reviewing {} ({}/{})",
                group.identity(),
                index + 1,
                self.directory.len()
            );
            self.phase = Phase::AtGroup(index);
            self.state = Some(state);
            return;
        }

        self.phase = Phase::Done;
        self.state = None;
        let summary = RunSummary {
            groups: self.directory.len(),
            sent: self.sent,
            log_location: self.log_location.clone(),
        };
        tracing::info!(
            "review finished: {} of {} groups sent, log at {}",
            summary.sent,
            summary.groups,
            summary.log_location.display()
        );
        self.summary = Some(summary);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::attachment::AttachmentRecord;
    use crate::directory::{DepartmentRow, RecipientRow};

    #[derive(Default)]
    struct RecordingMailer {
        sent: RefCell<Vec<GroupMessage>>,
    }

    impl Mailer for RecordingMailer {
        async fn send(&self, message: &GroupMessage) -> Result<(), SendError> {
            self.sent.borrow_mut().push(message.clone());
            Ok(())
        }
    }

    struct FailingMailer;

    impl Mailer for FailingMailer {
        async fn send(&self, _message: &GroupMessage) -> Result<(), SendError> {
            Err(SendError::Rejected(groupmail_smtp::Error::rejected(
                554,
                "relay denied",
            )))
        }
    }

    fn department(group: &str, code: &str) -> DepartmentRow {
        DepartmentRow {
            group_code: group.into(),
            group_name: format!("{group}name"),
            department_code: code.into(),
            department_name: format!("{code}name"),
        }
    }

    fn person(name: &str, code: &str, cc: &str) -> RecipientRow {
        RecipientRow {
            full_name: name.into(),
            department_code: code.into(),
            department_name: String::new(),
            short_name: name.into(),
            cc_flag: cc.into(),
            address: format!("{name}@x.com"),
            note: String::new(),
        }
    }

    fn directory() -> Directory {
        Directory::from_rows(
            [department("G1", "D1"), department("G2", "D2"), department("G3", "D3")],
            [
                person("ann", "D1", ""),
                person("cat", "D1", "是"),
                person("bob", "D2", ""),
                person("dan", "D3", ""),
            ],
        )
        .unwrap()
    }

    fn index() -> AttachmentIndex {
        AttachmentIndex::from_records(vec![
            AttachmentRecord::new("000_all.pdf", "/out"),
            AttachmentRecord::new("D1_report.pdf", "/out"),
        ])
    }

    fn template() -> MessageTemplate {
        MessageTemplate::new("Budget", "See attached.")
    }

    #[test]
    fn empty_directory_starts_done() {
        let directory = Directory::default();
        let index = AttachmentIndex::empty();
        let workflow = ReviewWorkflow::new(&directory, &index, template(), "logs/run.txt");

        assert_eq!(workflow.phase(), Phase::Done);
        assert!(workflow.current().is_none());
        assert_eq!(
            workflow.summary(),
            Some(&RunSummary {
                groups: 0,
                sent: 0,
                log_location: PathBuf::from("logs/run.txt"),
            })
        );
    }

    #[test]
    fn starts_at_first_group_with_everything_included() {
        let directory = directory();
        let index = index();
        let workflow = ReviewWorkflow::new(&directory, &index, template(), "log");

        assert_eq!(workflow.phase(), Phase::AtGroup(0));
        assert!(workflow.summary().is_none());
        let state = workflow.current().unwrap();
        assert_eq!(state.group().code, "G1");
        assert_eq!(state.recipients().len(), 2);
        assert_eq!(state.attachments().len(), 2);
    }

    #[test]
    fn skips_visit_each_group_once_then_finish() {
        let directory = directory();
        let index = index();
        let mut workflow = ReviewWorkflow::new(&directory, &index, template(), "log");

        let mut visited = Vec::new();
        while let Phase::AtGroup(i) = workflow.phase() {
            visited.push(i);
            assert!(workflow.skip());
        }

        assert_eq!(visited, [0, 1, 2]);
        assert_eq!(workflow.sent(), 0);
        assert_eq!(workflow.summary().unwrap().groups, 3);
        assert_eq!(workflow.summary().unwrap().sent, 0);
        assert!(!workflow.skip());
    }

    #[tokio::test]
    async fn confirm_sends_and_advances() {
        let directory = directory();
        let index = index();
        let mailer = RecordingMailer::default();
        let mut workflow = ReviewWorkflow::new(&directory, &index, template(), "log");

        let outcome = workflow.confirm(&mailer).await;
        assert!(matches!(outcome, ConfirmOutcome::Sent { ref group } if group == "G1-G1name"));
        assert_eq!(workflow.phase(), Phase::AtGroup(1));
        assert_eq!(workflow.sent(), 1);

        let sent = mailer.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "ann@x.com");
        assert_eq!(sent[0].cc, "cat@x.com");
        assert_eq!(sent[0].subject, "Budget");
        assert_eq!(sent[0].body, "See attached.");
        assert_eq!(
            sent[0].attachments,
            [PathBuf::from("/out/000_all.pdf"), PathBuf::from("/out/D1_report.pdf")]
        );
    }

    #[tokio::test]
    async fn confirm_with_everything_excluded_still_sends() {
        let directory = directory();
        let index = index();
        let mailer = RecordingMailer::default();
        let mut workflow = ReviewWorkflow::new(&directory, &index, template(), "log");

        for i in 0..2 {
            assert!(workflow.toggle(Target::Recipient(i)));
            assert!(workflow.toggle(Target::Attachment(i)));
        }
        workflow.confirm(&mailer).await;

        let sent = mailer.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].to.is_empty());
        assert!(sent[0].cc.is_empty());
        assert!(sent[0].attachments.is_empty());
    }

    #[tokio::test]
    async fn failure_stays_on_group_with_selection_kept() {
        let directory = directory();
        let index = index();
        let mut workflow = ReviewWorkflow::new(&directory, &index, template(), "log");
        workflow.toggle(Target::Recipient(1));
        let before = workflow.pending_message();

        let outcome = workflow.confirm(&FailingMailer).await;
        assert!(matches!(
            outcome,
            ConfirmOutcome::Failed { ref group, .. } if group == "G1-G1name"
        ));
        assert_eq!(workflow.phase(), Phase::AtGroup(0));
        assert_eq!(workflow.sent(), 0);
        assert_eq!(workflow.pending_message(), before);

        let mailer = RecordingMailer::default();
        workflow.confirm(&mailer).await;
        assert_eq!(workflow.phase(), Phase::AtGroup(1));
        assert_eq!(mailer.sent.borrow()[0].cc, "");
    }

    #[test]
    fn overrides_do_not_carry_to_the_next_group() {
        let directory = Directory::from_rows(
            [department("G1", "D1"), department("G2", "D2")],
            [person("ann", "D1", ""), person("bob", "D2", "")],
        )
        .unwrap();
        let index = AttachmentIndex::empty();
        let mut workflow = ReviewWorkflow::new(&directory, &index, template(), "log");

        workflow.toggle(Target::Recipient(0));
        workflow.skip();
        assert!(workflow.current().unwrap().recipients()[0].included);
    }

    #[tokio::test]
    async fn last_group_finishes_with_summary() {
        let directory = directory();
        let index = index();
        let mailer = RecordingMailer::default();
        let mut workflow = ReviewWorkflow::new(&directory, &index, template(), "logs/x.txt");

        workflow.confirm(&mailer).await;
        workflow.skip();
        workflow.confirm(&mailer).await;

        assert!(workflow.is_done());
        let summary = workflow.summary().unwrap();
        assert_eq!(summary.groups, 3);
        assert_eq!(summary.sent, 2);
        assert_eq!(summary.log_location, PathBuf::from("logs/x.txt"));

        assert!(matches!(workflow.confirm(&mailer).await, ConfirmOutcome::Finished));
        assert!(!workflow.toggle(Target::Recipient(0)));
        assert!(workflow.pending_message().is_none());
        assert_eq!(mailer.sent.borrow().len(), 2);
    }

    #[test]
    fn skipping_last_group_keeps_count() {
        let directory =
            Directory::from_rows([department("G1", "D1")], Vec::<RecipientRow>::new()).unwrap();
        let index = AttachmentIndex::empty();
        let mut workflow = ReviewWorkflow::new(&directory, &index, template(), "log");

        assert!(workflow.skip());
        assert_eq!(workflow.phase(), Phase::Done);
        assert_eq!(workflow.summary().unwrap().sent, 0);
    }
}
