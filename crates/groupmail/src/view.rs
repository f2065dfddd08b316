//! Plain text rendering of the directory and the review state.

use std::fmt::Write as _;

use groupmail_core::{AttachmentIndex, Directory, Included, ReviewState, RunSummary, matcher};

/// Operator commands, shown on `?`.
pub const HELP: &str = "\
  r <n>  include/exclude recipient n
  a <n>  include/exclude attachment n
  y      send this group's message and move on
  s      skip this group
  q      quit without finishing
  ?      show this help";

/// One block per group: departments, recipients and matched attachments.
#[must_use]
pub fn overview(directory: &Directory, index: &AttachmentIndex) -> String {
    let mut out = String::new();
    for group in directory.groups() {
        let attachments: Vec<_> = matcher::attachments(group, index)
            .iter()
            .map(|record| record.name())
            .collect();

        let _ = writeln!(out, "{}", group.identity());
        let _ = writeln!(out, "  departments: {}", group.department_summary());
        let _ = writeln!(out, "  recipients:  {}", group.recipient_summary());
        let _ = writeln!(out, "  attachments: {}", attachments.join(", "));
    }

    let counts = directory.counts();
    let _ = writeln!(
        out,
        "{} groups, {} departments, {} recipients, {} attachments",
        counts.groups,
        counts.departments,
        counts.recipients,
        index.len()
    );
    out
}

/// The group under review with numbered, checkable entries.
#[must_use]
pub fn review(state: &ReviewState<'_>, position: usize, total: usize, sent: usize) -> String {
    let group = state.group();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "[{}/{total}] {}  (sent so far: {sent})",
        position + 1,
        group.identity()
    );
    let _ = writeln!(out, "departments: {}", group.department_summary());

    out.push_str("recipients:\n");
    for (i, entry) in state.recipients().iter().enumerate() {
        let _ = writeln!(out, "  {} r{} {}", mark(entry), i + 1, entry.item.label());
    }
    if state.recipients().is_empty() {
        out.push_str("  (none)\n");
    }

    out.push_str("attachments:\n");
    for (i, entry) in state.attachments().iter().enumerate() {
        let _ = writeln!(out, "  {} a{} {}", mark(entry), i + 1, entry.item.name());
    }
    if state.attachments().is_empty() {
        out.push_str("  (none)\n");
    }
    out
}

/// Closing lines once every group is handled.
#[must_use]
pub fn summary(summary: &RunSummary) -> String {
    format!(
        "Done: {} of {} groups sent.\nLog: {}\n",
        summary.sent,
        summary.groups,
        summary.log_location.display()
    )
}

const fn mark<T>(entry: &Included<T>) -> &'static str {
    if entry.included { "[x]" } else { "[ ]" }
}
