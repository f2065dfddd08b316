//! The interactive review loop: reads operator commands, drives the
//! workflow and renders each step.

use std::io::Write;

use anyhow::Result;
use groupmail_core::{ConfirmOutcome, Mailer, Phase, ReviewWorkflow, Target};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::view;

/// One line of operator input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Flip a recipient or attachment.
    Toggle(Target),
    /// Send and advance.
    Confirm,
    /// Advance without sending.
    Skip,
    /// Stop the review.
    Quit,
    /// Show the command list.
    Help,
}

impl Command {
    /// Parses a command line. Entry numbers are 1-based, as displayed.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let verb = words.next()?;
        let argument = words.next();
        if words.next().is_some() {
            return None;
        }

        match (verb, argument) {
            ("y", None) => Some(Self::Confirm),
            ("s", None) => Some(Self::Skip),
            ("q", None) => Some(Self::Quit),
            ("?", None) => Some(Self::Help),
            ("r", Some(n)) => position(n).map(|i| Self::Toggle(Target::Recipient(i))),
            ("a", Some(n)) => position(n).map(|i| Self::Toggle(Target::Attachment(i))),
            _ => None,
        }
    }
}

fn position(number: &str) -> Option<usize> {
    number.parse::<usize>().ok()?.checked_sub(1)
}

/// How the review loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ending {
    /// Every group was sent or skipped.
    Finished,
    /// The operator quit, or input ran out, before the last group.
    Abandoned,
}

/// Runs the review until every group is handled or the operator quits.
///
/// End of input counts as quitting.
pub async fn run<M, R, W>(
    workflow: &mut ReviewWorkflow<'_>,
    mailer: &M,
    input: R,
    out: &mut W,
) -> Result<Ending>
where
    M: Mailer,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut show = true;

    while let Phase::AtGroup(index) = workflow.phase() {
        if show {
            if let Some(state) = workflow.current() {
                write!(out, "\n{}", view::review(state, index, workflow.total(), workflow.sent()))?;
            }
            show = false;
        }
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            tracing::info!("input closed, review stopped");
            return Ok(Ending::Abandoned);
        };

        match Command::parse(&line) {
            None => writeln!(out, "unknown command, type ? for help")?,
            Some(Command::Help) => writeln!(out, "{}", view::HELP)?,
            Some(Command::Quit) => {
                tracing::info!("review stopped by operator");
                return Ok(Ending::Abandoned);
            }
            Some(Command::Toggle(target)) => {
                if workflow.toggle(target) {
                    show = true;
                } else {
                    writeln!(out, "no such entry")?;
                }
            }
            Some(Command::Skip) => {
                workflow.skip();
                show = true;
            }
            Some(Command::Confirm) => match workflow.confirm(mailer).await {
                ConfirmOutcome::Sent { group } => {
                    writeln!(out, "{group}: sent")?;
                    show = true;
                }
                ConfirmOutcome::Failed { group, error } => {
                    writeln!(out, "{group}: {error}")?;
                    writeln!(out, "adjust and retry with y, or skip with s")?;
                }
                ConfirmOutcome::Finished => {}
            },
        }
    }

    if let Some(summary) = workflow.summary() {
        write!(out, "\n{}", view::summary(summary))?;
    }
    Ok(Ending::Finished)
}
