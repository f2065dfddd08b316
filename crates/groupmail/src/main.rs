//! `groupmail` - review and send department-specific mail to every group.
//!
//! Loads the settings, roster and attachment directory, then either prints
//! the overview (`list`) or walks the operator through each group (`send`).

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod cli;
mod session;
mod view;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use groupmail_core::{
    AttachmentIndex, Directory, MessageTemplate, ReviewWorkflow, RunLog, Roster, Settings,
    SmtpMailer,
};
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::{
    EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

use cli::{Cli, Commands};
use session::Ending;

/// Timestamp format of run log lines.
const LOG_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// What the run log file records.
const FILE_FILTER: &str = "groupmail=debug,groupmail_core=debug,groupmail_smtp=debug";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::read(&cli.config)
        .await
        .with_context(|| format!("reading settings from {}", cli.config.display()))?;
    if let Some(roster) = cli.roster {
        settings.roster = roster;
    }
    if let Some(attachments) = cli.attachments {
        settings.attachments = Some(attachments);
    }

    match cli.command {
        Commands::List => {
            init_console_logging();
            let (directory, index) = load(&settings).await?;
            print!("{}", view::overview(&directory, &index));
            Ok(())
        }
        Commands::Send {
            subject,
            body,
            body_file,
        } => {
            settings
                .validate()
                .with_context(|| format!("checking settings in {}", cli.config.display()))?;
            let body = match (body, body_file) {
                (Some(body), _) => body,
                (None, Some(path)) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("reading body from {}", path.display()))?,
                (None, None) => String::new(),
            };

            let run_log = init_logging(&settings.log_dir)?;
            info!("Starting groupmail, log at {run_log}");
            let (directory, index) = load(&settings).await?;
            let template = MessageTemplate::new(subject, body);
            send(&settings, &directory, &index, template, &run_log).await
        }
    }
}

/// Loads the roster and scans the attachment directory.
async fn load(settings: &Settings) -> Result<(Directory, AttachmentIndex)> {
    let directory = Roster::load(&settings.roster)
        .await?
        .into_directory()
        .context("building directory from roster")?;
    let counts = directory.counts();
    info!(
        "Loaded {} groups, {} departments, {} recipients",
        counts.groups, counts.departments, counts.recipients
    );

    let index = AttachmentIndex::scan(settings.attachments.as_deref())?;
    info!("Found {} attachments", index.len());
    Ok((directory, index))
}

async fn send(
    settings: &Settings,
    directory: &Directory,
    index: &AttachmentIndex,
    template: MessageTemplate,
    run_log: &RunLog,
) -> Result<()> {
    let mailer = SmtpMailer::from_settings(settings);
    info!(
        "Sending as {} through {}:{} ({})",
        settings.sender,
        settings.smtp.host,
        settings.smtp.effective_port(),
        settings.smtp.security.display_name()
    );
    let mut workflow = ReviewWorkflow::new(directory, index, template, run_log.path());

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    println!("{}", view::HELP);
    match session::run(&mut workflow, &mailer, stdin, &mut stdout).await? {
        Ending::Finished => {}
        Ending::Abandoned => println!(
            "\nStopped with {} of {} groups sent. Log: {run_log}",
            workflow.sent(),
            workflow.total()
        ),
    }
    Ok(())
}

fn console_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_console_logging() {
    let console_layer = fmt::layer()
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(console_filter());

    tracing_subscriber::registry().with(console_layer).init();
}

/// Installs console logging plus a fresh log file for this run.
fn init_logging(log_dir: &Path) -> Result<RunLog> {
    let (run_log, file) = RunLog::create(log_dir, Local::now().naive_local())
        .with_context(|| format!("creating run log in {}", log_dir.display()))?;

    let file_layer = fmt::layer()
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_timer(ChronoLocal::new(LOG_TIME_FORMAT.to_string()))
        .with_filter(EnvFilter::new(FILE_FILTER));

    let console_layer = fmt::layer()
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(console_filter());

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
    Ok(run_log)
}
