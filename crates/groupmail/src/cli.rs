//! Command line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Settings file read when `--config` is not given.
pub const DEFAULT_CONFIG: &str = "conf/server.json";

#[derive(Parser, Debug)]
#[command(
    name = "groupmail",
    version,
    about = "Review and send department-specific mail to every group"
)]
pub struct Cli {
    /// Settings file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
    /// Roster file, overriding the settings.
    #[arg(long, global = true)]
    pub roster: Option<PathBuf>,
    /// Attachment directory, overriding the settings.
    #[arg(long, global = true)]
    pub attachments: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print every group with its departments, recipients and attachments.
    List,
    /// Review each group in turn and send its message.
    Send {
        /// Subject line for every message.
        #[arg(long)]
        subject: String,
        /// Body text.
        #[arg(long, conflicts_with = "body_file", required_unless_present = "body_file")]
        body: Option<String>,
        /// File holding the body text.
        #[arg(long)]
        body_file: Option<PathBuf>,
    },
}
