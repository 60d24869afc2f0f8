//! CLI definition and parsing.
//! Defines Args and provides parse() for command-line handling.

use std::path::PathBuf;

use clap::{Parser, ValueHint};

use crate::logging::LogLevel;

#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Rename or move files by editing their paths in a text editor"
)]
pub struct Args {
    /// Paths to rename or move. A single `-` reads newline-separated
    /// paths from standard input (this implies --non-interactive, since
    /// stdin is no longer available for prompts).
    #[arg(value_name = "PATH", required = true, value_hint = ValueHint::AnyPath)]
    pub paths: Vec<String>,

    /// Editor command line to use, with any desired options
    /// (overrides $VISUAL / $EDITOR).
    #[arg(short = 'e', long, value_name = "EDITOR")]
    pub editor: Option<String>,

    /// Present absolute paths in the editor.
    #[arg(long)]
    pub absolute: bool,

    /// Keep the input order instead of sorting the listing.
    #[arg(long)]
    pub keep_order: bool,

    /// Skip the preview and confirmation before applying moves.
    #[arg(long)]
    pub no_preview: bool,

    /// Never prompt; resolve every checkpoint with its documented
    /// default (collisions abort, rollback is automatic on failure).
    #[arg(short = 'n', long)]
    pub non_interactive: bool,

    /// Enable debug logging (shorthand for --log-level debug).
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Set log level: quiet, normal, info, debug.
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Append logs to this file as well as stderr.
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > normal.
    pub fn effective_log_level(&self) -> LogLevel {
        if self.debug {
            return LogLevel::Debug;
        }
        self.log_level
            .as_deref()
            .and_then(LogLevel::parse)
            .unwrap_or(LogLevel::Normal)
    }
}

pub fn parse() -> Args {
    Args::parse()
}
