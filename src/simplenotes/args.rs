use clap::{Args, Parser, Subcommand};

use crate::storage::SLOT_KEY;
use crate::utils::OutputFormat;

#[derive(Parser, Debug, Clone)]
#[command(name = "simplenotes")]
#[command(version)]
#[command(about = "a minimal note taking tool with a sidebar and an editor", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Folder holding the notes slot
    #[arg(long, env = "SIMPLENOTES_DIR")]
    pub data_dir: Option<String>,

    /// Key of the slot the notes are stored under
    #[arg(long, default_value = SLOT_KEY)]
    pub slot: String,

    /// Encryption key
    #[arg(short, long, env = "SIMPLENOTES_KEY", hide_env_values = true)]
    pub key: Option<String>,

    /// The slot is encrypted
    #[arg(long)]
    pub encrypted: bool,

    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, env = "SIMPLENOTES_LOG", default_value = "info")]
    pub log_level: String,

    /// Folder for log files (defaults to <data-dir>/logs)
    #[arg(long)]
    pub log_dir: Option<String>,
}

#[derive(Args, Debug, Clone, Copy, Default)]
pub struct FormatArgs {
    /// Output as JSON
    #[arg(long, conflicts_with = "yaml")]
    pub json: bool,

    /// Output as YAML
    #[arg(long)]
    pub yaml: bool,
}

impl FormatArgs {
    pub fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else if self.yaml {
            OutputFormat::Yaml
        } else {
            OutputFormat::Table
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Open the sidebar and editor (default if no command)
    Tui,

    /// Add a new note
    Add {
        /// Title of the note
        title: String,

        /// Body of the note
        #[arg(default_value = "")]
        body: String,

        /// Use editor to write body
        #[arg(short, long)]
        editor: bool,
    },

    /// Edit an existing note and move it to the top
    Edit {
        /// ID of the note to edit
        id: String,

        /// New title
        #[arg(short, long)]
        title: Option<String>,

        /// New body
        #[arg(short, long)]
        body: Option<String>,

        /// Use editor
        #[arg(short, long)]
        editor: bool,
    },

    /// Delete notes
    Del {
        /// ID(s) of the notes to delete
        #[arg(required = true)]
        id: Vec<String>,
    },

    /// List notes in their stored order
    List {
        /// Limit results
        #[arg(short, long)]
        limit: Option<usize>,

        /// Condensed output
        #[arg(short, long)]
        condensed: bool,

        #[command(flatten)]
        format: FormatArgs,
    },

    /// Search titles and bodies, ignoring case
    Search {
        /// Text to look for
        term: String,

        /// Treat the term as a regular expression
        #[arg(short, long)]
        regex: bool,

        /// Print matching bodies too
        #[arg(short = 'b', long)]
        show_body: bool,

        /// Limit results
        #[arg(short, long)]
        limit: Option<usize>,

        #[command(flatten)]
        format: FormatArgs,
    },

    /// Show a single note
    Show {
        /// Note ID
        id: String,

        #[command(flatten)]
        format: FormatArgs,
    },

    /// Show information about the notes slot
    Info,

    /// Delete all notes
    Clear,
}
