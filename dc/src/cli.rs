//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// fvp - dot-chain task list
#[derive(Parser, Debug)]
#[command(
    name = "fvp",
    version,
    about = "Dot-chain (Final Version Perfected) task list",
    after_help = "Run without a command to open the interactive TUI.\nINDEX numbers are exactly what `fvp list` shows (1-based, counting every task line)."
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Path to a tasks file (overrides --list)
    #[arg(short, long, global = true, help = "Path to a tasks file (overrides --list)")]
    pub file: Option<PathBuf>,

    /// Named list inside the lists directory
    #[arg(short = 'L', long, global = true, help = "Named list inside the lists directory")]
    pub list: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show tasks (hides crossed-out tasks by default)
    List {
        /// Show crossed-out tasks too
        #[arg(short, long)]
        all: bool,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },

    /// Append a new task
    Add {
        /// Task text, quoted if it has spaces
        text: String,
    },

    /// Edit task text in place
    Edit {
        /// Task index from `list`
        index: usize,

        /// New text
        text: String,
    },

    /// Interactive scan to recommend the next task
    Next,

    /// Mark a task done
    Done {
        /// Task index from `list`
        index: usize,
    },

    /// Stop early: cross out and re-add at the bottom
    #[command(visible_alias = "bump")]
    Stop {
        /// Task index from `list`
        index: usize,
    },

    /// Mark a task done, remove it and append it to the archive log
    Archive {
        /// Task index from `list`
        index: usize,
    },

    /// Wipe all dots and scanning state
    Reset,

    /// Remove all crossed-out tasks
    Clean,

    /// Shuffle live tasks (clears dots and scanning state)
    Shuffle,

    /// Print the absolute path to the tasks file
    Path,

    /// List named task lists
    Lists,

    /// Launch the interactive TUI
    Tui,
}

/// Output format for `list`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}
