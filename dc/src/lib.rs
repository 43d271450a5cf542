//! dotchain - Final Version Perfected task selection
//!
//! A task list is scanned top to bottom. The first unfinished task is dotted,
//! and each later task is compared against the most recently dotted one: if
//! you would rather do it, it gets a dot too. The last dot in the chain is
//! what to work on next. Finishing (or stopping) a task trims the chain back
//! and the next scan resumes just below it.
//!
//! # Modules
//!
//! - [`engine`] - Pure chain functions over a task slice
//! - [`session`] - List state and the action surface
//! - [`scan`] - Scan state machine and the [`scan::Comparer`] seam
//! - [`list`] - A session bound to its file
//! - [`prompt`] - Line-based comparer for the CLI
//! - [`report`] - List rows with ROOT / JUST-DID / BENCHMARK flags
//! - [`tui`] - Interactive terminal UI
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod engine;
pub mod list;
pub mod prompt;
pub mod report;
pub mod scan;
pub mod session;
pub mod tui;

#[cfg(test)]
mod testutil;

/// List used when neither `--list` nor `--file` is given
pub const DEFAULT_LIST: &str = "default";

/// Suffix appended to a list file path to form its archive log
pub const DEFAULT_ARCHIVE_SUFFIX: &str = ".archive";

pub use config::Config;
pub use engine::PostAction;
pub use list::TaskList;
pub use report::{Flag, ListRow, list_rows};
pub use scan::{Answer, Comparer, Comparison, Matchup, PassKind, Scan, ScanState};
pub use session::{ActionError, Archived, Session, Stopped};
