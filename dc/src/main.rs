//! fvp - dot-chain task list
//!
//! CLI entry point. Every command loads the list, applies one action, saves,
//! and prints a short confirmation. Running without a command opens the TUI.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;
use colored::{ColoredString, Colorize};
use eyre::{Context, Result};
use tracing::{debug, info};

use dotchain::cli::{Cli, Command, OutputFormat};
use dotchain::config::Config;
use dotchain::prompt::LineComparer;
use dotchain::tui::{self, ListPicker, TuiOptions};
use dotchain::{ListRow, ScanState, TaskList, list_rows};
use dotstore::TaskStatus;

fn parse_level(level: &str) -> tracing::Level {
    match level.to_uppercase().as_str() {
        "TRACE" => tracing::Level::TRACE,
        "DEBUG" => tracing::Level::DEBUG,
        "INFO" => tracing::Level::INFO,
        "WARN" | "WARNING" => tracing::Level::WARN,
        "ERROR" => tracing::Level::ERROR,
        _ => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", level);
            tracing::Level::INFO
        }
    }
}

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fvp")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > INFO
    let level = cli_log_level
        .or(config_log_level)
        .map(parse_level)
        .unwrap_or(tracing::Level::INFO);

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("fvp.log"))
        .context("Failed to open log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(cli.log_level.as_deref(), config.log_level.as_deref()).context("Failed to setup logging")?;

    let explicit = cli.file.is_some() || cli.list.is_some();
    let path = config.resolve_list_path(cli.file.as_deref(), cli.list.as_deref());
    debug!(path = %path.display(), command = ?cli.command, "main: dispatching command");

    match cli.command {
        Some(Command::List { all, format }) => cmd_list(&config, &path, all, format),
        Some(Command::Add { text }) => cmd_add(&config, &path, &text),
        Some(Command::Edit { index, text }) => cmd_edit(&config, &path, index, &text),
        Some(Command::Next) => cmd_next(&config, &path),
        Some(Command::Done { index }) => cmd_done(&config, &path, index),
        Some(Command::Stop { index }) => cmd_stop(&config, &path, index),
        Some(Command::Archive { index }) => cmd_archive(&config, &path, index),
        Some(Command::Reset) => cmd_reset(&config, &path),
        Some(Command::Clean) => cmd_clean(&config, &path),
        Some(Command::Shuffle) => cmd_shuffle(&config, &path),
        Some(Command::Path) => cmd_path(&config, &path),
        Some(Command::Lists) => cmd_lists(&config, &path),
        Some(Command::Tui) | None => cmd_tui(&config, &path, explicit).await,
    }
}

fn open(config: &Config, path: &Path) -> Result<TaskList> {
    TaskList::open(path, &config.archive_suffix)
}

fn colored_marker(status: TaskStatus) -> ColoredString {
    match status {
        TaskStatus::Open => status.marker().normal(),
        TaskStatus::Dotted => status.marker().yellow().bold(),
        TaskStatus::Done => status.marker().dimmed(),
    }
}

fn print_row(row: &ListRow) {
    let text = match row.status {
        TaskStatus::Open => row.text.normal(),
        TaskStatus::Dotted => row.text.bold(),
        TaskStatus::Done => row.text.dimmed(),
    };
    let mut line = format!("{:>3}. {} {}", row.index, colored_marker(row.status), text);
    if !row.flags.is_empty() {
        let flags: Vec<String> = row.flags.iter().map(|f| f.to_string()).collect();
        line.push_str(&format!("  {}", format!("<- {}", flags.join(", ")).cyan()));
    }
    println!("{}", line);
}

fn cmd_list(config: &Config, path: &Path, all: bool, format: OutputFormat) -> Result<()> {
    debug!(all, %format, "cmd_list: called");
    let list = open(config, path)?;
    let rows = list_rows(list.session(), all);

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if list.session().is_empty() {
        println!("(no tasks yet)");
        return Ok(());
    }
    if rows.is_empty() {
        println!("(no live tasks)");
        return Ok(());
    }
    for row in &rows {
        print_row(row);
    }
    Ok(())
}

fn cmd_add(config: &Config, path: &Path, text: &str) -> Result<()> {
    debug!(%text, "cmd_add: called");
    let mut list = open(config, path)?;
    let index = list.add(text)?;
    println!("{} [{}] {}", "Added:".green(), index, text.trim());
    Ok(())
}

fn cmd_edit(config: &Config, path: &Path, index: usize, text: &str) -> Result<()> {
    debug!(index, %text, "cmd_edit: called");
    let mut list = open(config, path)?;
    list.edit(index, text)?;
    println!("Edited {}.", index);
    Ok(())
}

fn cmd_next(config: &Config, path: &Path) -> Result<()> {
    debug!("cmd_next: called");
    let mut list = open(config, path)?;
    if list.session().live_count() == 0 {
        println!("(no live tasks)");
        return Ok(());
    }

    let stdin = io::stdin();
    let mut comparer = LineComparer::new(stdin.lock(), io::stdout());
    let scan = list.scan(&mut comparer)?;

    match scan.state() {
        ScanState::Resolved(Some(index)) => {
            let text = list.session().get(index).map(|t| t.text.as_str()).unwrap_or_default();
            println!("{} [{}] {}", "-> Do this now:".green().bold(), index, text);
        }
        ScanState::Resolved(None) => println!("(no live tasks)"),
        ScanState::Cancelled => println!("Scan stopped. Run `next` to resume."),
        ScanState::Stale => println!("{}", "Dots were stale; reset. Run `next` again.".yellow()),
        ScanState::Scanning(_) => {}
    }
    Ok(())
}

fn cmd_done(config: &Config, path: &Path, index: usize) -> Result<()> {
    debug!(index, "cmd_done: called");
    let mut list = open(config, path)?;
    let post = list.complete(index)?;
    if post.root_cleared {
        println!("Marked done: {}. (root finished -> dots reset)", index);
    } else {
        println!("Marked done: {}.", index);
    }
    Ok(())
}

fn cmd_stop(config: &Config, path: &Path, index: usize) -> Result<()> {
    debug!(index, "cmd_stop: called");
    let mut list = open(config, path)?;
    let stopped = list.stop_early(index)?;
    let suffix = if stopped.post.root_cleared {
        " (root finished -> dots reset)"
    } else {
        ""
    };
    println!(
        "Stopped and re-added at bottom: {} -> {}.{}",
        index, stopped.readded_index, suffix
    );
    Ok(())
}

fn cmd_archive(config: &Config, path: &Path, index: usize) -> Result<()> {
    debug!(index, "cmd_archive: called");
    let mut list = open(config, path)?;
    let archived = list.archive(index)?;
    println!(
        "Archived: {} -> {}{}",
        archived.text,
        list.archive_path().display(),
        if archived.root_cleared { " (root finished -> dots reset)" } else { "" }
    );
    Ok(())
}

fn cmd_reset(config: &Config, path: &Path) -> Result<()> {
    debug!("cmd_reset: called");
    open(config, path)?.reset()?;
    println!("Cleared dots and scanning state.");
    Ok(())
}

fn cmd_clean(config: &Config, path: &Path) -> Result<()> {
    debug!("cmd_clean: called");
    let removed = open(config, path)?.clean()?;
    println!("Removed {} crossed-out tasks. (Scanning state reset.)", removed);
    Ok(())
}

fn cmd_shuffle(config: &Config, path: &Path) -> Result<()> {
    debug!("cmd_shuffle: called");
    let mut list = open(config, path)?;
    list.shuffle()?;
    println!(
        "Shuffled {} live tasks. (Dots and scanning state cleared.)",
        list.session().live_count()
    );
    Ok(())
}

fn cmd_path(config: &Config, path: &Path) -> Result<()> {
    debug!("cmd_path: called");
    let list = open(config, path)?;
    println!("{}", list.absolute_path()?.display());
    Ok(())
}

fn cmd_lists(config: &Config, current: &Path) -> Result<()> {
    debug!(dir = %config.lists_dir.display(), "cmd_lists: called");
    let lists = dotstore::available_lists(&config.lists_dir)?;
    if lists.is_empty() {
        println!("(no lists in {})", config.lists_dir.display());
        return Ok(());
    }
    for info in &lists {
        let mark = if info.path.as_path() == current { "*" } else { " " };
        println!("{} {:<20} {:>4} live", mark, info.name, info.live);
    }
    Ok(())
}

async fn cmd_tui(config: &Config, path: &Path, explicit: bool) -> Result<()> {
    debug!(explicit, "cmd_tui: called");
    let options = TuiOptions {
        hide_done: config.hide_done,
        strict: config.strict,
    };
    if explicit {
        return tui::run(open(config, path)?, options).await;
    }

    // No list named: open the only one there is, or let the user choose
    let mut lists = dotstore::available_lists(&config.lists_dir)?;
    match lists.len() {
        0 => tui::run(open(config, path)?, options).await,
        1 => {
            let only = lists.remove(0);
            tui::run(open(config, &only.path)?, options).await
        }
        _ => {
            let picker = ListPicker::new(&config.lists_dir, lists);
            tui::run_with_picker(picker, &config.archive_suffix, options).await
        }
    }
}
