//! Interactive terminal UI
//!
//! A single-screen list view with vim-style keys. The scan runs in a popup,
//! one comparison per key press, and every answer is saved as it is given.
//! Strict mode (the default) guides the user from scan to a single focused
//! task and back. Without an explicit list, a picker chooses one first.

mod app;
mod events;
mod picker;
mod state;
mod views;

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use eyre::{Context, Result};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{debug, info, warn};

pub use app::App;
pub use events::{Event, EventHandler};
pub use picker::{ListPicker, PickerOutcome, sanitize_list_name};
pub use state::{AppState, ConfirmAction, ConfirmDialog, InputKind, InteractionMode, Phase, StatusMessage, TuiOptions};

use crate::list::TaskList;

/// Terminal type used by the TUI
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Redraw interval when idle
const TICK_RATE: Duration = Duration::from_millis(250);

/// Enter raw mode and the alternate screen
pub fn init() -> Result<Tui> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    execute!(io::stdout(), EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let terminal = Terminal::new(CrosstermBackend::new(io::stdout())).context("Failed to create terminal")?;
    debug!("tui::init: terminal ready");
    Ok(terminal)
}

/// Leave the alternate screen and raw mode
pub fn restore() -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(io::stdout(), LeaveAlternateScreen).context("Failed to leave alternate screen")?;
    debug!("tui::restore: terminal restored");
    Ok(())
}

/// Restores the terminal on every exit path, panics included
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = restore() {
            warn!("Failed to restore terminal: {:#}", e);
        }
    }
}

/// Run the TUI over a task list until the user quits
pub async fn run(list: TaskList, options: TuiOptions) -> Result<()> {
    info!(path = %list.path().display(), ?options, "Starting TUI");
    let mut terminal = init()?;
    let _guard = TerminalGuard;
    let mut events = EventHandler::new(TICK_RATE);

    let result = event_loop(&mut terminal, &mut events, App::new(list, options)).await;
    info!("TUI exited");
    result
}

/// Let the user pick a list, then run the TUI over it
pub async fn run_with_picker(mut picker: ListPicker, archive_suffix: &str, options: TuiOptions) -> Result<()> {
    info!(dir = %picker.dir().display(), lists = picker.lists().len(), "Starting TUI with list picker");
    let mut terminal = init()?;
    let _guard = TerminalGuard;
    let mut events = EventHandler::new(TICK_RATE);

    let path = loop {
        terminal.draw(|frame| views::render_picker(&picker, frame))?;
        if let Event::Key(key) = events.next().await? {
            match picker.handle_key(key) {
                PickerOutcome::Pending => {}
                PickerOutcome::Open(path) => break path,
                PickerOutcome::Quit => {
                    info!("List picker closed");
                    return Ok(());
                }
            }
        }
    };

    let list = TaskList::open(&path, archive_suffix)?;
    let result = event_loop(&mut terminal, &mut events, App::new(list, options)).await;
    info!("TUI exited");
    result
}

async fn event_loop(terminal: &mut Tui, events: &mut EventHandler, mut app: App) -> Result<()> {
    let size = terminal.size()?;
    app.set_viewport_height(size.height);
    app.guide();

    loop {
        terminal.draw(|frame| views::render(&app, frame))?;

        match events.next().await? {
            Event::Key(key) => {
                if app.handle_key(key) {
                    break;
                }
            }
            Event::Resize(width, height) => {
                debug!(width, height, "event_loop: resize");
                app.set_viewport_height(height);
            }
            Event::Tick => {}
        }
    }

    Ok(())
}
