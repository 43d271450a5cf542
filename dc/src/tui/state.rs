//! TUI state types
//!
//! Everything the views need that is not part of the task list itself.

/// What a text input is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// New task appended at the bottom
    Add,
    /// Replace the text of the task at this index
    Edit(usize),
    /// Case-insensitive substring filter over task text
    Filter,
}

impl InputKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Add => "New Task: ",
            Self::Edit(_) => "Edit Task: ",
            Self::Filter => "Filter /",
        }
    }
}

/// Step of the strict-mode guided flow
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// The next scan starts on the next turn
    #[default]
    Idle,
    /// Scan popup open
    Scanning,
    /// Only the recommended task is shown; d/D/S act on it
    Focus(usize),
    /// Last scan ended without a recommendation
    Waiting,
}

/// Startup options for the TUI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TuiOptions {
    pub hide_done: bool,
    pub strict: bool,
}

impl Default for TuiOptions {
    fn default() -> Self {
        Self {
            hide_done: false,
            strict: true,
        }
    }
}

/// Action waiting on a confirmation dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    /// Remove every done task
    Clean,
}

/// Confirmation dialog state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmDialog {
    pub message: String,
    pub action: ConfirmAction,
    pub selected_button: bool, // false = No, true = Yes
}

impl ConfirmDialog {
    pub fn new(action: ConfirmAction, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            action,
            selected_button: false,
        }
    }
}

/// Current interaction mode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InteractionMode {
    /// Normal navigation mode
    #[default]
    Normal,
    /// Typing task text
    Input(InputKind, String),
    /// Confirmation dialog
    Confirm(ConfirmDialog),
    /// Help overlay
    Help,
    /// Scan popup waiting for an answer
    Scanning,
}

impl InteractionMode {
    /// Get mutable reference to the input buffer if in an input mode
    pub fn input_buffer_mut(&mut self) -> Option<&mut String> {
        match self {
            Self::Input(_, buf) => Some(buf),
            _ => None,
        }
    }
}

/// One-line message shown in the footer until the next key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

/// Rows moved by PgUp/PgDn before the first resize
const DEFAULT_PAGE_SIZE: usize = 10;

/// UI state that lives beside the task list
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Position of the cursor among the visible rows
    pub selected: usize,
    /// Rows moved by PgUp/PgDn
    pub page_size: usize,
    /// Hide done tasks
    pub hide_done: bool,
    /// Lowercased text filter; empty shows every row
    pub filter: String,
    /// Guided scan/focus flow
    pub strict: bool,
    pub phase: Phase,
    pub interaction_mode: InteractionMode,
    pub status: Option<StatusMessage>,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(options: TuiOptions) -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            // Strict mode always hides done tasks
            hide_done: options.hide_done || options.strict,
            strict: options.strict,
            ..Default::default()
        }
    }

    /// Task shown alone in the focus phase
    pub fn focus(&self) -> Option<usize> {
        match self.phase {
            Phase::Focus(index) => Some(index),
            _ => None,
        }
    }

    pub fn set_info(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: false,
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: true,
        });
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }
}
