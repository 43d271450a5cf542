//! List picker shown when the TUI starts without an explicit list

use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use dotstore::ListInfo;
use tracing::debug;

/// What the picker wants after a key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerOutcome {
    /// Keep showing the picker
    Pending,
    /// Open the list at this path
    Open(PathBuf),
    /// Leave without opening a list
    Quit,
}

/// Keep only letters, digits, `-` and `_`
pub fn sanitize_list_name(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

/// Chooser over the named lists in a directory
#[derive(Debug, Clone)]
pub struct ListPicker {
    dir: PathBuf,
    lists: Vec<ListInfo>,
    selected: usize,
    /// Name being typed for a new list
    new_name: Option<String>,
    error: Option<String>,
}

impl ListPicker {
    pub fn new(dir: impl AsRef<Path>, lists: Vec<ListInfo>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            lists,
            selected: 0,
            new_name: None,
            error: None,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn lists(&self) -> &[ListInfo] {
        &self.lists
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn new_name(&self) -> Option<&str> {
        self.new_name.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PickerOutcome {
        debug!(?key, naming = self.new_name.is_some(), "ListPicker::handle_key: called");
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return PickerOutcome::Quit;
        }
        self.error = None;

        if self.new_name.is_some() {
            return self.handle_name_key(key);
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => PickerOutcome::Quit,
            KeyCode::Char('j') | KeyCode::Down => {
                if self.selected + 1 < self.lists.len() {
                    self.selected += 1;
                }
                PickerOutcome::Pending
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                PickerOutcome::Pending
            }
            KeyCode::Enter => match self.lists.get(self.selected) {
                Some(info) => PickerOutcome::Open(info.path.clone()),
                None => PickerOutcome::Pending,
            },
            KeyCode::Char('n') => {
                self.new_name = Some(String::new());
                PickerOutcome::Pending
            }
            _ => PickerOutcome::Pending,
        }
    }

    fn handle_name_key(&mut self, key: KeyEvent) -> PickerOutcome {
        let Some(buf) = self.new_name.as_mut() else {
            return PickerOutcome::Pending;
        };
        match key.code {
            KeyCode::Esc => self.new_name = None,
            KeyCode::Backspace => {
                buf.pop();
            }
            KeyCode::Char(c) => buf.push(c),
            KeyCode::Enter => {
                let name = sanitize_list_name(buf);
                self.new_name = None;
                if name.is_empty() {
                    self.error = Some("List names use letters, digits, - and _".to_string());
                } else {
                    debug!(%name, "ListPicker: new list");
                    return PickerOutcome::Open(dotstore::list_path(&self.dir, &name));
                }
            }
            _ => {}
        }
        PickerOutcome::Pending
    }
}
