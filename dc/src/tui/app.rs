//! TUI application - key handling over a task list
//!
//! The App owns the [`TaskList`] and the UI state and turns key presses into
//! list actions. It does not do any rendering; that's the views module.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use eyre::Result;
use tracing::{debug, info};

use super::state::{AppState, ConfirmAction, ConfirmDialog, InputKind, InteractionMode, Phase, TuiOptions};
use crate::list::TaskList;
use crate::scan::{Answer, Scan, ScanState};
use crate::session::Session;

/// TUI application
#[derive(Debug)]
pub struct App {
    list: TaskList,
    state: AppState,
    /// Scan in progress while the popup is open
    scan: Option<Scan>,
}

impl App {
    pub fn new(list: TaskList, options: TuiOptions) -> Self {
        debug!(?options, "App::new: called");
        Self {
            list,
            state: AppState::new(options),
            scan: None,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    pub fn session(&self) -> &Session {
        self.list.session()
    }

    pub fn list(&self) -> &TaskList {
        &self.list
    }

    pub fn scan(&self) -> Option<&Scan> {
        self.scan.as_ref()
    }

    /// 1-based indices of the rows currently shown, in list order
    pub fn visible_indices(&self) -> Vec<usize> {
        if let Some(focus) = self.state.focus() {
            return self.session().get(focus).map(|_| vec![focus]).unwrap_or_default();
        }
        let filter = self.state.filter.to_lowercase();
        self.session()
            .tasks()
            .iter()
            .enumerate()
            .filter(|(_, task)| !(self.state.hide_done && task.is_done()))
            .filter(|(_, task)| filter.is_empty() || task.text.to_lowercase().contains(&filter))
            .map(|(i, _)| i + 1)
            .collect()
    }

    /// Size PgUp/PgDn to the task table for a terminal `height` rows tall
    pub fn set_viewport_height(&mut self, height: u16) {
        // Header and footer take three rows each, the table frame three more
        self.state.page_size = usize::from(height).saturating_sub(9).max(1);
        debug!(page_size = self.state.page_size, "App::set_viewport_height");
    }

    /// Advance the strict-mode flow: an idle app starts the next scan
    pub fn guide(&mut self) {
        if !self.state.strict
            || self.state.should_quit
            || self.state.phase != Phase::Idle
            || self.state.interaction_mode != InteractionMode::Normal
        {
            return;
        }
        debug!("App::guide: starting scan");
        self.state.filter.clear();
        self.state.hide_done = true;
        self.state.phase = Phase::Scanning;
        self.start_scan();
    }

    /// Back to the start of the guided flow after an action changed the list
    fn rescan_if_strict(&mut self) {
        if self.state.strict {
            self.state.phase = Phase::Idle;
        }
    }

    /// Task index under the cursor
    pub fn selected_index(&self) -> Option<usize> {
        self.visible_indices().get(self.state.selected).copied()
    }

    /// Move the cursor to a task if it is visible
    pub fn select_task(&mut self, index: usize) {
        if let Some(pos) = self.visible_indices().iter().position(|&i| i == index) {
            self.state.selected = pos;
        }
    }

    fn clamp_selection(&mut self) {
        let count = self.visible_indices().len();
        self.state.selected = self.state.selected.min(count.saturating_sub(1));
    }

    /// Record an action's failure in the footer and drop the value
    fn report<T>(&mut self, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(error = %e, "App::report: action failed");
                self.state.set_error(e.to_string());
                None
            }
        }
    }

    /// Handle a key event
    ///
    /// Returns true if the application should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        debug!(?key, mode = ?self.state.interaction_mode, "App::handle_key: called");
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.state.should_quit = true;
            return true;
        }

        self.state.clear_status();

        match &self.state.interaction_mode {
            InteractionMode::Normal => self.handle_normal_key(key),
            InteractionMode::Input(..) => self.handle_input_key(key),
            InteractionMode::Confirm(_) => self.handle_confirm_key(key),
            InteractionMode::Help => self.handle_help_key(key),
            InteractionMode::Scanning => self.handle_scan_key(key),
        }
        self.guide();
        self.state.should_quit
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        if self.state.focus().is_some() {
            self.handle_focus_key(key);
            return;
        }

        let count = self.visible_indices().len();
        match key.code {
            KeyCode::Char('q') => self.state.should_quit = true,
            KeyCode::PageDown => {
                self.state.selected = (self.state.selected + self.state.page_size).min(count.saturating_sub(1));
            }
            KeyCode::PageUp => {
                self.state.selected = self.state.selected.saturating_sub(self.state.page_size);
            }
            KeyCode::Char('j') | KeyCode::Down => {
                if self.state.selected + 1 < count {
                    self.state.selected += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.state.selected = self.state.selected.saturating_sub(1);
            }
            KeyCode::Char('g') | KeyCode::Home => self.state.selected = 0,
            KeyCode::Char('G') | KeyCode::End => self.state.selected = count.saturating_sub(1),
            KeyCode::Char('t') => match self.session().root_index() {
                Some(root) => self.select_task(root),
                None => self.state.set_info("(no live tasks)"),
            },
            KeyCode::Char('n') => match self.session().do_now_index() {
                Some(target) => self.select_task(target),
                None => self.state.set_info("No dotted task yet. Press s to scan."),
            },
            KeyCode::Char('a') => {
                self.state.interaction_mode = InteractionMode::Input(InputKind::Add, String::new());
            }
            KeyCode::Char('e') => {
                if let Some(index) = self.selected_index()
                    && let Some(task) = self.session().get(index)
                {
                    let text = task.text.clone();
                    self.state.interaction_mode = InteractionMode::Input(InputKind::Edit(index), text);
                }
            }
            KeyCode::Char('d') => self.handle_done(),
            KeyCode::Char('D') => self.handle_archive(),
            KeyCode::Char('S') => self.handle_stop(),
            KeyCode::Char('r') => {
                let result = self.list.reset();
                if self.report(result).is_some() {
                    self.state.set_info("Cleared dots and scanning state.");
                    self.rescan_if_strict();
                }
            }
            KeyCode::Char('c') => {
                let done = self.session().len() - self.session().live_count();
                if done == 0 {
                    self.state.set_info("Nothing to clean.");
                } else {
                    self.state.interaction_mode = InteractionMode::Confirm(ConfirmDialog::new(
                        ConfirmAction::Clean,
                        format!("Remove {} crossed-out tasks?", done),
                    ));
                }
            }
            KeyCode::Char('h') if self.state.strict => {
                self.state
                    .set_info("Done tasks stay hidden in strict mode. Press M for free mode.");
            }
            KeyCode::Char('h') => {
                let current = self.selected_index();
                self.state.hide_done = !self.state.hide_done;
                self.reselect(current);
                self.state.set_info(if self.state.hide_done {
                    "Hide crossed-out ON."
                } else {
                    "Hide crossed-out OFF."
                });
            }
            KeyCode::Char('/') if self.state.strict => {
                self.state.set_info("Filter is off in strict mode. Press M for free mode.");
            }
            KeyCode::Char('/') => {
                let current = self.state.filter.clone();
                self.state.interaction_mode = InteractionMode::Input(InputKind::Filter, current);
            }
            KeyCode::Char('s') if self.state.strict => self.state.phase = Phase::Idle,
            KeyCode::Char('s') => self.start_scan(),
            KeyCode::Char('R') => self.handle_reload(),
            KeyCode::Char('M') => self.toggle_strict(),
            KeyCode::Char('?') => self.state.interaction_mode = InteractionMode::Help,
            _ => debug!("App::handle_normal_key: unhandled key"),
        }
    }

    /// Focus phase: only the shown task can be finished, stopped or archived
    fn handle_focus_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.state.should_quit = true,
            KeyCode::Char('d') => self.handle_done(),
            KeyCode::Char('D') => self.handle_archive(),
            KeyCode::Char('S') => self.handle_stop(),
            KeyCode::Char('a') => {
                self.state.interaction_mode = InteractionMode::Input(InputKind::Add, String::new());
            }
            KeyCode::Char('R') => self.handle_reload(),
            KeyCode::Char('M') => self.toggle_strict(),
            KeyCode::Char('?') => self.state.interaction_mode = InteractionMode::Help,
            _ => self.state.set_info("Work on this task: d done, D archive, S stop"),
        }
    }

    /// Keep the cursor on `index` if it is still shown
    fn reselect(&mut self, index: Option<usize>) {
        if let Some(index) = index {
            self.select_task(index);
        }
        self.clamp_selection();
    }

    fn handle_reload(&mut self) {
        let result = self.list.reload();
        if self.report(result).is_some() {
            if let Some(focus) = self.state.focus()
                && !self.session().get(focus).is_some_and(|t| t.is_live())
            {
                self.state.phase = Phase::Idle;
            }
            self.clamp_selection();
            self.state.set_info("Reloaded from disk.");
        }
    }

    fn toggle_strict(&mut self) {
        let current = self.selected_index();
        self.state.strict = !self.state.strict;
        self.state.phase = Phase::Idle;
        if self.state.strict {
            self.state.hide_done = true;
            self.state.filter.clear();
            self.state.set_info("Strict mode ON. Guided flow enabled.");
        } else {
            self.state.set_info("Strict mode OFF. Free navigation.");
        }
        info!(strict = self.state.strict, "App: strict mode toggled");
        self.reselect(current);
    }

    fn handle_done(&mut self) {
        let Some(index) = self.selected_index() else {
            return;
        };
        let result = self.list.complete(index);
        if let Some(post) = self.report(result) {
            if post.root_cleared {
                self.state.set_info(format!("Marked done: {}. (root finished -> dots reset)", index));
            } else {
                self.state.set_info(format!("Marked done: {}.", index));
            }
            self.rescan_if_strict();
            self.clamp_selection();
        }
    }

    fn handle_archive(&mut self) {
        let Some(index) = self.selected_index() else {
            return;
        };
        let result = self.list.archive(index);
        if let Some(archived) = self.report(result) {
            self.state.set_info(format!("Archived: {}", archived.text));
            self.rescan_if_strict();
            self.clamp_selection();
        }
    }

    fn handle_stop(&mut self) {
        let Some(index) = self.selected_index() else {
            return;
        };
        let result = self.list.stop_early(index);
        if let Some(stopped) = self.report(result) {
            self.state.set_info(format!(
                "Stopped and re-added at bottom: {} -> {}.",
                index, stopped.readded_index
            ));
            self.rescan_if_strict();
            self.clamp_selection();
        }
    }

    fn start_scan(&mut self) {
        if self.session().live_count() == 0 {
            self.finish_scan(ScanState::Resolved(None));
            return;
        }
        let result = self.list.begin_scan();
        let Some(scan) = self.report(result) else {
            self.end_phase(None);
            return;
        };
        if scan.state().is_finished() {
            self.finish_scan(scan.state());
        } else {
            debug!(pending = ?scan.pending(), "App::start_scan: scan started");
            self.scan = Some(scan);
            self.state.interaction_mode = InteractionMode::Scanning;
        }
    }

    fn handle_scan_key(&mut self, key: KeyEvent) {
        let answer = match key.code {
            KeyCode::Char('k') | KeyCode::Up => Answer::PreferBenchmark,
            KeyCode::Char('j') | KeyCode::Down => Answer::PreferCandidate,
            KeyCode::Char('q') | KeyCode::Esc => Answer::Cancel,
            _ => return,
        };
        let Some(mut scan) = self.scan.take() else {
            self.state.interaction_mode = InteractionMode::Normal;
            return;
        };

        let result = self.list.answer(&mut scan, answer);
        match self.report(result) {
            Some(state) if state.is_finished() => self.finish_scan(state),
            Some(_) => self.scan = Some(scan),
            None => {
                self.state.interaction_mode = InteractionMode::Normal;
                self.end_phase(None);
            }
        }
    }

    /// Leave the scanning phase, focusing `target` when there is one
    fn end_phase(&mut self, target: Option<usize>) {
        if self.state.strict {
            self.state.phase = match target {
                Some(index) => Phase::Focus(index),
                None => Phase::Waiting,
            };
            debug!(phase = ?self.state.phase, "App::end_phase");
        }
    }

    fn finish_scan(&mut self, state: ScanState) {
        info!(?state, "App::finish_scan");
        self.scan = None;
        self.state.interaction_mode = InteractionMode::Normal;
        let target = match state {
            ScanState::Resolved(target) => target,
            _ => None,
        };
        self.end_phase(target);
        self.clamp_selection();
        match state {
            ScanState::Resolved(Some(index)) => {
                self.select_task(index);
                let text = self.session().get(index).map(|t| t.text.clone()).unwrap_or_default();
                self.state.set_info(format!("-> Do this now: [{}] {}", index, text));
            }
            ScanState::Resolved(None) => self.state.set_info("(no live tasks)"),
            ScanState::Cancelled => self.state.set_info("Scan stopped. Press s to resume."),
            ScanState::Stale => self.state.set_error("Dots were stale; reset. Press s to scan again."),
            ScanState::Scanning(_) => {}
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                let mode = std::mem::take(&mut self.state.interaction_mode);
                if matches!(mode, InteractionMode::Input(InputKind::Filter, _)) {
                    self.apply_filter("");
                }
            }
            KeyCode::Enter => {
                let mode = std::mem::take(&mut self.state.interaction_mode);
                if let InteractionMode::Input(kind, text) = mode {
                    self.submit_input(kind, &text);
                }
            }
            KeyCode::Backspace => {
                if let Some(buf) = self.state.interaction_mode.input_buffer_mut() {
                    buf.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(buf) = self.state.interaction_mode.input_buffer_mut() {
                    buf.push(c);
                }
            }
            _ => {}
        }
    }

    fn submit_input(&mut self, kind: InputKind, text: &str) {
        debug!(?kind, %text, "App::submit_input: called");
        match kind {
            InputKind::Add => {
                let result = self.list.add(text);
                if let Some(index) = self.report(result) {
                    self.select_task(index);
                    self.state.set_info(format!("Added: [{}] {}", index, text.trim()));
                }
            }
            InputKind::Edit(index) => {
                let result = self.list.edit(index, text);
                if self.report(result).is_some() {
                    self.state.set_info(format!("Edited {}.", index));
                }
            }
            InputKind::Filter => self.apply_filter(text),
        }
    }

    fn apply_filter(&mut self, text: &str) {
        let current = self.selected_index();
        let had_filter = !self.state.filter.is_empty();
        self.state.filter = text.trim().to_lowercase();
        if self.state.filter.is_empty() {
            self.state.set_info(if had_filter { "Filter cleared." } else { "Filter cancelled." });
        } else {
            self.state.set_info(format!("Filter: /{}", self.state.filter));
        }
        self.reselect(current);
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.state.interaction_mode = InteractionMode::Normal;
            }
            KeyCode::Enter => {
                let mode = std::mem::take(&mut self.state.interaction_mode);
                if let InteractionMode::Confirm(dialog) = mode
                    && dialog.selected_button
                {
                    match dialog.action {
                        ConfirmAction::Clean => {
                            let result = self.list.clean();
                            if let Some(removed) = self.report(result) {
                                self.rescan_if_strict();
                                self.clamp_selection();
                                self.state
                                    .set_info(format!("Removed {} crossed-out tasks. (Scanning state reset.)", removed));
                            }
                        }
                    }
                }
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::Char('y') | KeyCode::Char('Y') => {
                if let InteractionMode::Confirm(dialog) = &mut self.state.interaction_mode {
                    if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
                        dialog.selected_button = true;
                    } else {
                        dialog.selected_button = !dialog.selected_button;
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_help_key(&mut self, key: KeyEvent) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            self.state.interaction_mode = InteractionMode::Normal;
        }
    }
}
