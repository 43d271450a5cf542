//! TUI views and rendering
//!
//! All rendering logic is contained here. Views read the App and never
//! modify it.

use dotstore::TaskStatus;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};
use tracing::trace;

use super::app::App;
use super::picker::ListPicker;
use super::state::{ConfirmDialog, InteractionMode, Phase};
use crate::report::{ListRow, list_rows};
use crate::scan::PassKind;

mod colors {
    use ratatui::style::Color;

    pub const DOTTED: Color = Color::Rgb(255, 215, 0); // Gold
    pub const DO_NOW: Color = Color::Rgb(0, 255, 127); // Spring green
    pub const ROOT: Color = Color::Rgb(100, 149, 237); // Cornflower blue
    pub const ERROR: Color = Color::Rgb(220, 20, 60); // Crimson
    pub const HEADER: Color = Color::Rgb(0, 255, 255); // Cyan
    pub const KEYBIND: Color = Color::Rgb(0, 255, 255); // Cyan
    pub const SELECTED_BG: Color = Color::Rgb(40, 40, 40);
    pub const DIM: Color = Color::DarkGray;
}

fn marker_style(status: TaskStatus) -> Style {
    match status {
        TaskStatus::Open => Style::default(),
        TaskStatus::Dotted => Style::default().fg(colors::DOTTED).add_modifier(Modifier::BOLD),
        TaskStatus::Done => Style::default().fg(colors::DIM),
    }
}

/// Main render function
pub fn render(app: &App, frame: &mut Frame) {
    trace!(mode = ?app.state().interaction_mode, "render: called");
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Task list
            Constraint::Length(3), // Footer
        ])
        .split(frame.area());

    render_header(app, frame, chunks[0]);
    match app.state().focus() {
        Some(index) => render_focus(app, index, frame, chunks[1]),
        None => render_task_table(app, frame, chunks[1]),
    }
    render_footer(app, frame, chunks[2]);

    match &app.state().interaction_mode {
        InteractionMode::Help => render_help_overlay(frame, frame.area()),
        InteractionMode::Confirm(dialog) => render_confirm_dialog(dialog, frame, frame.area()),
        InteractionMode::Scanning => render_scan_popup(app, frame, frame.area()),
        _ => {}
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let session = app.session();
    let name = app
        .list()
        .path()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut spans = vec![
        Span::styled(" fvp ", Style::default().fg(colors::HEADER).add_modifier(Modifier::BOLD)),
        Span::raw(format!(" {} ", name)),
        Span::styled(
            format!(" {} live / {} total", session.live_count(), session.len()),
            Style::default().fg(colors::DIM),
        ),
    ];
    let state = app.state();
    if state.strict {
        spans.push(Span::styled("  [strict]", Style::default().fg(colors::DOTTED)));
    } else if state.hide_done {
        spans.push(Span::styled("  [done hidden]", Style::default().fg(colors::DIM)));
    }
    if !state.filter.is_empty() {
        spans.push(Span::styled(
            format!("  /{}", state.filter),
            Style::default().fg(colors::KEYBIND),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

fn row_flags(row: &ListRow, do_now: Option<usize>) -> String {
    let mut flags: Vec<String> = row.flags.iter().map(|f| f.to_string()).collect();
    if do_now == Some(row.index) {
        flags.insert(0, "DO-NOW".to_string());
    }
    flags.join(" ")
}

fn render_task_table(app: &App, frame: &mut Frame, area: Rect) {
    let session = app.session();
    let visible = app.visible_indices();
    let rows: Vec<ListRow> = list_rows(session, true)
        .into_iter()
        .filter(|row| visible.contains(&row.index))
        .collect();
    let do_now = session.do_now_index();
    let root = session.root_index();
    let selected = app.state().selected;

    // Borders and the header row take three lines
    let height = area.height.saturating_sub(3).max(1) as usize;
    let offset = (selected + 1).saturating_sub(height);
    trace!(rows = rows.len(), selected, offset, "render_task_table: called");

    let table_rows: Vec<Row> = rows
        .iter()
        .enumerate()
        .skip(offset)
        .take(height)
        .map(|(pos, row)| {
            let text_style = if do_now == Some(row.index) {
                Style::default().fg(colors::DO_NOW).add_modifier(Modifier::BOLD)
            } else if root == Some(row.index) {
                Style::default().fg(colors::ROOT)
            } else if row.status == TaskStatus::Done {
                Style::default().fg(colors::DIM).add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default()
            };
            let row_style = if pos == selected {
                Style::default().bg(colors::SELECTED_BG)
            } else {
                Style::default()
            };

            Row::new(vec![
                Cell::from(format!("{:>3}", row.index)),
                Cell::from(Span::styled(row.status.marker(), marker_style(row.status))),
                Cell::from(Span::styled(row.text.clone(), text_style)),
                Cell::from(Span::styled(row_flags(row, do_now), Style::default().fg(colors::DIM))),
            ])
            .style(row_style)
        })
        .collect();

    let widths = [
        Constraint::Length(4),  // #
        Constraint::Length(3),  // Marker
        Constraint::Min(20),    // Task
        Constraint::Length(24), // Flags
    ];

    let title = match app.session().last_did() {
        Some(last_did) => format!(" Tasks (last did {}) ", last_did),
        None => " Tasks ".to_string(),
    };

    let table = Table::new(table_rows, widths)
        .header(
            Row::new(vec!["#", "", "TASK", "FLAGS"])
                .style(Style::default().add_modifier(Modifier::BOLD).fg(colors::HEADER)),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(colors::HEADER)),
        );

    frame.render_widget(table, area);

    if rows.is_empty() {
        let message = if session.is_empty() {
            "No tasks yet. Press a to add one."
        } else if !app.state().filter.is_empty() {
            "No tasks match the filter. Press / then Esc to clear it."
        } else if app.state().strict {
            "No live tasks. Press a to add one."
        } else {
            "No live tasks. Press h to show done tasks."
        };
        render_empty_message(frame, area, message);
    }
}

/// Strict-mode focus: the recommended task alone, centered
fn render_focus(app: &App, index: usize, frame: &mut Frame, area: Rect) {
    let text = app.session().get(index).map(|t| t.text.as_str()).unwrap_or_default();
    trace!(index, "render_focus: called");

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" >>> WORK ON THIS <<< ")
        .title_alignment(Alignment::Center)
        .border_style(Style::default().fg(colors::DO_NOW));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let top = inner.height / 3;
    let content = vec![
        Line::from(Span::styled(
            format!("[{}]", index),
            Style::default().fg(colors::DIM),
        )),
        Line::from(Span::styled(
            text,
            Style::default().fg(colors::DO_NOW).add_modifier(Modifier::BOLD),
        )),
    ];
    let body = Rect {
        y: inner.y + top,
        height: inner.height.saturating_sub(top),
        ..inner
    };
    let paragraph = Paragraph::new(content)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, body);
}

fn keybind_spans(binds: &[(&'static str, &'static str)]) -> Vec<Span<'static>> {
    let mut spans = vec![Span::raw(" ")];
    for (key, action) in binds {
        spans.push(Span::styled(
            *key,
            Style::default().fg(colors::KEYBIND).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(format!(" {} ", action)));
    }
    spans
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let state = app.state();
    let content = match &state.interaction_mode {
        InteractionMode::Input(kind, text) => Line::from(vec![
            Span::styled(
                kind.label(),
                Style::default().fg(colors::KEYBIND).add_modifier(Modifier::BOLD),
            ),
            Span::raw(text.as_str()),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
            Span::styled("  (Enter to save, Esc to cancel)", Style::default().fg(colors::DIM)),
        ]),
        InteractionMode::Scanning => Line::from(keybind_spans(&[
            ("[k/↑]", "Keep benchmark"),
            ("[j/↓]", "Prefer candidate"),
            ("[q/Esc]", "Stop scan"),
        ])),
        _ => match &state.status {
            Some(status) if status.is_error => Line::from(Span::styled(
                format!(" Error: {}", status.text),
                Style::default().fg(colors::ERROR),
            )),
            Some(status) => Line::from(Span::styled(
                format!(" {}", status.text),
                Style::default().fg(colors::HEADER),
            )),
            None if matches!(state.phase, Phase::Focus(_)) => Line::from(keybind_spans(&[
                ("[d]", "Done"),
                ("[D]", "Archive"),
                ("[S]", "Stop"),
                ("[a]", "Add"),
                ("[M]", "Free mode"),
                ("[q]", "Quit"),
            ])),
            None if state.strict => Line::from(keybind_spans(&[
                ("[s]", "Scan"),
                ("[a]", "Add"),
                ("[M]", "Free mode"),
                ("[?]", "Help"),
                ("[q]", "Quit"),
            ])),
            None => Line::from(keybind_spans(&[
                ("[s]", "Scan"),
                ("[d]", "Done"),
                ("[S]", "Stop"),
                ("[a]", "Add"),
                ("[e]", "Edit"),
                ("[/]", "Filter"),
                ("[?]", "Help"),
                ("[q]", "Quit"),
            ])),
        },
    };

    let footer = Paragraph::new(content).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}

/// Benchmark on top, candidate below, matching the k/j keys
fn render_scan_popup(app: &App, frame: &mut Frame, area: Rect) {
    let Some(scan) = app.scan() else {
        return;
    };
    let Some(matchup) = scan.pending().and_then(|cmp| cmp.matchup(app.session())) else {
        return;
    };
    trace!(
        candidate = matchup.candidate_index,
        benchmark = matchup.benchmark_index,
        "render_scan_popup: called"
    );

    let popup_area = centered_rect(70, 50, area);
    frame.render_widget(Clear, popup_area);

    let pass = match scan.pass() {
        PassKind::Fresh => "fresh pass",
        PassKind::Resume => "resuming",
    };
    let task_style = Style::default().add_modifier(Modifier::BOLD);

    let content = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  k/↑  ", Style::default().fg(colors::KEYBIND)),
            Span::styled("Benchmark", Style::default().fg(colors::DOTTED)),
        ]),
        Line::from(Span::styled(
            format!("       [{}] {}", matchup.benchmark_index, matchup.benchmark.text),
            task_style,
        )),
        Line::from(""),
        Line::from(Span::styled(
            "  Do you want to do this more?",
            Style::default().fg(colors::DIM),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("  j/↓  ", Style::default().fg(colors::KEYBIND)),
            Span::styled("Candidate", Style::default().fg(colors::DO_NOW)),
        ]),
        Line::from(Span::styled(
            format!("       [{}] {}", matchup.candidate_index, matchup.candidate.text),
            task_style,
        )),
        Line::from(""),
        Line::from(Span::styled(
            "  q/Esc: stop scan (dots so far are kept)",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let popup = Paragraph::new(content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Scan Compare ({}) ", pass))
                .style(Style::default().bg(Color::Black)),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(popup, popup_area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 80, area);
    frame.render_widget(Clear, popup_area);

    let section = |title: &'static str| {
        Line::from(Span::styled(title, Style::default().add_modifier(Modifier::BOLD)))
    };

    let help_text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
                .fg(colors::HEADER),
        )),
        Line::from(""),
        section("Navigation"),
        key_line("j/↓ k/↑", "Move down / up"),
        key_line("PgUp/PgDn", "Move a page"),
        key_line("g / G", "Go to top / bottom"),
        key_line("t", "Jump to root"),
        key_line("n", "Jump to the task to do now"),
        Line::from(""),
        section("Tasks"),
        key_line("s", "Scan (k keeps benchmark, j prefers candidate)"),
        key_line("a", "Add task"),
        key_line("e", "Edit selected"),
        key_line("d", "Mark selected done"),
        key_line("S", "Stop early (re-add at bottom)"),
        key_line("D", "Archive selected"),
        key_line("r", "Reset dots and scanning state"),
        key_line("c", "Clean crossed-out tasks"),
        Line::from(""),
        section("View"),
        key_line("M", "Strict mode: guided scan, then focus on one task"),
        key_line("/", "Filter by text (Esc clears)"),
        key_line("h", "Hide / show done tasks"),
        key_line("R", "Reload from disk"),
        key_line("?", "Toggle help"),
        key_line("q", "Quit"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help (? to close) ")
                .style(Style::default().bg(Color::Black)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(help, popup_area);
}

fn key_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{:<10}", key), Style::default().fg(colors::KEYBIND)),
        Span::raw(desc),
    ])
}

fn render_confirm_dialog(dialog: &ConfirmDialog, frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(50, 40, area);
    frame.render_widget(Clear, popup_area);

    let yes_style = if dialog.selected_button {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Green)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Green)
    };

    let no_style = if !dialog.selected_button {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Red)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Red)
    };

    let content = vec![
        Line::from(""),
        Line::from(dialog.message.as_str()),
        Line::from(""),
        Line::from(vec![
            Span::styled(" No ", no_style),
            Span::raw("    "),
            Span::styled(" Yes ", yes_style),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Tab/←→: switch  y: yes  Enter: confirm  Esc: cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let dialog_widget = Paragraph::new(content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Confirm ")
                .style(Style::default().bg(Color::Black)),
        )
        .alignment(Alignment::Center);

    frame.render_widget(dialog_widget, popup_area);
}

/// Startup list chooser
pub fn render_picker(picker: &ListPicker, frame: &mut Frame) {
    trace!(lists = picker.lists().len(), "render_picker: called");
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Lists
            Constraint::Length(3), // Footer
        ])
        .split(frame.area());

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " Select a task list ",
            Style::default().fg(colors::HEADER).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" Lists in {}", picker.dir().display()),
            Style::default().fg(colors::DIM),
        ),
    ]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, chunks[0]);

    let rows: Vec<Row> = picker
        .lists()
        .iter()
        .enumerate()
        .map(|(pos, info)| {
            let style = if pos == picker.selected() {
                Style::default().bg(colors::SELECTED_BG).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(info.name.clone()),
                Cell::from(Span::styled(
                    format!("{} live", info.live),
                    Style::default().fg(colors::DIM),
                )),
            ])
            .style(style)
        })
        .collect();
    let table = Table::new(rows, [Constraint::Min(20), Constraint::Length(12)]).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Lists ")
            .border_style(Style::default().fg(colors::HEADER)),
    );
    frame.render_widget(table, chunks[1]);

    let footer = match picker.error() {
        Some(error) => Line::from(Span::styled(format!(" Error: {}", error), Style::default().fg(colors::ERROR))),
        None => Line::from(keybind_spans(&[
            ("[j/k]", "Select"),
            ("[Enter]", "Open"),
            ("[n]", "New list"),
            ("[q]", "Quit"),
        ])),
    };
    frame.render_widget(Paragraph::new(footer).block(Block::default().borders(Borders::ALL)), chunks[2]);

    if let Some(name) = picker.new_name() {
        let popup_area = centered_rect(50, 20, frame.area());
        frame.render_widget(Clear, popup_area);
        let input = Paragraph::new(Line::from(vec![
            Span::styled("Name: ", Style::default().fg(colors::KEYBIND)),
            Span::raw(name),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" New list name ")
                .style(Style::default().bg(Color::Black)),
        );
        frame.render_widget(input, popup_area);
    }
}

fn render_empty_message(frame: &mut Frame, area: Rect, message: &str) {
    let inner = area.inner(Margin {
        horizontal: 2,
        vertical: 2,
    });

    let empty = Paragraph::new(message)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);

    frame.render_widget(empty, inner);
}

/// Helper to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
