//! Shared helpers for unit tests

use dotstore::{Task, TaskStatus};

/// Build a list from a compact status string: `o` open, `.` dotted, `x` done
pub fn list(pattern: &str) -> Vec<Task> {
    pattern
        .chars()
        .enumerate()
        .map(|(i, c)| {
            let status = match c {
                '.' => TaskStatus::Dotted,
                'x' => TaskStatus::Done,
                _ => TaskStatus::Open,
            };
            Task::with_status(format!("task {}", i + 1), status)
        })
        .collect()
}

/// Render a list back to its compact status string
pub fn pattern(tasks: &[Task]) -> String {
    tasks
        .iter()
        .map(|t| match t.status {
            TaskStatus::Open => 'o',
            TaskStatus::Dotted => '.',
            TaskStatus::Done => 'x',
        })
        .collect()
}
