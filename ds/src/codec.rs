//! Line codec for the plain-text list format
//!
//! ```text
//! # FVP_STATE last_did=3
//! [ ] open task
//! [.] dotted task
//! [x] crossed-out task
//! ```
//!
//! Decoding is a strict marker parse with an explicit fallback: any non-blank
//! line that does not look like `[m] text` becomes an open task whose text is
//! the whole trimmed line.

use tracing::debug;

use crate::task::{Task, TaskStatus};

/// Prefix identifying the state header line
pub const STATE_PREFIX: &str = "# FVP_STATE";

/// Value written for an absent pointer
pub const ABSENT_POINTER: i64 = -1;

/// Decoded contents of a list file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// 1-based index of the task most recently acted upon, if any
    pub last_did: Option<usize>,
    /// Tasks in list order
    pub tasks: Vec<Task>,
}

impl Snapshot {
    pub fn new(last_did: Option<usize>, tasks: Vec<Task>) -> Self {
        Self { last_did, tasks }
    }
}

/// Normalize a pointer against a list length: anything outside `[1, len]` is absent
pub fn normalize_pointer(last_did: Option<usize>, len: usize) -> Option<usize> {
    last_did.filter(|&idx| idx >= 1 && idx <= len)
}

/// Parse the value of a `# FVP_STATE last_did=N` header.
///
/// Returns `None` for a malformed header or a value below 1.
fn decode_header(line: &str) -> Option<usize> {
    let rest = line.trim().strip_prefix('#')?.trim_start();
    let rest = rest.strip_prefix("FVP_STATE")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let value = rest.trim().strip_prefix("last_did=")?;
    let value: i64 = value.parse().ok()?;
    usize::try_from(value).ok().filter(|&v| v >= 1)
}

/// Attempt a strict `[m] text` parse, returning the mark and the trimmed text
fn parse_marker(line: &str) -> Option<(Option<char>, &str)> {
    let rest = line.trim_start().strip_prefix('[')?;
    let mut chars = rest.chars();
    let first = chars.next()?;

    // A single mark character followed by `]` wins over an empty bracket pair
    if let Some(after) = chars.as_str().strip_prefix(']') {
        return Some((Some(first), after.trim()));
    }
    rest.strip_prefix(']').map(|after| (None, after.trim()))
}

/// Decode one non-header line into a task.
///
/// Returns `None` for blank lines and for marker lines with no text.
pub fn decode_line(line: &str) -> Option<Task> {
    if line.trim().is_empty() {
        return None;
    }

    match parse_marker(line) {
        Some((_, "")) => {
            debug!(line, "decode_line: marker without text, skipping");
            None
        }
        Some((mark, text)) => Some(Task::with_status(text, TaskStatus::from_mark(mark))),
        None => Some(Task::new(line)),
    }
}

/// Decode a whole file.
pub fn decode(content: &str) -> Snapshot {
    let mut lines = content.lines().peekable();

    let mut last_did = None;
    if let Some(first) = lines.peek()
        && first.starts_with(STATE_PREFIX)
    {
        last_did = decode_header(first);
        lines.next();
    }

    let tasks: Vec<Task> = lines.filter_map(decode_line).collect();
    let last_did = normalize_pointer(last_did, tasks.len());

    Snapshot { last_did, tasks }
}

/// Encode the state header, writing an absent or out-of-range pointer as -1
pub fn encode_header(last_did: Option<usize>, len: usize) -> String {
    match normalize_pointer(last_did, len) {
        Some(idx) => format!("{} last_did={}", STATE_PREFIX, idx),
        None => format!("{} last_did={}", STATE_PREFIX, ABSENT_POINTER),
    }
}

/// Encode a single task line
pub fn encode_task(task: &Task) -> String {
    format!("{} {}", task.status.marker(), task.text)
}

/// Encode a whole file
pub fn encode(last_did: Option<usize>, tasks: &[Task]) -> String {
    let mut out = encode_header(last_did, tasks.len());
    out.push('\n');
    for task in tasks {
        out.push_str(&encode_task(task));
        out.push('\n');
    }
    out
}
