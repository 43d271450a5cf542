//! List rendering shared by the CLI output formats

use dotstore::TaskStatus;
use serde::Serialize;

use crate::session::Session;

/// Annotation shown next to a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Flag {
    Root,
    JustDid,
    Benchmark,
}

impl std::fmt::Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Root => write!(f, "ROOT"),
            Self::JustDid => write!(f, "JUST-DID"),
            Self::Benchmark => write!(f, "BENCHMARK"),
        }
    }
}

/// One displayed row of a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListRow {
    pub index: usize,
    pub text: String,
    pub status: TaskStatus,
    pub flags: Vec<Flag>,
}

impl ListRow {
    /// Plain-text rendering: `  3. [.] text  <- ROOT, BENCHMARK`
    pub fn to_line(&self) -> String {
        let mut line = format!("{:>3}. {} {}", self.index, self.status.marker(), self.text);
        if !self.flags.is_empty() {
            let flags: Vec<String> = self.flags.iter().map(Flag::to_string).collect();
            line.push_str("  <- ");
            line.push_str(&flags.join(", "));
        }
        line
    }
}

/// Rows for a session, hiding done tasks unless `show_done`
pub fn list_rows(session: &Session, show_done: bool) -> Vec<ListRow> {
    let root = session.root_index();
    let last_did = session.last_did();
    let benchmark = session.benchmark_index();

    session
        .tasks()
        .iter()
        .enumerate()
        .map(|(i, task)| (i + 1, task))
        .filter(|(_, task)| show_done || !task.is_done())
        .map(|(index, task)| {
            let mut flags = Vec::new();
            if root == Some(index) {
                flags.push(Flag::Root);
            }
            if last_did == Some(index) {
                flags.push(Flag::JustDid);
            }
            if benchmark == Some(index) {
                flags.push(Flag::Benchmark);
            }
            ListRow {
                index,
                text: task.text.clone(),
                status: task.status,
                flags,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::list;

    #[test]
    fn test_rows_hide_done_by_default() {
        let session = Session::new(list("x.o"), None);
        let rows = list_rows(&session, false);
        let indices: Vec<usize> = rows.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![2, 3]);

        assert_eq!(list_rows(&session, true).len(), 3);
    }

    #[test]
    fn test_rows_flags() {
        let session = Session::new(list(".ox."), Some(3));
        let rows = list_rows(&session, true);
        assert_eq!(rows[0].flags, vec![Flag::Root, Flag::Benchmark]);
        assert_eq!(rows[2].flags, vec![Flag::JustDid]);
        assert!(rows[3].flags.is_empty());
    }

    #[test]
    fn test_row_to_line() {
        let session = Session::new(list(".o"), None);
        let rows = list_rows(&session, false);
        assert_eq!(rows[0].to_line(), "  1. [.] task 1  <- ROOT");
        assert_eq!(rows[1].to_line(), "  2. [ ] task 2");
    }

    #[test]
    fn test_row_json() {
        let session = Session::new(list("."), None);
        let json = serde_json::to_string(&list_rows(&session, false)).unwrap();
        assert_eq!(
            json,
            r#"[{"index":1,"text":"task 1","status":"dotted","flags":["root"]}]"#
        );
    }
}
