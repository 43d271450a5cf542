//! Session state and the action surface
//!
//! A [`Session`] is the whole mutable state of one list: the tasks and the
//! `last_did` pointer. Shells load one from a store, call actions on it, and
//! save it back. Every action validates before touching any field, so a
//! rejected action leaves the session unchanged.

use dotstore::{Snapshot, Task, TaskStatus, normalize_pointer};
use thiserror::Error;
use tracing::debug;

use crate::engine::{self, PostAction};

/// Errors from rejected actions
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("Index {index} out of range (1-{len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Task {index} is already done")]
    NotLive { index: usize },

    #[error("Task text cannot be empty")]
    EmptyText,

    #[error("No tasks in list")]
    EmptyList,
}

/// Outcome of a stop-early action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stopped {
    /// Index of the re-added copy at the bottom of the list
    pub readded_index: usize,
    pub post: PostAction,
}

/// Outcome of an archive action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archived {
    /// Text of the removed task, for the archive log
    pub text: String,
    pub root_cleared: bool,
}

/// In-memory state of one task list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    tasks: Vec<Task>,
    last_did: Option<usize>,
}

impl From<Snapshot> for Session {
    fn from(snapshot: Snapshot) -> Self {
        Self::new(snapshot.tasks, snapshot.last_did)
    }
}

impl Session {
    /// Create a session, normalizing an out-of-range pointer to absent
    pub fn new(tasks: Vec<Task>, last_did: Option<usize>) -> Self {
        let last_did = normalize_pointer(last_did, tasks.len());
        Self { tasks, last_did }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Task at a 1-based index
    pub fn get(&self, index: usize) -> Option<&Task> {
        index.checked_sub(1).and_then(|i| self.tasks.get(i))
    }

    pub fn last_did(&self) -> Option<usize> {
        self.last_did
    }

    pub fn live_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_live()).count()
    }

    pub fn root_index(&self) -> Option<usize> {
        engine::root_index(&self.tasks)
    }

    pub fn lowest_dotted_index(&self) -> Option<usize> {
        engine::lowest_dotted_index(&self.tasks)
    }

    /// Benchmark for the resume pass: nearest dot above the pointer
    pub fn benchmark_index(&self) -> Option<usize> {
        self.last_did.and_then(|idx| engine::nearest_dotted_above(&self.tasks, idx))
    }

    pub fn do_now_index(&self) -> Option<usize> {
        engine::do_now_index(&self.tasks, self.last_did)
    }

    /// Clone the state out for persistence
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.last_did, self.tasks.clone())
    }

    pub(crate) fn tasks_mut(&mut self) -> &mut [Task] {
        &mut self.tasks
    }

    pub(crate) fn set_last_did(&mut self, last_did: Option<usize>) {
        self.last_did = normalize_pointer(last_did, self.tasks.len());
    }

    /// Drop a pointer that no longer fits the list
    pub(crate) fn normalize_pointer(&mut self) {
        self.last_did = normalize_pointer(self.last_did, self.tasks.len());
    }

    fn check_index(&self, index: usize) -> Result<(), ActionError> {
        if self.tasks.is_empty() {
            return Err(ActionError::EmptyList);
        }
        if index < 1 || index > self.tasks.len() {
            return Err(ActionError::IndexOutOfRange {
                index,
                len: self.tasks.len(),
            });
        }
        Ok(())
    }

    fn check_live(&self, index: usize) -> Result<(), ActionError> {
        self.check_index(index)?;
        if self.tasks[index - 1].is_done() {
            return Err(ActionError::NotLive { index });
        }
        Ok(())
    }

    fn clean_text(text: &str) -> Result<&str, ActionError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ActionError::EmptyText);
        }
        Ok(text)
    }

    /// Append a new open task; returns its index
    pub fn add(&mut self, text: &str) -> Result<usize, ActionError> {
        let text = Self::clean_text(text)?;
        self.tasks.push(Task::new(text));
        debug!(index = self.tasks.len(), "add: appended task");
        Ok(self.tasks.len())
    }

    /// Replace the text of any task in place, keeping its status
    pub fn edit(&mut self, index: usize, text: &str) -> Result<(), ActionError> {
        self.check_index(index)?;
        let text = Self::clean_text(text)?;
        self.tasks[index - 1].text = text.to_string();
        debug!(index, "edit: replaced text");
        Ok(())
    }

    /// Cross out a live task as finished
    pub fn complete(&mut self, index: usize) -> Result<PostAction, ActionError> {
        self.check_live(index)?;
        self.tasks[index - 1].status = TaskStatus::Done;
        let post = engine::apply_post_action(&mut self.tasks, index);
        self.last_did = post.last_did;
        debug!(index, ?post, "complete: task done");
        Ok(post)
    }

    /// Cross out a live task and re-add a fresh copy at the bottom
    pub fn stop_early(&mut self, index: usize) -> Result<Stopped, ActionError> {
        self.check_live(index)?;
        let text = self.tasks[index - 1].text.clone();
        self.tasks[index - 1].status = TaskStatus::Done;
        self.tasks.push(Task::new(text));
        let post = engine::apply_post_action(&mut self.tasks, index);
        self.last_did = post.last_did;
        debug!(index, readded = self.tasks.len(), ?post, "stop_early: task re-added");
        Ok(Stopped {
            readded_index: self.tasks.len(),
            post,
        })
    }

    /// Clear every dot and the pointer
    pub fn reset(&mut self) {
        engine::clear_all_dots(&mut self.tasks);
        self.last_did = None;
        debug!("reset: cleared dots and pointer");
    }

    /// Remove every done task; returns how many were removed
    pub fn clean(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(Task::is_live);
        self.last_did = None;
        let removed = before - self.tasks.len();
        debug!(removed, "clean: removed done tasks");
        removed
    }

    /// Complete a live task and remove it from the list.
    ///
    /// The pointer, when it survives, moves to the slot just above the removed
    /// task (clamped to the new length).
    pub fn archive(&mut self, index: usize) -> Result<Archived, ActionError> {
        self.check_live(index)?;
        self.tasks[index - 1].status = TaskStatus::Done;
        let post = engine::apply_post_action(&mut self.tasks, index);
        let removed = self.tasks.remove(index - 1);

        self.last_did = match post.last_did {
            None => None,
            Some(_) if index > 1 => Some((index - 1).min(self.tasks.len())),
            Some(_) => None,
        };
        debug!(index, last_did = ?self.last_did, "archive: task removed");

        Ok(Archived {
            text: removed.text,
            root_cleared: post.root_cleared,
        })
    }

    /// Shuffle live tasks and drop all scan state
    pub fn shuffle(&mut self) {
        engine::shuffle_tasks(&mut self.tasks);
        self.last_did = None;
        debug!("shuffle: reordered live tasks");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{list, pattern};

    #[test]
    fn test_new_normalizes_pointer() {
        assert_eq!(Session::new(list("xo"), Some(3)).last_did(), None);
        assert_eq!(Session::new(list("xo"), Some(0)).last_did(), None);
        assert_eq!(Session::new(list("xo"), Some(1)).last_did(), Some(1));
    }

    #[test]
    fn test_add_trims_and_rejects_empty() {
        let mut session = Session::default();
        assert_eq!(session.add("  buy milk "), Ok(1));
        assert_eq!(session.tasks()[0], Task::new("buy milk"));
        assert_eq!(session.add("   "), Err(ActionError::EmptyText));
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn test_edit_keeps_status() {
        let mut session = Session::new(list("x.o"), None);
        session.edit(2, " renamed ").unwrap();
        assert_eq!(session.get(2).unwrap().text, "renamed");
        assert!(session.get(2).unwrap().is_dotted());

        // Done tasks may be edited too
        session.edit(1, "old").unwrap();
        assert_eq!(session.get(1).unwrap().text, "old");
    }

    #[test]
    fn test_edit_rejects_bad_input() {
        let mut session = Session::new(list("oo"), None);
        assert_eq!(
            session.edit(3, "x"),
            Err(ActionError::IndexOutOfRange { index: 3, len: 2 })
        );
        assert_eq!(session.edit(1, ""), Err(ActionError::EmptyText));
        assert_eq!(session.get(1).unwrap().text, "task 1");
    }

    #[test]
    fn test_complete_root_clears_chain() {
        let mut session = Session::new(list(".o.o"), None);
        let post = session.complete(1).unwrap();
        assert!(post.root_cleared);
        assert_eq!(pattern(session.tasks()), "xooo");
        assert_eq!(session.last_did(), None);
    }

    #[test]
    fn test_complete_below_chain_sets_pointer() {
        let mut session = Session::new(list(".o.o"), None);
        let post = session.complete(3).unwrap();
        assert!(!post.root_cleared);
        assert_eq!(pattern(session.tasks()), ".oxo");
        assert_eq!(session.last_did(), Some(3));
    }

    #[test]
    fn test_complete_rejects_invalid_targets() {
        let mut session = Session::new(list(".xo"), None);
        let before = session.clone();

        assert_eq!(session.complete(2), Err(ActionError::NotLive { index: 2 }));
        assert_eq!(
            session.complete(0),
            Err(ActionError::IndexOutOfRange { index: 0, len: 3 })
        );
        assert_eq!(
            session.complete(4),
            Err(ActionError::IndexOutOfRange { index: 4, len: 3 })
        );
        assert_eq!(session, before);

        let mut empty = Session::default();
        assert_eq!(empty.complete(1), Err(ActionError::EmptyList));
    }

    #[test]
    fn test_stop_early_readds_copy() {
        // [A, B, C(done)] with no dots: stopping B
        let mut session = Session::new(list("oox"), None);
        let stopped = session.stop_early(2).unwrap();

        assert_eq!(stopped.readded_index, 4);
        assert!(stopped.post.root_cleared);
        assert_eq!(pattern(session.tasks()), "oxxo");
        assert_eq!(session.get(4).unwrap().text, "task 2");
        assert_eq!(session.last_did(), None);
    }

    #[test]
    fn test_stop_early_inside_chain() {
        let mut session = Session::new(list(".o.o"), None);
        let stopped = session.stop_early(3).unwrap();
        assert!(!stopped.post.root_cleared);
        assert_eq!(pattern(session.tasks()), ".oxoo");
        assert_eq!(session.last_did(), Some(3));
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut session = Session::new(list(".x.o"), Some(2));
        session.reset();
        let once = session.clone();
        session.reset();
        assert_eq!(session, once);
        assert_eq!(pattern(session.tasks()), "oxoo");
        assert_eq!(session.last_did(), None);
    }

    #[test]
    fn test_clean_removes_done_and_pointer() {
        let mut session = Session::new(list(".xox"), Some(2));
        assert_eq!(session.clean(), 2);
        assert_eq!(pattern(session.tasks()), ".o");
        assert_eq!(session.last_did(), None);
    }

    #[test]
    fn test_archive_root_clears_pointer() {
        let mut session = Session::new(list(".o.o"), None);
        let archived = session.archive(1).unwrap();
        assert_eq!(archived.text, "task 1");
        assert!(archived.root_cleared);
        assert_eq!(pattern(session.tasks()), "ooo");
        assert_eq!(session.last_did(), None);
    }

    #[test]
    fn test_archive_inside_chain_rederives_pointer() {
        let mut session = Session::new(list(".o.o"), None);
        let archived = session.archive(3).unwrap();
        assert!(!archived.root_cleared);
        assert_eq!(pattern(session.tasks()), ".oo");
        assert_eq!(session.last_did(), Some(2));
        // The resume benchmark is still the root
        assert_eq!(session.benchmark_index(), Some(1));
    }

    #[test]
    fn test_archive_last_task_clamps_pointer() {
        let mut session = Session::new(list(".o."), None);
        session.archive(3).unwrap();
        assert_eq!(session.len(), 2);
        assert_eq!(session.last_did(), Some(2));
    }

    #[test]
    fn test_archive_rejects_done() {
        let mut session = Session::new(list("x."), None);
        assert_eq!(session.archive(1), Err(ActionError::NotLive { index: 1 }));
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn test_shuffle_resets_pointer() {
        let mut session = Session::new(list(".xo"), Some(2));
        session.shuffle();
        assert_eq!(session.last_did(), None);
        assert!(session.get(3).unwrap().is_done());
        assert_eq!(session.live_count(), 2);
    }

    #[test]
    fn test_do_now_and_benchmark() {
        let session = Session::new(list(".ox."), Some(3));
        assert_eq!(session.benchmark_index(), Some(1));
        assert_eq!(session.do_now_index(), Some(4));
        assert_eq!(session.root_index(), Some(1));
        assert_eq!(session.lowest_dotted_index(), Some(4));
    }
}
