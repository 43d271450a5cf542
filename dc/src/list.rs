//! A session bound to its store
//!
//! [`TaskList`] is what the shells hold: every mutating call applies the
//! action to the in-memory session and writes the file before returning, so
//! there is never unsaved state between calls.

use std::path::{Path, PathBuf};

use dotstore::{ArchiveLog, TaskStore};
use eyre::Result;
use tracing::{debug, info};

use crate::engine::PostAction;
use crate::scan::{Answer, Comparer, Scan, ScanState};
use crate::session::{Archived, Session, Stopped};

/// A task list file with its loaded session
#[derive(Debug)]
pub struct TaskList {
    store: TaskStore,
    archive: ArchiveLog,
    session: Session,
}

impl TaskList {
    /// Open (creating if needed) the list at `path` and load it
    pub fn open(path: impl AsRef<Path>, archive_suffix: &str) -> Result<Self> {
        let store = TaskStore::open(path)?;
        let archive = ArchiveLog::new(store.archive_path(archive_suffix));
        let session = Session::from(store.load()?);
        debug!(path = %store.path().display(), tasks = session.len(), "TaskList::open");
        Ok(Self {
            store,
            archive,
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn path(&self) -> &Path {
        self.store.path()
    }

    pub fn absolute_path(&self) -> Result<PathBuf> {
        self.store.absolute_path()
    }

    pub fn archive_path(&self) -> &Path {
        self.archive.path()
    }

    /// Write the session to disk
    pub fn save(&self) -> Result<()> {
        self.store.save(self.session.last_did(), self.session.tasks())
    }

    /// Discard in-memory state and reread the file
    pub fn reload(&mut self) -> Result<()> {
        self.session = Session::from(self.store.load()?);
        debug!(tasks = self.session.len(), "TaskList::reload");
        Ok(())
    }

    pub fn add(&mut self, text: &str) -> Result<usize> {
        let index = self.session.add(text)?;
        self.save()?;
        info!(index, "Added task");
        Ok(index)
    }

    pub fn edit(&mut self, index: usize, text: &str) -> Result<()> {
        self.session.edit(index, text)?;
        self.save()?;
        info!(index, "Edited task");
        Ok(())
    }

    pub fn complete(&mut self, index: usize) -> Result<PostAction> {
        let post = self.session.complete(index)?;
        self.save()?;
        info!(index, root_cleared = post.root_cleared, "Marked task done");
        Ok(post)
    }

    pub fn stop_early(&mut self, index: usize) -> Result<Stopped> {
        let stopped = self.session.stop_early(index)?;
        self.save()?;
        info!(index, readded = stopped.readded_index, "Stopped task early");
        Ok(stopped)
    }

    pub fn reset(&mut self) -> Result<()> {
        self.session.reset();
        self.save()?;
        info!("Reset dots and scanning state");
        Ok(())
    }

    pub fn clean(&mut self) -> Result<usize> {
        let removed = self.session.clean();
        self.save()?;
        info!(removed, "Removed crossed-out tasks");
        Ok(removed)
    }

    /// Archive a task: remove it, save, then append it to the archive log.
    ///
    /// A failing archive append is logged and does not fail the action.
    pub fn archive(&mut self, index: usize) -> Result<Archived> {
        let archived = self.session.archive(index)?;
        self.archive.append_lossy(&archived.text);
        self.save()?;
        info!(index, "Archived task");
        Ok(archived)
    }

    pub fn shuffle(&mut self) -> Result<()> {
        self.session.shuffle();
        self.save()?;
        info!("Shuffled live tasks");
        Ok(())
    }

    /// Run a whole scan with a blocking comparer, saving after every answer
    pub fn scan<C: Comparer + ?Sized>(&mut self, comparer: &mut C) -> Result<Scan> {
        let store = &self.store;
        let scan = Scan::run(&mut self.session, comparer, |session| {
            store.save(session.last_did(), session.tasks())
        })?;
        info!(state = ?scan.state(), "Scan finished");
        Ok(scan)
    }

    /// Start a step-driven scan and save whatever `begin` changed
    pub fn begin_scan(&mut self) -> Result<Scan> {
        let scan = Scan::begin(&mut self.session);
        self.save()?;
        Ok(scan)
    }

    /// Apply one answer to a step-driven scan and save
    pub fn answer(&mut self, scan: &mut Scan, answer: Answer) -> Result<ScanState> {
        let state = scan.supply_answer(&mut self.session, answer);
        self.save()?;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ActionError;
    use std::fs;
    use tempfile::TempDir;

    fn open(temp: &TempDir) -> TaskList {
        TaskList::open(temp.path().join("list.fvp"), ".archive").unwrap()
    }

    #[test]
    fn test_actions_persist_immediately() {
        let temp = TempDir::new().unwrap();
        let mut list = open(&temp);
        list.add("a").unwrap();
        list.add("b").unwrap();
        list.stop_early(1).unwrap();

        let reopened = open(&temp);
        assert_eq!(reopened.session(), list.session());
        assert_eq!(
            fs::read_to_string(list.path()).unwrap(),
            "# FVP_STATE last_did=-1\n[x] a\n[ ] b\n[ ] a\n"
        );
    }

    #[test]
    fn test_rejected_action_leaves_file_untouched() {
        let temp = TempDir::new().unwrap();
        let mut list = open(&temp);
        list.add("a").unwrap();
        let before = fs::read_to_string(list.path()).unwrap();

        let err = list.complete(5).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ActionError>(),
            Some(&ActionError::IndexOutOfRange { index: 5, len: 1 })
        );
        assert_eq!(fs::read_to_string(list.path()).unwrap(), before);
    }

    #[test]
    fn test_archive_writes_sidecar() {
        let temp = TempDir::new().unwrap();
        let mut list = open(&temp);
        list.add("a").unwrap();
        list.add("b").unwrap();

        let archived = list.archive(1).unwrap();
        assert_eq!(archived.text, "a");
        assert_eq!(list.session().len(), 1);
        assert_eq!(fs::read_to_string(list.archive_path()).unwrap(), "[x] a\n");
    }

    #[test]
    fn test_step_scan_saves_each_answer() {
        let temp = TempDir::new().unwrap();
        let mut list = open(&temp);
        for text in ["a", "b", "c"] {
            list.add(text).unwrap();
        }

        let mut scan = list.begin_scan().unwrap();
        assert!(fs::read_to_string(list.path()).unwrap().contains("[.] a"));

        list.answer(&mut scan, Answer::PreferCandidate).unwrap();
        assert!(fs::read_to_string(list.path()).unwrap().contains("[.] b"));

        let state = list.answer(&mut scan, Answer::PreferBenchmark).unwrap();
        assert_eq!(state, ScanState::Resolved(Some(2)));
        assert_eq!(open(&temp).session(), list.session());
    }

    #[test]
    fn test_reload_picks_up_external_edits() {
        let temp = TempDir::new().unwrap();
        let mut list = open(&temp);
        list.add("a").unwrap();
        fs::write(list.path(), "# FVP_STATE last_did=-1\n[ ] a\n[.] b\n").unwrap();

        list.reload().unwrap();
        assert_eq!(list.session().len(), 2);
        assert_eq!(list.session().lowest_dotted_index(), Some(2));
    }
}
