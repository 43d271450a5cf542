//! File-backed task list store

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use tracing::{debug, info, warn};

use crate::codec::{self, Snapshot};
use crate::task::{Task, TaskStatus};

/// File extension used for named lists
pub const LIST_EXTENSION: &str = "fvp";

/// A single task list file on disk
#[derive(Debug, Clone)]
pub struct TaskStore {
    path: PathBuf,
}

impl TaskStore {
    /// Create a store for the given file path. Nothing is touched on disk.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create a store and make sure its directory and file (with header) exist
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let store = Self::new(path);
        store.ensure_exists()?;
        Ok(store)
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Absolute path of the backing file
    pub fn absolute_path(&self) -> Result<PathBuf> {
        std::path::absolute(&self.path).context("Failed to resolve list path")
    }

    /// Create the parent directory and an empty list file if missing
    pub fn ensure_exists(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).context(format!("Failed to create directory: {}", parent.display()))?;
        }
        if !self.path.exists() {
            self.save(None, &[])?;
            info!(path = %self.path.display(), "Created task list");
        }
        Ok(())
    }

    /// Load the list. A missing file yields an empty list with no pointer.
    pub fn load(&self) -> Result<Snapshot> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "load: file missing, returning empty list");
            return Ok(Snapshot::default());
        }
        let content =
            fs::read_to_string(&self.path).context(format!("Failed to read task list: {}", self.path.display()))?;
        let snapshot = codec::decode(&content);
        debug!(
            path = %self.path.display(),
            tasks = snapshot.tasks.len(),
            last_did = ?snapshot.last_did,
            "load: decoded task list"
        );
        Ok(snapshot)
    }

    /// Rewrite the whole file from in-memory state
    pub fn save(&self, last_did: Option<usize>, tasks: &[Task]) -> Result<()> {
        let content = codec::encode(last_did, tasks);
        fs::write(&self.path, content).context(format!("Failed to write task list: {}", self.path.display()))?;
        debug!(path = %self.path.display(), tasks = tasks.len(), ?last_did, "save: wrote task list");
        Ok(())
    }

    /// Path of the archive sidecar for this list
    pub fn archive_path(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(suffix);
        PathBuf::from(name)
    }
}

/// Append-only log of archived tasks
#[derive(Debug, Clone)]
pub struct ArchiveLog {
    path: PathBuf,
}

impl ArchiveLog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a crossed-out entry for `text`
    pub fn append(&self, text: &str) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .context(format!("Failed to open archive: {}", self.path.display()))?;
        writeln!(file, "{}", codec::encode_task(&Task::with_status(text, TaskStatus::Done)))?;
        Ok(())
    }

    /// Append, logging instead of failing. Archiving is best-effort.
    pub fn append_lossy(&self, text: &str) {
        if let Err(e) = self.append(text) {
            warn!(path = %self.path.display(), "Failed to append to archive: {:#}", e);
        }
    }
}

/// Path of a named list inside a lists directory
pub fn list_path(dir: impl AsRef<Path>, name: &str) -> PathBuf {
    dir.as_ref().join(format!("{}.{}", name, LIST_EXTENSION))
}

/// Summary of a named list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListInfo {
    pub name: String,
    pub path: PathBuf,
    /// Number of tasks that are not done
    pub live: usize,
}

/// Names of all lists in `dir`, sorted. A missing directory has no lists.
pub fn available_lists(dir: impl AsRef<Path>) -> Result<Vec<ListInfo>> {
    let dir = dir.as_ref();
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut lists = Vec::new();
    for entry in fs::read_dir(dir).context(format!("Failed to read lists directory: {}", dir.display()))? {
        let path = entry?.path();
        if !path.is_file() || path.extension().map(|e| e != LIST_EXTENSION).unwrap_or(true) {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let live = match TaskStore::new(&path).load() {
            Ok(snap) => snap.tasks.iter().filter(|t| t.is_live()).count(),
            Err(e) => {
                warn!(path = %path.display(), "Failed to read list, counting 0 live: {:#}", e);
                0
            }
        };
        lists.push(ListInfo {
            name: name.to_string(),
            path: path.clone(),
            live,
        });
    }

    lists.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(lists)
}
