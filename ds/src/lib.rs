//! DotStore - plain-text persistence for dot-chain task lists
//!
//! A list is one UTF-8 file: a state header carrying the session pointer,
//! followed by one line per task.
//!
//! # Layout
//!
//! ```text
//! ~/.fvp/
//! ├── default.fvp           # task list
//! ├── default.fvp.archive   # append-only log of archived tasks
//! └── work.fvp
//! ```
//!
//! # Example
//!
//! ```ignore
//! use dotstore::{Task, TaskStore};
//!
//! let store = TaskStore::open("~/.fvp/default.fvp")?;
//! let mut snap = store.load()?;
//! snap.tasks.push(Task::new("write report"));
//! store.save(snap.last_did, &snap.tasks)?;
//! ```

pub mod codec;
mod store;
mod task;

pub use codec::{Snapshot, normalize_pointer};
pub use store::{ArchiveLog, LIST_EXTENSION, ListInfo, TaskStore, available_lists, list_path};
pub use task::{Task, TaskStatus};
