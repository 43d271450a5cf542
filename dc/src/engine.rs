//! Selection engine: pure queries and mutations over a task list
//!
//! All indices are 1-based positions in list order. Nothing here does I/O.

use dotstore::{Task, TaskStatus};
use rand::seq::SliceRandom;
use tracing::debug;

/// Result of post-action bookkeeping after a task is crossed out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostAction {
    /// New value for the session pointer
    pub last_did: Option<usize>,
    /// True when the acted task closed its pass and every dot was cleared
    pub root_cleared: bool,
}

/// Lowest index whose task is not done
pub fn root_index(tasks: &[Task]) -> Option<usize> {
    tasks.iter().position(Task::is_live).map(|i| i + 1)
}

/// Highest dotted index: the tail of the chain, i.e. the task to do next
pub fn lowest_dotted_index(tasks: &[Task]) -> Option<usize> {
    tasks.iter().rposition(Task::is_dotted).map(|i| i + 1)
}

/// Nearest dotted index strictly above `index`
pub fn nearest_dotted_above(tasks: &[Task], index: usize) -> Option<usize> {
    let end = index.saturating_sub(1).min(tasks.len());
    tasks[..end].iter().rposition(Task::is_dotted).map(|i| i + 1)
}

/// Turn every dotted task back to open
pub fn clear_all_dots(tasks: &mut [Task]) {
    for task in tasks.iter_mut().filter(|t| t.is_dotted()) {
        task.status = TaskStatus::Open;
    }
}

/// Dot the root if it is not dotted already; returns the root index
pub fn dot_root_if_needed(tasks: &mut [Task]) -> Option<usize> {
    let root = root_index(tasks)?;
    let task = &mut tasks[root - 1];
    if !task.is_dotted() {
        debug!(root, "dot_root_if_needed: dotting root");
        task.status = TaskStatus::Dotted;
    }
    Some(root)
}

/// Bookkeeping after `acted_index` was crossed out (done or stopped).
///
/// With no dot above the acted task it was the root of its pass: every dot is
/// cleared and the pointer reset. Otherwise the pointer moves to the acted task
/// so the next scan resumes below it.
pub fn apply_post_action(tasks: &mut [Task], acted_index: usize) -> PostAction {
    match nearest_dotted_above(tasks, acted_index) {
        None => {
            debug!(acted_index, "apply_post_action: root finished, clearing dots");
            clear_all_dots(tasks);
            PostAction {
                last_did: None,
                root_cleared: true,
            }
        }
        Some(benchmark) => {
            debug!(acted_index, benchmark, "apply_post_action: keeping chain");
            PostAction {
                last_did: Some(acted_index),
                root_cleared: false,
            }
        }
    }
}

/// Where "do this now" points without running a scan.
///
/// With a pointer set, the chain tail if it sits below the pointer, otherwise
/// the benchmark above the pointer. Without one, the chain tail.
pub fn do_now_index(tasks: &[Task], last_did: Option<usize>) -> Option<usize> {
    let tail = lowest_dotted_index(tasks);
    match last_did {
        Some(pointer) => match tail {
            Some(t) if t > pointer => Some(t),
            _ => nearest_dotted_above(tasks, pointer).or(tail),
        },
        None => tail,
    }
}

/// Shuffle live tasks, move done tasks to the end and clear every dot
pub fn shuffle_tasks(tasks: &mut Vec<Task>) {
    let (mut live, done): (Vec<Task>, Vec<Task>) = tasks.drain(..).partition(Task::is_live);
    live.shuffle(&mut rand::rng());
    tasks.extend(live);
    tasks.extend(done);
    clear_all_dots(tasks);
}
