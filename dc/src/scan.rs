//! Scan session state machine
//!
//! A scan walks the list below its starting point and asks one question per
//! live task: "do you want to do this more than the benchmark?". Each answer
//! is applied to the session immediately, so a cancelled scan keeps every
//! decision already made and a later scan picks up from the same place.
//!
//! ```text
//! Idle --begin--> Scanning --answer*--> Resolved(recommendation)
//!                    |                  Cancelled
//!                    +----------------> Stale (dots cleared, rescan)
//! ```
//!
//! Shells drive the machine one answer at a time with [`Scan::supply_answer`],
//! or hand a [`Comparer`] to [`Scan::run`] for a blocking loop.

use dotstore::{Task, TaskStatus};
use eyre::Result;
use tracing::{debug, info, warn};

use crate::engine;
use crate::session::Session;

/// Answer to a single comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    /// Dot the candidate; it becomes the benchmark
    PreferCandidate,
    /// Leave the candidate open; the benchmark stays
    PreferBenchmark,
    /// Stop the scan here, keeping every dot set so far
    Cancel,
}

/// Which kind of pass a scan is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// No pointer: start from the root and the current chain tail
    Fresh,
    /// Pointer set: continue below the task most recently acted upon
    Resume,
}

/// A pending comparison, by 1-based index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comparison {
    pub candidate: usize,
    pub benchmark: usize,
}

/// A comparison with its tasks borrowed from the session
#[derive(Debug, Clone, Copy)]
pub struct Matchup<'a> {
    pub candidate_index: usize,
    pub candidate: &'a Task,
    pub benchmark_index: usize,
    pub benchmark: &'a Task,
}

impl Comparison {
    /// Resolve the indices against a session
    pub fn matchup<'a>(&self, session: &'a Session) -> Option<Matchup<'a>> {
        Some(Matchup {
            candidate_index: self.candidate,
            candidate: session.get(self.candidate)?,
            benchmark_index: self.benchmark,
            benchmark: session.get(self.benchmark)?,
        })
    }
}

/// Where a scan currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Waiting for an answer to this comparison
    Scanning(Comparison),
    /// Range exhausted. `None` means there was no live task to recommend.
    Resolved(Option<usize>),
    /// Stopped by the user; dots kept, pointer untouched
    Cancelled,
    /// Pointer had no dot above it; dots and pointer were cleared
    Stale,
}

impl ScanState {
    pub fn is_finished(&self) -> bool {
        !matches!(self, Self::Scanning(_))
    }
}

/// The blocking side of the shell contract: ask one question, get one answer
pub trait Comparer {
    fn compare(&mut self, matchup: Matchup<'_>) -> Result<Answer>;
}

/// A single scan over one session
#[derive(Debug, Clone)]
pub struct Scan {
    pass: PassKind,
    /// Next index to consider as a candidate
    cursor: usize,
    /// Benchmark held by a resume pass
    benchmark: usize,
    /// Whether this scan dotted anything
    dotted_any: bool,
    state: ScanState,
}

impl Scan {
    /// Start a scan: pick the pass, set up the first comparison.
    ///
    /// May mutate the session (dotting the root, or clearing stale dots).
    pub fn begin(session: &mut Session) -> Self {
        session.normalize_pointer();

        match session.last_did() {
            None => Self::begin_fresh(session),
            Some(last_did) => Self::begin_resume(session, last_did),
        }
    }

    fn begin_fresh(session: &mut Session) -> Self {
        let Some(root) = engine::dot_root_if_needed(session.tasks_mut()) else {
            debug!("Scan::begin: no live tasks");
            return Self::finished(PassKind::Fresh, ScanState::Resolved(None));
        };

        let tail = session.lowest_dotted_index().unwrap_or(root);
        debug!(root, tail, "Scan::begin: fresh pass");
        let mut scan = Self {
            pass: PassKind::Fresh,
            cursor: tail + 1,
            benchmark: tail,
            dotted_any: false,
            state: ScanState::Resolved(None),
        };
        scan.advance(session);
        scan
    }

    fn begin_resume(session: &mut Session, last_did: usize) -> Self {
        let Some(benchmark) = engine::nearest_dotted_above(session.tasks(), last_did) else {
            warn!(last_did, "Scan::begin: no dot above pointer, resetting scan state");
            engine::clear_all_dots(session.tasks_mut());
            session.set_last_did(None);
            return Self::finished(PassKind::Resume, ScanState::Stale);
        };

        debug!(last_did, benchmark, "Scan::begin: resume pass");
        let mut scan = Self {
            pass: PassKind::Resume,
            cursor: last_did + 1,
            benchmark,
            dotted_any: false,
            state: ScanState::Resolved(None),
        };
        scan.advance(session);
        scan
    }

    fn finished(pass: PassKind, state: ScanState) -> Self {
        Self {
            pass,
            cursor: 0,
            benchmark: 0,
            dotted_any: false,
            state,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn pass(&self) -> PassKind {
        self.pass
    }

    pub fn dotted_any(&self) -> bool {
        self.dotted_any
    }

    /// The pending comparison, if the scan is waiting for an answer
    pub fn pending(&self) -> Option<Comparison> {
        match self.state {
            ScanState::Scanning(cmp) => Some(cmp),
            _ => None,
        }
    }

    /// Apply one answer and move to the next comparison or a final state.
    ///
    /// Answers supplied after the scan finished are ignored.
    pub fn supply_answer(&mut self, session: &mut Session, answer: Answer) -> ScanState {
        let ScanState::Scanning(cmp) = self.state else {
            return self.state;
        };
        debug!(?answer, candidate = cmp.candidate, benchmark = cmp.benchmark, "Scan::supply_answer");

        match answer {
            Answer::Cancel => {
                info!(candidate = cmp.candidate, "Scan cancelled");
                self.state = ScanState::Cancelled;
                return self.state;
            }
            Answer::PreferCandidate => {
                if let Some(task) = session.tasks_mut().get_mut(cmp.candidate - 1) {
                    task.status = TaskStatus::Dotted;
                }
                self.benchmark = cmp.candidate;
                self.dotted_any = true;
            }
            Answer::PreferBenchmark => {
                // A dot left over from a cancelled resume is withdrawn when the answer changes
                if let Some(task) = session.tasks_mut().get_mut(cmp.candidate - 1)
                    && task.is_dotted()
                {
                    task.status = TaskStatus::Open;
                }
            }
        }

        self.cursor = cmp.candidate + 1;
        self.advance(session);
        self.state
    }

    /// Current benchmark. A fresh pass re-reads the chain tail every time.
    fn current_benchmark(&self, session: &Session) -> usize {
        match self.pass {
            PassKind::Fresh => session.lowest_dotted_index().unwrap_or(self.benchmark),
            PassKind::Resume => self.benchmark,
        }
    }

    /// Move the cursor to the next live candidate or resolve
    fn advance(&mut self, session: &Session) {
        let next = (self.cursor..=session.len()).find(|&i| session.get(i).is_some_and(Task::is_live));

        self.state = match next {
            Some(candidate) => {
                self.cursor = candidate;
                ScanState::Scanning(Comparison {
                    candidate,
                    benchmark: self.current_benchmark(session),
                })
            }
            None => {
                let recommendation = self.recommendation(session);
                info!(?recommendation, pass = ?self.pass, "Scan resolved");
                ScanState::Resolved(recommendation)
            }
        };
    }

    fn recommendation(&self, session: &Session) -> Option<usize> {
        match self.pass {
            PassKind::Fresh => session.lowest_dotted_index(),
            PassKind::Resume if self.dotted_any => session.lowest_dotted_index().or(Some(self.benchmark)),
            PassKind::Resume => Some(self.benchmark),
        }
    }

    /// Drive a whole scan with a blocking comparer.
    ///
    /// `on_answer` runs after every applied answer (and once after `begin`),
    /// so the shell can persist each decision as it is made.
    pub fn run<C, F>(session: &mut Session, comparer: &mut C, mut on_answer: F) -> Result<Scan>
    where
        C: Comparer + ?Sized,
        F: FnMut(&Session) -> Result<()>,
    {
        let mut scan = Self::begin(session);
        on_answer(session)?;

        while let Some(cmp) = scan.pending() {
            let answer = match cmp.matchup(session) {
                Some(matchup) => comparer.compare(matchup)?,
                None => Answer::Cancel,
            };
            scan.supply_answer(session, answer);
            on_answer(session)?;
        }

        Ok(scan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{list, pattern};
    use std::collections::VecDeque;

    /// Comparer that replays scripted answers and records what it was asked
    struct Scripted {
        answers: VecDeque<Answer>,
        asked: Vec<(usize, usize)>,
    }

    impl Scripted {
        fn new(answers: &[Answer]) -> Self {
            Self {
                answers: answers.iter().copied().collect(),
                asked: Vec::new(),
            }
        }
    }

    impl Comparer for Scripted {
        fn compare(&mut self, matchup: Matchup<'_>) -> Result<Answer> {
            self.asked.push((matchup.candidate_index, matchup.benchmark_index));
            self.answers
                .pop_front()
                .ok_or_else(|| eyre::eyre!("unexpected comparison {:?}", self.asked.last()))
        }
    }

    use Answer::{Cancel, PreferBenchmark as Bench, PreferCandidate as Cand};

    fn run(session: &mut Session, answers: &[Answer]) -> (Scan, Vec<(usize, usize)>) {
        let mut comparer = Scripted::new(answers);
        let scan = Scan::run(session, &mut comparer, |_| Ok(())).unwrap();
        assert!(comparer.answers.is_empty(), "unused answers");
        (scan, comparer.asked)
    }

    #[test]
    fn test_empty_list_resolves_without_recommendation() {
        let mut session = Session::default();
        let scan = Scan::begin(&mut session);
        assert_eq!(scan.state(), ScanState::Resolved(None));
    }

    #[test]
    fn test_all_done_resolves_without_recommendation() {
        let mut session = Session::new(list("xx"), None);
        let scan = Scan::begin(&mut session);
        assert_eq!(scan.state(), ScanState::Resolved(None));
        assert_eq!(pattern(session.tasks()), "xx");
    }

    #[test]
    fn test_single_task_recommends_root() {
        let mut session = Session::new(list("o"), None);
        let (scan, asked) = run(&mut session, &[]);
        assert!(asked.is_empty());
        assert_eq!(scan.state(), ScanState::Resolved(Some(1)));
        assert_eq!(pattern(session.tasks()), ".");
    }

    #[test]
    fn test_fresh_scan_abc() {
        // [A, B, C]: B beats A, B beats C
        let mut session = Session::new(list("ooo"), None);
        let (scan, asked) = run(&mut session, &[Cand, Bench]);

        assert_eq!(asked, vec![(2, 1), (3, 2)]);
        assert_eq!(scan.state(), ScanState::Resolved(Some(2)));
        assert_eq!(pattern(session.tasks()), "..o");
        assert_eq!(scan.pass(), PassKind::Fresh);
    }

    #[test]
    fn test_fresh_scan_abc_then_complete_recommendation() {
        let mut session = Session::new(list("ooo"), None);
        run(&mut session, &[Cand, Bench]);
        assert_eq!(pattern(session.tasks()), "..o");

        // A is still dotted above B, so B was not the root of the pass
        let post = session.complete(2).unwrap();
        assert_eq!(pattern(session.tasks()), ".xo");
        assert_eq!(session.last_did(), Some(2));
        assert!(!post.root_cleared);

        // The next pass resumes below B against A
        let (scan, asked) = run(&mut session, &[Bench]);
        assert_eq!(scan.pass(), PassKind::Resume);
        assert_eq!(asked, vec![(3, 1)]);
        assert_eq!(scan.state(), ScanState::Resolved(Some(1)));
    }

    #[test]
    fn test_new_dot_is_next_benchmark() {
        let mut session = Session::new(list("ooooo"), None);
        let (scan, asked) = run(&mut session, &[Bench, Cand, Bench, Cand]);

        assert_eq!(asked, vec![(2, 1), (3, 1), (4, 3), (5, 3)]);
        assert_eq!(scan.state(), ScanState::Resolved(Some(5)));
        assert_eq!(pattern(session.tasks()), ".o.o.");
    }

    #[test]
    fn test_fresh_scan_skips_done() {
        let mut session = Session::new(list("xoxo"), None);
        let (scan, asked) = run(&mut session, &[Bench]);
        assert_eq!(asked, vec![(4, 2)]);
        assert_eq!(scan.state(), ScanState::Resolved(Some(2)));
    }

    #[test]
    fn test_cancel_keeps_dots_and_fresh_rescan_continues_after_tail() {
        let mut session = Session::new(list("oooo"), None);
        let (scan, asked) = run(&mut session, &[Cand, Cancel]);
        assert_eq!(asked, vec![(2, 1), (3, 2)]);
        assert_eq!(scan.state(), ScanState::Cancelled);
        assert_eq!(pattern(session.tasks()), "..oo");
        assert_eq!(session.last_did(), None);

        // The next scan starts after the chain tail with the tail as benchmark
        let (scan, asked) = run(&mut session, &[Bench, Cand]);
        assert_eq!(asked, vec![(3, 2), (4, 2)]);
        assert_eq!(scan.state(), ScanState::Resolved(Some(4)));
        assert_eq!(pattern(session.tasks()), "..o.");
    }

    #[test]
    fn test_resume_nothing_dotted_recommends_benchmark() {
        // Chain A . C(done, pointer) D E
        let mut session = Session::new(list(".oxoo"), Some(3));
        let (scan, asked) = run(&mut session, &[Bench, Bench]);

        assert_eq!(asked, vec![(4, 1), (5, 1)]);
        assert_eq!(scan.pass(), PassKind::Resume);
        assert_eq!(scan.state(), ScanState::Resolved(Some(1)));
        assert!(!scan.dotted_any());
        assert_eq!(session.last_did(), Some(3));
    }

    #[test]
    fn test_resume_with_new_dots_recommends_tail() {
        let mut session = Session::new(list(".oxooo"), Some(3));
        let (scan, asked) = run(&mut session, &[Cand, Bench, Cand]);

        assert_eq!(asked, vec![(4, 1), (5, 4), (6, 4)]);
        assert_eq!(scan.state(), ScanState::Resolved(Some(6)));
        assert_eq!(pattern(session.tasks()), ".ox.o.");
    }

    #[test]
    fn test_resume_at_end_of_list() {
        let mut session = Session::new(list(".ox"), Some(3));
        let (scan, asked) = run(&mut session, &[]);
        assert!(asked.is_empty());
        assert_eq!(scan.state(), ScanState::Resolved(Some(1)));
    }

    #[test]
    fn test_resume_cancel_is_safe_to_retry() {
        let mut session = Session::new(list(".oxoo"), Some(3));
        let (scan, _) = run(&mut session, &[Cand, Cancel]);
        assert_eq!(scan.state(), ScanState::Cancelled);
        assert_eq!(pattern(session.tasks()), ".ox.o");
        assert_eq!(session.last_did(), Some(3));

        // Retry asks again from below the pointer, against the original benchmark
        let (scan, asked) = run(&mut session, &[Cand, Bench]);
        assert_eq!(asked, vec![(4, 1), (5, 4)]);
        assert_eq!(scan.state(), ScanState::Resolved(Some(4)));
    }

    #[test]
    fn test_resume_changed_answer_withdraws_old_dot() {
        let mut session = Session::new(list(".oxoo"), Some(3));
        run(&mut session, &[Cand, Cancel]);
        assert_eq!(pattern(session.tasks()), ".ox.o");

        let (scan, _) = run(&mut session, &[Bench, Bench]);
        assert_eq!(pattern(session.tasks()), ".oxoo");
        assert_eq!(scan.state(), ScanState::Resolved(Some(1)));
    }

    #[test]
    fn test_stale_pointer_resets() {
        // Pointer with no dot above it, e.g. after hand-editing the file
        let mut session = Session::new(list("ox.o"), Some(2));
        let scan = Scan::begin(&mut session);

        assert_eq!(scan.state(), ScanState::Stale);
        assert_eq!(pattern(session.tasks()), "oxoo");
        assert_eq!(session.last_did(), None);
    }

    #[test]
    fn test_step_driver_matches_blocking_driver() {
        let mut session = Session::new(list("oooo"), None);
        let mut scan = Scan::begin(&mut session);

        assert_eq!(
            scan.pending(),
            Some(Comparison {
                candidate: 2,
                benchmark: 1
            })
        );
        scan.supply_answer(&mut session, Cand);
        assert_eq!(
            scan.pending(),
            Some(Comparison {
                candidate: 3,
                benchmark: 2
            })
        );
        scan.supply_answer(&mut session, Bench);
        let state = scan.supply_answer(&mut session, Bench);
        assert_eq!(state, ScanState::Resolved(Some(2)));

        // Finished scans ignore further answers
        assert_eq!(scan.supply_answer(&mut session, Cand), ScanState::Resolved(Some(2)));
        assert_eq!(pattern(session.tasks()), "..oo");
    }

    #[test]
    fn test_complete_recommendation_then_resume() {
        // Full cycle: scan, do the recommendation, scan again
        let mut session = Session::new(list("oooo"), None);
        let (scan, _) = run(&mut session, &[Bench, Cand, Bench]);
        assert_eq!(scan.state(), ScanState::Resolved(Some(3)));

        session.complete(3).unwrap();
        assert_eq!(session.last_did(), Some(3));

        let (scan, asked) = run(&mut session, &[Bench]);
        assert_eq!(asked, vec![(4, 1)]);
        assert_eq!(scan.state(), ScanState::Resolved(Some(1)));

        // Doing the root ends the pass
        session.complete(1).unwrap();
        assert_eq!(session.last_did(), None);
        assert_eq!(pattern(session.tasks()), "xoxo");

        let (scan, asked) = run(&mut session, &[Cand]);
        assert_eq!(asked, vec![(4, 2)]);
        assert_eq!(scan.state(), ScanState::Resolved(Some(4)));
    }

    #[test]
    fn test_run_persists_after_every_answer() {
        let mut session = Session::new(list("ooo"), None);
        let mut comparer = Scripted::new(&[Cand, Bench]);
        let mut saves = Vec::new();
        Scan::run(&mut session, &mut comparer, |s| {
            saves.push(pattern(s.tasks()));
            Ok(())
        })
        .unwrap();
        assert_eq!(saves, vec![".oo", "..o", "..o"]);
    }
}
