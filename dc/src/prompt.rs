//! Line-oriented comparison prompts for the CLI

use std::io::{BufRead, Write};

use eyre::{Context, Result};
use tracing::debug;

use crate::scan::{Answer, Comparer, Matchup};

/// Asks comparisons on a line-based reader/writer pair (stdin/stdout in the binary).
///
/// `y`/`yes` prefers the candidate, `q`/`quit` cancels, end of input cancels,
/// anything else keeps the benchmark.
pub struct LineComparer<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> LineComparer<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

/// Interpret one line of input
pub fn parse_answer(input: &str) -> Answer {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" => Answer::PreferCandidate,
        "q" | "quit" => Answer::Cancel,
        _ => Answer::PreferBenchmark,
    }
}

impl<R: BufRead, W: Write> Comparer for LineComparer<R, W> {
    fn compare(&mut self, matchup: Matchup<'_>) -> Result<Answer> {
        write!(
            self.writer,
            "Do you want to do [{}] {} more than [{}] {}? [y/N/q]: ",
            matchup.candidate_index, matchup.candidate.text, matchup.benchmark_index, matchup.benchmark.text
        )?;
        self.writer.flush()?;

        let mut line = String::new();
        let read = self.reader.read_line(&mut line).context("Failed to read answer")?;
        let answer = if read == 0 {
            writeln!(self.writer)?;
            Answer::Cancel
        } else {
            parse_answer(&line)
        };
        debug!(?answer, candidate = matchup.candidate_index, "LineComparer: answered");
        Ok(answer)
    }
}
