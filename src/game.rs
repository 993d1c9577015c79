use crate::error::{Error, Result};
use crate::problem::{Problem, ProblemGenerator};
use log::debug;
use rand::{rngs::StdRng, Rng};
use serde::{Deserialize, Serialize};
use std::num::IntErrorKind;

/// Counters for the session in progress.
///
/// `correct_count <= total_count` always holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub correct_count: u32,
    pub total_count: u32,
    pub current_problem: Problem,
}

/// Summary of a finished session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResult {
    pub score: u32,
    pub total_questions: u32,
    pub accuracy: u32,
    pub elapsed_seconds: u64,
}

/// Percentage of correct answers rounded to the nearest integer, 0 when nothing was answered.
pub fn accuracy(correct: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    ((correct as f64 / total as f64) * 100.0).round() as u32
}

/// Parse a typed answer. Surrounding whitespace is ignored; anything that is
/// not a plain integer (including empty input) is rejected.
///
/// Integers beyond the `i64` range saturate to `i64::MIN`/`i64::MAX`, which no
/// problem can have as its answer, so they are scored wrong rather than rejected.
pub fn parse_answer(raw: &str) -> Result<i64> {
    let trimmed = raw.trim();
    trimmed.parse::<i64>().or_else(|e| match e.kind() {
        IntErrorKind::PosOverflow => Ok(i64::MAX),
        IntErrorKind::NegOverflow => Ok(i64::MIN),
        _ => Err(Error::InvalidInput(trimmed.to_string())),
    })
}

/// Problem generator and scorer for one practice session
#[derive(Debug)]
pub struct Game<R: Rng = StdRng> {
    generator: ProblemGenerator<R>,
    state: SessionState,
}

impl Game<StdRng> {
    pub fn new() -> Self {
        Self::with_generator(ProblemGenerator::new())
    }
}

impl Default for Game<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> Game<R> {
    pub fn with_generator(generator: ProblemGenerator<R>) -> Self {
        Self {
            generator,
            state: SessionState::default(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current_problem(&self) -> Problem {
        self.state.current_problem
    }

    pub fn correct_count(&self) -> u32 {
        self.state.correct_count
    }

    pub fn total_count(&self) -> u32 {
        self.state.total_count
    }

    pub fn accuracy(&self) -> u32 {
        accuracy(self.state.correct_count, self.state.total_count)
    }

    /// Replace the current problem with a freshly drawn one
    pub fn generate(&mut self) -> Problem {
        self.state.current_problem = self.generator.generate();
        self.state.current_problem
    }

    /// Score an answer against the current problem. Does not advance to a new problem.
    pub fn submit(&mut self, user_answer: i64) -> bool {
        let correct = user_answer == i64::from(self.state.current_problem.answer);
        self.state.total_count += 1;
        if correct {
            self.state.correct_count += 1;
        }
        debug!(
            "answer {} for {:?}: correct={} ({}/{})",
            user_answer,
            self.state.current_problem,
            correct,
            self.state.correct_count,
            self.state.total_count
        );
        correct
    }

    /// Parse then score raw text. Invalid input leaves the counters untouched.
    pub fn submit_text(&mut self, raw: &str) -> Result<bool> {
        let answer = parse_answer(raw)?;
        Ok(self.submit(answer))
    }

    /// Zero the counters and put the placeholder problem back
    pub fn reset(&mut self) {
        self.state = SessionState::default();
    }

    /// Summarise the session, or `None` if nothing was answered
    pub fn finish(&self, elapsed_seconds: u64) -> Option<SessionResult> {
        if self.state.total_count == 0 {
            return None;
        }
        Some(SessionResult {
            score: self.state.correct_count,
            total_questions: self.state.total_count,
            accuracy: self.accuracy(),
            elapsed_seconds,
        })
    }
}
