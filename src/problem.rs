use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest operand that can be drawn
pub const MIN_OPERAND: u32 = 1;
/// Largest operand that can be drawn
pub const MAX_OPERAND: u32 = 15;

/// A single multiplication question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Problem {
    pub operand1: u32,
    pub operand2: u32,
    pub answer: u32,
}

impl Problem {
    pub fn new(operand1: u32, operand2: u32) -> Self {
        Self {
            operand1,
            operand2,
            answer: operand1 * operand2,
        }
    }

    /// Neutral problem shown before a session starts
    pub fn placeholder() -> Self {
        Self::new(1, 1)
    }
}

impl Default for Problem {
    fn default() -> Self {
        Self::placeholder()
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} × {} = ?", self.operand1, self.operand2)
    }
}

/// Draws problems with both operands uniform over `MIN_OPERAND..=MAX_OPERAND`.
///
/// Repeats are allowed; nothing is remembered between draws.
#[derive(Debug)]
pub struct ProblemGenerator<R: Rng = StdRng> {
    rng: R,
}

impl ProblemGenerator<StdRng> {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for ProblemGenerator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> ProblemGenerator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    pub fn generate(&mut self) -> Problem {
        let operand1 = self.rng.gen_range(MIN_OPERAND..=MAX_OPERAND);
        let operand2 = self.rng.gen_range(MIN_OPERAND..=MAX_OPERAND);
        Problem::new(operand1, operand2)
    }
}
