use crate::sentence::Sentence;
use rand::Rng;
use thiserror::Error;

/// Drawing from a pool with nothing left in it. The orchestrator checks
/// `remaining_count()` before drawing, so seeing this escape a session is an
/// invariant violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("sentence pool is empty")]
pub struct EmptyPoolError;

/// Per-session pool of not-yet-played sentences. Draws sample uniformly
/// without replacement, so no sentence repeats within a session unless the
/// configured list itself contains duplicates.
#[derive(Debug, Default)]
pub struct SentencePool {
    remaining: Vec<Sentence>,
}

impl SentencePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the available set with a copy of the full configured list,
    /// discarding any prior consumption state.
    pub fn reset(&mut self, configured: &[Sentence]) {
        self.remaining = configured.to_vec();
    }

    /// Remove and return one remaining sentence, chosen uniformly at random.
    pub fn draw(&mut self) -> Result<Sentence, EmptyPoolError> {
        if self.remaining.is_empty() {
            return Err(EmptyPoolError);
        }
        let idx = rand::thread_rng().gen_range(0..self.remaining.len());
        Ok(self.remaining.swap_remove(idx))
    }

    pub fn remaining_count(&self) -> usize {
        self.remaining.len()
    }
}
