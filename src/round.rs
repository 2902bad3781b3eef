use crate::sentence::Sentence;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundOutcome {
    Continue,
    Complete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchResult {
    Win,
    Mismatch,
}

/// One attempt at rebuilding a single target sentence.
///
/// Submissions are accepted unconditionally; wrong or out-of-order words are
/// not rejected at submission time; correctness is judged once the submitted
/// sequence reaches the target's length.
#[derive(Debug, Default)]
pub struct RoundState {
    target: Option<Sentence>,
    submitted: Vec<String>,
    mistakes: u32,
}

impl RoundState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh attempt: set the target, drop submissions and mistakes.
    pub fn begin(&mut self, target: Sentence) {
        self.submitted.clear();
        self.submitted.reserve(target.word_count());
        self.target = Some(target);
        self.mistakes = 0;
    }

    pub fn target(&self) -> Option<&Sentence> {
        self.target.as_ref()
    }

    pub fn submitted_words(&self) -> &[String] {
        &self.submitted
    }

    /// Append one selected word. Completion fires exactly when the submitted
    /// length reaches the target length.
    pub fn submit(&mut self, word: &str) -> RoundOutcome {
        let target_len = self.target.as_ref().map_or(0, Sentence::word_count);
        debug_assert!(self.submitted.len() < target_len || target_len == 0);

        self.submitted.push(word.to_string());
        if self.submitted.len() >= target_len {
            RoundOutcome::Complete
        } else {
            RoundOutcome::Continue
        }
    }

    /// Element-wise, order-sensitive comparison against the target. Repeated
    /// target words must be matched positionally, never as a set.
    pub fn validate(&self) -> MatchResult {
        match &self.target {
            Some(target) if self.submitted == target.words() => MatchResult::Win,
            _ => MatchResult::Mismatch,
        }
    }

    /// Empty the submitted words. The target and the mistake tally survive;
    /// both manual clears and mismatch recovery come through here.
    pub fn clear(&mut self) {
        self.submitted.clear();
    }

    pub fn mark_mistake(&mut self) {
        self.mistakes += 1;
    }

    /// Monotonic within a round: once set, only `begin` resets it.
    pub fn mistake_occurred(&self) -> bool {
        self.mistakes > 0
    }

    pub fn mistake_count(&self) -> u32 {
        self.mistakes
    }
}
