use std::time::{Duration, Instant};

/// Cumulative session clock. Time accrues while a round is live and is folded
/// into `accumulated` at each round boundary, so the displayed elapsed time
/// runs continuously across rounds without counting the gaps between them.
///
/// All methods are pure over the passed-in `now`; nothing here reads a clock.
/// A display refresh is a pollable `elapsed()` read, not a source of truth.
#[derive(Debug, Default)]
pub struct SessionTimer {
    accumulated: Duration,
    round_started_at: Option<Instant>,
}

impl SessionTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero the clock for a fresh session.
    pub fn start_session(&mut self) {
        self.accumulated = Duration::ZERO;
        self.round_started_at = None;
    }

    pub fn start_round(&mut self, now: Instant) {
        self.round_started_at = Some(now);
    }

    /// Fold the live round into the accumulated total. No-op when already
    /// paused; callers must not rely on double-pausing.
    pub fn pause_round(&mut self, now: Instant) {
        if let Some(started) = self.round_started_at.take() {
            self.accumulated += now.saturating_duration_since(started);
        }
    }

    pub fn is_running(&self) -> bool {
        self.round_started_at.is_some()
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        match self.round_started_at {
            Some(started) => self.accumulated + now.saturating_duration_since(started),
            None => self.accumulated,
        }
    }
}

/// Zero-padded MM:SS readout.
pub fn format_mm_ss(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    format!("{:02}:{:02}", total / 60, total % 60)
}
