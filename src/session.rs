use std::time::{Duration, Instant};

use chrono::Local;
use thiserror::Error;

use crate::pool::{EmptyPoolError, SentencePool};
use crate::round::{MatchResult, RoundOutcome, RoundState};
use crate::sentence::Sentence;
use crate::stats::{RoundRecord, StatsDb};
use crate::streak::{StreakSnapshot, StreakTracker};
use crate::timer::SessionTimer;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no sentences configured for this session")]
    NoSentences,
    #[error(transparent)]
    Pool(#[from] EmptyPoolError),
}

/// Lifecycle phase of a play session.
///
/// `RoundComplete` sits between a won round and the external next-round
/// request, so input arriving in that window is inert.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    RoundActive,
    RoundResolving,
    RoundComplete,
    SessionComplete,
}

/// What a single submitted word did to the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Input arrived outside `RoundActive` (late click during recovery,
    /// after a win, etc.) and was dropped.
    Ignored,
    Continue,
    Win { session_complete: bool },
    Mismatch,
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub sentences: Vec<Sentence>,
    pub mismatch_delay: Duration,
    pub keep_best_on_title: bool,
}

impl SessionSettings {
    pub fn new(sentences: Vec<Sentence>) -> Self {
        Self {
            sentences,
            mismatch_delay: Duration::from_millis(800),
            keep_best_on_title: true,
        }
    }
}

/// Orchestrates one play session: draws sentences from the pool into the
/// active round, judges completed submissions, and keeps the timer and the
/// streak in step with win/mismatch transitions.
///
/// The session owns all of its sub-state exclusively; there are no shared
/// or process-wide pieces.
pub struct GameSession {
    settings: SessionSettings,
    pool: SentencePool,
    round: RoundState,
    timer: SessionTimer,
    streak: StreakTracker,
    phase: SessionPhase,
    recovery_due: Option<Instant>,
    round_started_elapsed: Duration,
    round_durations: Vec<Duration>,
    recorder: Option<StatsDb>,
}

impl GameSession {
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            settings,
            pool: SentencePool::new(),
            round: RoundState::new(),
            timer: SessionTimer::new(),
            streak: StreakTracker::new(),
            phase: SessionPhase::Idle,
            recovery_due: None,
            round_started_elapsed: Duration::ZERO,
            round_durations: Vec::new(),
            recorder: None,
        }
    }

    /// Same as `new`, with won rounds persisted to the stats store.
    pub fn with_recorder(settings: SessionSettings, recorder: StatsDb) -> Self {
        let mut session = Self::new(settings);
        session.recorder = Some(recorder);
        session
    }

    /// Begin a fresh session: full pool, zeroed timer, running streak reset,
    /// and the first round drawn and live.
    pub fn start_session(&mut self, now: Instant) -> Result<(), SessionError> {
        if self.settings.sentences.is_empty() {
            return Err(SessionError::NoSentences);
        }

        self.pool.reset(&self.settings.sentences);
        self.timer.start_session();
        self.streak.reset_session();
        self.recovery_due = None;
        self.round_durations.clear();
        self.round_started_elapsed = Duration::ZERO;

        let target = self.pool.draw()?;
        self.round.begin(target);
        self.timer.start_round(now);
        self.phase = SessionPhase::RoundActive;
        Ok(())
    }

    /// Feed one discrete target-selection event. A no-op outside
    /// `RoundActive`; completing the sentence validates immediately.
    pub fn submit_word(&mut self, word: &str, now: Instant) -> SubmitOutcome {
        if self.phase != SessionPhase::RoundActive {
            return SubmitOutcome::Ignored;
        }

        match self.round.submit(word) {
            RoundOutcome::Continue => SubmitOutcome::Continue,
            RoundOutcome::Complete => match self.round.validate() {
                MatchResult::Win => self.finish_round(now),
                MatchResult::Mismatch => {
                    self.round.mark_mistake();
                    // Submissions stay on display through the recovery delay;
                    // the deadline firing clears them. The timer keeps
                    // running: mismatch time is part of the session.
                    self.recovery_due = Some(now + self.settings.mismatch_delay);
                    self.phase = SessionPhase::RoundResolving;
                    SubmitOutcome::Mismatch
                }
            },
        }
    }

    fn finish_round(&mut self, now: Instant) -> SubmitOutcome {
        self.timer.pause_round(now);

        let had_mistake = self.round.mistake_occurred();
        self.streak.record_round_result(had_mistake);

        let duration = self.timer.elapsed(now) - self.round_started_elapsed;
        self.round_durations.push(duration);

        if let Some(ref recorder) = self.recorder {
            if let Some(target) = self.round.target() {
                let record = RoundRecord {
                    sentence: target.text(),
                    duration_ms: duration.as_millis() as u64,
                    mistakes: self.round.mistake_count(),
                    streak_after: self.streak.snapshot().current,
                    timestamp: Local::now(),
                };
                let _ = recorder.record_round(&record);
            }
        }

        let session_complete = self.pool.remaining_count() == 0;
        self.phase = if session_complete {
            SessionPhase::SessionComplete
        } else {
            SessionPhase::RoundComplete
        };
        SubmitOutcome::Win { session_complete }
    }

    /// Advance past a won round. Returns false (and does nothing) unless the
    /// session is awaiting a next-round request.
    pub fn next_round(&mut self, now: Instant) -> Result<bool, SessionError> {
        if self.phase != SessionPhase::RoundComplete {
            return Ok(false);
        }

        // RoundComplete is only entered with sentences left in the pool; an
        // empty draw here is an invariant violation.
        debug_assert!(self.pool.remaining_count() > 0);
        let target = self.pool.draw()?;

        self.round_started_elapsed = self.timer.elapsed(now);
        self.round.begin(target);
        self.timer.start_round(now);
        self.recovery_due = None;
        self.phase = SessionPhase::RoundActive;
        Ok(true)
    }

    /// Fire the mismatch-recovery deadline if it has come due. Returns true
    /// when the round was cleared and reactivated, so the front end can
    /// refresh its targets.
    pub fn on_tick(&mut self, now: Instant) -> bool {
        if self.phase != SessionPhase::RoundResolving {
            return false;
        }
        match self.recovery_due {
            Some(due) if now >= due => {
                self.round.clear();
                self.recovery_due = None;
                self.phase = SessionPhase::RoundActive;
                true
            }
            _ => false,
        }
    }

    /// Manual mid-round clear. Always costs the streak: giving up on a round
    /// counts as a mistake even if nothing was ever validated.
    pub fn clear_round(&mut self) -> bool {
        if self.phase != SessionPhase::RoundActive {
            return false;
        }
        self.round.clear();
        self.round.mark_mistake();
        true
    }

    /// Abort to the title screen from any phase. Session state is discarded;
    /// the best streak survives or not per configured policy. Any in-flight
    /// recovery deadline dies with the session.
    pub fn go_to_title(&mut self, now: Instant) {
        self.timer.pause_round(now);
        self.recovery_due = None;
        self.round = RoundState::new();
        self.pool = SentencePool::new();
        self.round_durations.clear();
        if self.settings.keep_best_on_title {
            self.streak.reset_session();
        } else {
            self.streak.reset_all();
        }
        self.phase = SessionPhase::Idle;
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn target(&self) -> Option<&Sentence> {
        self.round.target()
    }

    pub fn submitted_words(&self) -> &[String] {
        self.round.submitted_words()
    }

    pub fn mistake_occurred(&self) -> bool {
        self.round.mistake_occurred()
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        self.timer.elapsed(now)
    }

    pub fn streak(&self) -> StreakSnapshot {
        self.streak.snapshot()
    }

    pub fn remaining_count(&self) -> usize {
        self.pool.remaining_count()
    }

    pub fn rounds_won(&self) -> usize {
        self.round_durations.len()
    }

    /// Durations of the rounds won so far, in play order.
    pub fn round_durations(&self) -> &[Duration] {
        &self.round_durations
    }
}
