//! Session state machine.
//!
//! `Idle -> Playing -> Lost`, plus `reset` back to `Idle` from anywhere.
//! The session owns its tick cadence: it starts the cadence when a session
//! or a new attempt begins and stops it on every transition away from
//! `Playing`. Requests that make no sense in the current state are
//! ignored silently.

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::config::GameConfig;
use crate::countdown::{tenths_to_secs, Countdown};
use crate::history::{AttemptRecord, History};
use crate::runtime::{Cadence, ManualCadence};
use crate::scoring::{score_countdown, AttemptScore, BonusTier, PrecisionZone};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
pub enum GameStatus {
    Idle,
    Playing,
    Lost,
}

/// Why a session reached `Lost`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
pub enum EndReason {
    /// The countdown reached zero before an activation.
    Timeout,
    /// Every attempt of the session was used.
    Completed,
}

/// Transient feedback for the presentation layer, emitted by a scoring
/// activation. Never part of the session state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feedback {
    pub points: u32,
    pub is_bonus98: bool,
    pub is_bonus99: bool,
    pub x: u16,
    pub y: u16,
    pub at: DateTime<Local>,
    /// This activation used the last attempt.
    pub ended_session: bool,
}

impl Feedback {
    pub fn tier(&self) -> BonusTier {
        BonusTier::from_flags(self.is_bonus98, self.is_bonus99)
    }
}

/// Result of an activation request.
#[derive(Debug, Clone, PartialEq)]
pub enum Activation {
    Ignored,
    /// An idle session was started; nothing was scored.
    Started,
    Scored(Feedback),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Ignored,
    Counted,
    TimedOut,
}

/// Read-only copy of the session for observers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub status: GameStatus,
    pub time_left: f64,
    pub initial_time: f64,
    pub score: u32,
    pub high_score: u32,
    pub attempts: u32,
    pub max_attempts: u32,
    pub history: Vec<AttemptRecord>,
    pub end_reason: Option<EndReason>,
}

#[derive(Debug)]
pub struct Session<C: Cadence> {
    status: GameStatus,
    countdown: Countdown,
    score: u32,
    high_score: u32,
    attempts: u32,
    max_attempts: u32,
    history: History,
    end_reason: Option<EndReason>,
    next_record_id: u64,
    cadence: C,
}

impl Session<ManualCadence> {
    /// Session whose ticks are delivered by calling `tick` directly.
    pub fn manual(config: &GameConfig) -> Self {
        Self::new(config, ManualCadence::new())
    }
}

impl<C: Cadence> Session<C> {
    pub fn new(config: &GameConfig, cadence: C) -> Self {
        debug_assert!(config.validate().is_ok(), "invalid config: {config:?}");
        Self {
            status: GameStatus::Idle,
            countdown: Countdown::new(config.initial_tenths()),
            score: 0,
            high_score: 0,
            attempts: 0,
            max_attempts: config.max_attempts,
            history: History::new(),
            end_reason: None,
            next_record_id: 1,
            cadence,
        }
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn time_left(&self) -> f64 {
        self.countdown.seconds_left()
    }

    pub fn initial_time(&self) -> f64 {
        tenths_to_secs(self.countdown.initial_tenths())
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    pub fn cadence(&self) -> &C {
        &self.cadence
    }

    pub fn zone(&self) -> PrecisionZone {
        PrecisionZone::of(&self.countdown)
    }

    /// Points an activation would earn right now.
    pub fn potential(&self) -> AttemptScore {
        score_countdown(&self.countdown)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            time_left: self.time_left(),
            initial_time: self.initial_time(),
            score: self.score,
            high_score: self.high_score,
            attempts: self.attempts,
            max_attempts: self.max_attempts,
            history: self.history.records().to_vec(),
            end_reason: self.end_reason,
        }
    }

    /// Advance the countdown by one step. Only meaningful while playing.
    pub fn tick(&mut self) -> TickOutcome {
        if self.status != GameStatus::Playing {
            tracing::trace!(status = %self.status, "tick ignored");
            return TickOutcome::Ignored;
        }

        let outcome = if self.countdown.step() {
            self.finish(EndReason::Timeout);
            TickOutcome::TimedOut
        } else {
            TickOutcome::Counted
        };
        self.check_invariants();
        outcome
    }

    /// Tick posted by the cadence; stale generations are dropped.
    pub fn handle_tick(&mut self, generation: u64) -> TickOutcome {
        if !self.cadence.is_current(generation) {
            tracing::trace!(generation, "stale tick dropped");
            return TickOutcome::Ignored;
        }
        self.tick()
    }

    /// The single player gesture. `x`/`y` are opaque display coordinates
    /// carried through to the feedback.
    pub fn activate(&mut self, x: u16, y: u16, at: DateTime<Local>) -> Activation {
        match self.status {
            GameStatus::Lost => {
                tracing::debug!("activation ignored: session is over");
                Activation::Ignored
            }
            GameStatus::Playing if self.attempts >= self.max_attempts => {
                tracing::debug!(attempts = self.attempts, "activation ignored: no attempts left");
                Activation::Ignored
            }
            GameStatus::Idle => {
                self.start();
                Activation::Started
            }
            GameStatus::Playing => Activation::Scored(self.score_attempt(x, y, at)),
        }
    }

    /// Back to `Idle`, keeping only the high score.
    pub fn reset(&mut self) {
        self.cadence.stop();
        self.status = GameStatus::Idle;
        self.countdown.restart();
        self.score = 0;
        self.attempts = 0;
        self.history.clear();
        self.end_reason = None;
        tracing::debug!(high_score = self.high_score, "session reset");
        self.check_invariants();
    }

    fn start(&mut self) {
        self.status = GameStatus::Playing;
        self.score = 0;
        self.attempts = 0;
        self.history.clear();
        self.end_reason = None;
        self.countdown.restart();
        let generation = self.cadence.start();
        tracing::info!(
            initial_time = self.initial_time(),
            max_attempts = self.max_attempts,
            generation,
            "session started"
        );
        self.check_invariants();
    }

    fn score_attempt(&mut self, x: u16, y: u16, at: DateTime<Local>) -> Feedback {
        let result = score_countdown(&self.countdown);

        self.history.push(AttemptRecord {
            id: self.next_record_id,
            time_remaining: self.countdown.seconds_left(),
            points: result.points,
            recorded_at: at,
        });
        self.next_record_id += 1;
        self.score = self.score.saturating_add(result.points);
        self.attempts += 1;

        tracing::debug!(
            attempt = self.attempts,
            time_left = self.countdown.seconds_left(),
            percent_elapsed = result.percent_elapsed,
            points = result.points,
            "attempt scored"
        );

        let ended_session = self.attempts >= self.max_attempts;
        if ended_session {
            self.finish(EndReason::Completed);
        } else {
            self.countdown.restart();
            self.cadence.start();
        }
        self.check_invariants();

        Feedback {
            points: result.points,
            is_bonus98: result.is_bonus98,
            is_bonus99: result.is_bonus99,
            x,
            y,
            at,
            ended_session,
        }
    }

    /// The one terminal transition; the high score is settled here.
    fn finish(&mut self, reason: EndReason) {
        self.cadence.stop();
        self.status = GameStatus::Lost;
        self.end_reason = Some(reason);
        if self.score > self.high_score {
            self.high_score = self.score;
        }
        tracing::info!(
            reason = %reason,
            score = self.score,
            high_score = self.high_score,
            attempts = self.attempts,
            "session over"
        );
    }

    fn check_invariants(&self) {
        debug_assert!(self.attempts <= self.max_attempts);
        debug_assert_eq!(self.history.len(), self.attempts as usize);
        debug_assert_eq!(self.score, self.history.total_points());
        debug_assert_eq!(
            self.cadence.is_running(),
            self.status == GameStatus::Playing
        );
    }
}
