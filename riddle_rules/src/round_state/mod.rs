//! Round state management - phase, active riddle and attempt counters for one
//! conversation with the door.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::{JudgeResponse, RiddleDefinition};
use crate::mechanics::{GamePhase, TurnDecision};

/// How a finished round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundResult {
    Won,
    Lost,
}

/// Why a player turn cannot start right now.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TurnRejection {
    #[error("the round has ended")]
    Ended,
    #[error("the conversation has not started")]
    NotStarted,
    #[error("a turn is already in progress")]
    Busy,
    #[error("no riddle has been posed yet")]
    NoRiddle,
}

/// Everything a turn needs, captured by value when the turn starts.
///
/// `epoch` identifies the round; results carrying an older epoch must be
/// discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnTicket {
    pub epoch: u64,
    pub riddle: RiddleDefinition,
    pub remaining_attempts: u32,
    pub max_attempts: u32,
}

/// The complete state of a round at any point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundState {
    phase: GamePhase,
    riddle: Option<RiddleDefinition>,
    remaining_attempts: u32,
    max_attempts: u32,
    started: bool,
    result: Option<RoundResult>,
    /// Bumped on every reset.
    epoch: u64,
}

impl RoundState {
    /// Create a fresh round. `max_attempts` is floored at one.
    pub fn new(max_attempts: u32) -> Self {
        let max_attempts = max_attempts.max(1);
        Self {
            phase: GamePhase::Boot,
            riddle: None,
            remaining_attempts: max_attempts,
            max_attempts,
            started: false,
            result: None,
            epoch: 0,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn riddle(&self) -> Option<&RiddleDefinition> {
        self.riddle.as_ref()
    }

    pub fn remaining_attempts(&self) -> u32 {
        self.remaining_attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_ended(&self) -> bool {
        self.result.is_some()
    }

    pub fn result(&self) -> Option<RoundResult> {
        self.result
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Whether `epoch` still refers to this round.
    pub fn is_current(&self, epoch: u64) -> bool {
        self.epoch == epoch
    }

    /// True while a turn is in flight or the round has ended. New player
    /// input must be refused.
    pub fn is_busy(&self) -> bool {
        self.is_ended() || self.phase.is_in_flight()
    }

    /// Mark the conversation as started. Returns the round epoch, or `None`
    /// if the round already started or ended.
    pub fn begin(&mut self) -> Option<u64> {
        if self.is_ended() || self.started {
            return None;
        }
        self.started = true;
        self.phase = GamePhase::Boot;
        Some(self.epoch)
    }

    /// Install the riddle for this round and move on to presenting it.
    pub fn present(&mut self, riddle: RiddleDefinition) {
        self.riddle = Some(riddle);
        self.phase = GamePhase::PresentRiddle;
    }

    /// Ready for the player's next answer.
    pub fn await_answer(&mut self) {
        if !self.is_ended() {
            self.phase = GamePhase::AwaitPlayerAnswer;
        }
    }

    /// Start a player turn: the door is about to respond.
    pub fn start_turn(&mut self) -> Result<TurnTicket, TurnRejection> {
        if self.is_ended() {
            return Err(TurnRejection::Ended);
        }
        if !self.started {
            return Err(TurnRejection::NotStarted);
        }
        if self.is_busy() {
            return Err(TurnRejection::Busy);
        }
        let riddle = self.riddle.clone().ok_or(TurnRejection::NoRiddle)?;

        self.phase = GamePhase::DoorResponding;
        Ok(TurnTicket {
            epoch: self.epoch,
            riddle,
            remaining_attempts: self.remaining_attempts,
            max_attempts: self.max_attempts,
        })
    }

    /// The door has replied; the judge takes over.
    pub fn start_judging(&mut self) {
        if self.phase == GamePhase::DoorResponding {
            self.phase = GamePhase::Judging;
        }
    }

    /// Consume one attempt. Never goes below zero and never runs once the
    /// round is decided.
    pub fn consume_attempt(&mut self) -> bool {
        if self.is_ended() || self.remaining_attempts == 0 {
            return false;
        }
        self.remaining_attempts -= 1;
        true
    }

    /// Score a verdict and advance the round.
    ///
    /// Winning depends only on the accuracy derived from the verdict, not on
    /// its `solved` flag. Returns `None` if the round was already decided.
    pub fn apply_verdict(
        &mut self,
        verdict: &JudgeResponse,
        win_threshold: u8,
    ) -> Option<TurnDecision> {
        if self.is_ended() {
            return None;
        }

        if verdict.accuracy_pct() >= win_threshold {
            self.end(RoundResult::Won);
            return Some(TurnDecision::Won);
        }

        if verdict.solved {
            self.phase = GamePhase::AwaitPlayerAnswer;
            return Some(TurnDecision::Refine);
        }

        self.consume_attempt();
        if self.remaining_attempts == 0 {
            self.end(RoundResult::Lost);
            return Some(TurnDecision::Lost);
        }

        self.phase = GamePhase::AwaitPlayerAnswer;
        Some(TurnDecision::TryAgain {
            remaining: self.remaining_attempts,
        })
    }

    /// End the round. The first result sticks.
    pub fn end(&mut self, result: RoundResult) {
        if self.is_ended() {
            return;
        }
        self.result = Some(result);
        self.phase = GamePhase::Ended;
    }

    /// Reset for a new round and invalidate everything issued under the old
    /// epoch.
    pub fn reset(&mut self) {
        self.phase = GamePhase::Boot;
        self.riddle = None;
        self.remaining_attempts = self.max_attempts;
        self.started = false;
        self.result = None;
        self.epoch = self.epoch.wrapping_add(1);
    }
}

impl Default for RoundState {
    fn default() -> Self {
        Self::new(crate::mechanics::DEFAULT_MAX_ATTEMPTS)
    }
}
