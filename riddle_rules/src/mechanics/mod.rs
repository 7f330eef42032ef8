//! Game mechanics: phases, turn decisions, urgency cues.

use serde::{Deserialize, Serialize};

/// Default accuracy (in percent) needed to win a round.
pub const DEFAULT_WIN_THRESHOLD: u8 = 100;

/// Default number of attempts per round.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Phases of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GamePhase {
    /// Waiting for the conversation to begin, or generating the riddle.
    #[default]
    Boot,
    PresentRiddle,
    AwaitPlayerAnswer,
    /// The door is replying to the player's message.
    DoorResponding,
    /// The judge is scoring the player's message.
    Judging,
    /// Terminal until the round is reset.
    Ended,
}

impl GamePhase {
    /// Phases in which new player input must be refused.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, GamePhase::DoorResponding | GamePhase::Judging)
    }
}

/// What a scored turn means for the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnDecision {
    /// Accuracy reached the win threshold.
    Won,
    /// The judge said solved, but accuracy stayed below the threshold.
    /// No attempt is consumed.
    Refine,
    /// Wrong answer; one attempt consumed and some remain.
    TryAgain { remaining: u32 },
    /// Wrong answer and no attempts remain.
    Lost,
}

impl TurnDecision {
    pub fn ends_round(&self) -> bool {
        matches!(self, TurnDecision::Won | TurnDecision::Lost)
    }

    pub fn consumed_attempt(&self) -> bool {
        matches!(self, TurnDecision::TryAgain { .. } | TurnDecision::Lost)
    }
}

/// Qualitative pressure the door may put on the player.
///
/// Cues fire only at exactly three and exactly one remaining attempts so the
/// door never has to say a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UrgencyCue {
    None,
    /// Playful pressure.
    Tease,
    /// Dramatic last-chance line.
    FinalChance,
}

impl UrgencyCue {
    pub fn for_remaining(remaining_attempts: u32) -> Self {
        match remaining_attempts {
            3 => UrgencyCue::Tease,
            1 => UrgencyCue::FinalChance,
            _ => UrgencyCue::None,
        }
    }

    /// Instruction for the door describing the cue, without numbers.
    pub fn instruction(&self) -> &'static str {
        match self {
            UrgencyCue::None => "No special urgency right now; mention attempts only occasionally.",
            UrgencyCue::Tease => {
                "Include ONE short teasing line with playful pressure (no numbers)."
            }
            UrgencyCue::FinalChance => {
                "Include ONE dramatic line making clear this is the final chance (no numbers)."
            }
        }
    }
}
