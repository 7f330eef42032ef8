//! Riddle judging - scores the player's latest answer against the
//! acceptance criteria. Only the latest utterance is judged, never the
//! conversation history.

use std::sync::Arc;

use riddle_rules::{ChatMessage, JudgeResponse, RiddleDefinition};
use tracing::debug;

use crate::backend::ChatBackend;
use crate::envelope;
use crate::error::{DoorError, Result, Stage};
use crate::prompt::JUDGE_SYSTEM_PROMPT;

pub const NO_RIDDLE: &str = "Judge called but no riddle has been generated yet.";
pub const INCOMPLETE_RIDDLE: &str =
    "Judge called with incomplete riddle (question/acceptanceCriteria missing).";

pub struct RiddleJudge {
    backend: Arc<dyn ChatBackend>,
}

impl RiddleJudge {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self { backend }
    }

    /// Score `player_last_answer`. Fails fast, without a request, when the
    /// riddle is missing or incomplete.
    pub async fn evaluate(
        &self,
        riddle: Option<&RiddleDefinition>,
        player_last_answer: &str,
    ) -> Result<JudgeResponse> {
        let riddle = riddle.ok_or_else(|| DoorError::Precondition(NO_RIDDLE.to_string()))?;
        riddle
            .validate_for_judging()
            .map_err(|_| DoorError::Precondition(INCOMPLETE_RIDDLE.to_string()))?;

        let messages = [
            ChatMessage::system(JUDGE_SYSTEM_PROMPT),
            ChatMessage::user(user_block(riddle, player_last_answer)),
        ];

        let raw = self.backend.chat_once(&messages).await?;
        let verdict: JudgeResponse = envelope::decode(&raw, Stage::Judge)?;
        debug!(
            riddle_id = %riddle.id,
            solved = verdict.solved,
            confidence = verdict.confidence,
            "judge verdict"
        );
        Ok(verdict)
    }
}

fn user_block(riddle: &RiddleDefinition, player_last_answer: &str) -> String {
    format!(
        "RIDDLE:\nQuestion: {}\nAcceptance criteria: {}\n\nPLAYER_LAST_ANSWER:\n{}",
        riddle.question, riddle.acceptance_criteria, player_last_answer
    )
}
