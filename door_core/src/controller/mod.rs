//! The game controller - sequences generation, presentation, player turns,
//! judging and the end of a round.
//!
//! Every network call is awaited in order; nothing runs in parallel within a
//! round. A turn captures the round epoch when it starts and re-checks it
//! after each suspension, so a round reset silently discards whatever was
//! still in flight.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use riddle_rules::{
    ContentPolicy, GamePhase, JudgeResponse, PolicyDecision, RiddleDefinition, RoundState,
    TurnDecision, TurnRejection,
};
use tracing::{debug, info, warn};

use crate::backend::ChatBackend;
use crate::config::{GameConfig, JudgeDisplayMode};
use crate::dialogue::DialogueSession;
use crate::error::{DoorError, Result};
use crate::events::{Presenter, TranscriptSink};
use crate::generator::RiddleGenerator;
use crate::judge::RiddleJudge;
use crate::prompt::TurnContext;

pub const STATUS_IDLE: &str = "Approach the door and press E...";
pub const NO_RIDDLE_DEFINED: &str = "No riddle defined.";

/// What a call to [`RiddleGameController::submit_player_message`] led to.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// Not accepted: the round is over, not started, busy, has no riddle, or
    /// was reset while the turn was in flight.
    Ignored,
    /// The player's message was rejected by the content policy.
    Blocked { reason: String },
    /// The door or the judge failed. No attempt was consumed.
    Failed { error: String },
    Continue {
        accuracy: u8,
        attempt_consumed: bool,
        remaining: u32,
    },
    RoundOver { won: bool, accuracy: u8 },
}

pub struct RiddleGameController {
    config: GameConfig,
    policy: ContentPolicy,
    session: DialogueSession,
    generator: RiddleGenerator,
    judge: RiddleJudge,
    presenter: Arc<dyn Presenter>,
    transcript: Arc<dyn TranscriptSink>,
    state: Mutex<RoundState>,
}

impl RiddleGameController {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        config: GameConfig,
        presenter: Arc<dyn Presenter>,
        transcript: Arc<dyn TranscriptSink>,
    ) -> Self {
        let policy = ContentPolicy::new();
        let state = RoundState::new(config.max_attempts);
        let controller = Self {
            session: DialogueSession::new(backend.clone(), policy),
            generator: RiddleGenerator::new(backend.clone()),
            judge: RiddleJudge::new(backend),
            policy,
            config,
            presenter,
            transcript,
            state: Mutex::new(state),
        };

        controller.presenter.set_attempts(controller.remaining_attempts());
        controller.reset_chat_to_greeting();
        controller
    }

    pub fn phase(&self) -> GamePhase {
        self.lock_state().phase()
    }

    pub fn remaining_attempts(&self) -> u32 {
        self.lock_state().remaining_attempts()
    }

    pub fn current_riddle(&self) -> Option<RiddleDefinition> {
        self.lock_state().riddle().cloned()
    }

    /// True while a turn is in flight or the round has ended.
    pub fn is_busy(&self) -> bool {
        self.lock_state().is_busy()
    }

    pub fn is_ended(&self) -> bool {
        self.lock_state().is_ended()
    }

    /// A copy of the round state.
    pub fn snapshot(&self) -> RoundState {
        self.lock_state().clone()
    }

    pub fn session(&self) -> &DialogueSession {
        &self.session
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Start the round: obtain a riddle and present it.
    ///
    /// Returns `Ok(None)` when the round was already started or ended, or
    /// was reset while the riddle was being generated. On error the round
    /// stays started without a riddle and accepts no turns until reset.
    pub async fn begin_conversation(&self) -> Result<Option<RiddleDefinition>> {
        let Some(epoch) = self.lock_state().begin() else {
            return Ok(None);
        };
        info!(epoch, "round started");

        let riddle = if self.config.generate_riddle_on_start {
            self.presenter.set_status("Summoning a riddle...");
            match self.generator.generate(&self.config.riddle_theme_extra).await {
                Ok(riddle) => Some(riddle),
                Err(e) => {
                    if self.is_current(epoch) {
                        self.transcript.log_error("generator", &e.to_string());
                        self.presenter.append_text(&format!("\n[Error: {}]", e));
                        self.presenter.set_status("Error.");
                    }
                    return Err(e);
                }
            }
        } else {
            self.config.manual_riddle.clone()
        };

        if !self.is_current(epoch) {
            debug!(epoch, "round reset during generation");
            return Ok(None);
        }

        let riddle = match riddle.filter(RiddleDefinition::is_presentable) {
            Some(riddle) => riddle,
            None => {
                self.transcript.log_error("generator", NO_RIDDLE_DEFINED);
                self.presenter.append_text(&format!("\n[{}]", NO_RIDDLE_DEFINED));
                self.presenter.set_status("Error.");
                return Err(DoorError::Precondition(NO_RIDDLE_DEFINED.to_string()));
            }
        };

        self.transcript.log_riddle(&riddle);
        {
            let mut state = self.lock_state();
            state.present(riddle.clone());
            self.presenter.append_text(&format!(
                "\nDoor: Very well. Solve this riddle:\n\"{}\"",
                riddle.question
            ));
            state.await_answer();
        }
        self.presenter.set_status("Answer the riddle.");
        info!(epoch, riddle_id = %riddle.id, "riddle presented");
        Ok(Some(riddle))
    }

    /// Handle one player message: door reply, judgement, scoring.
    pub async fn submit_player_message(&self, player_text: &str) -> TurnOutcome {
        let ticket = {
            let mut state = self.lock_state();
            if state.is_ended() {
                self.presenter.set_status("Finished.");
                return TurnOutcome::Ignored;
            }
            if !state.is_started() {
                self.presenter.append_text("\n[Talk to the door first.]");
                return TurnOutcome::Ignored;
            }
            if state.is_busy() {
                self.presenter.set_status("Wait...");
                return TurnOutcome::Ignored;
            }
            if let PolicyDecision::Blocked { reason, .. } = self.policy.check_input(player_text) {
                self.presenter.append_text(&format!("\n[Blocked: {}]", reason));
                self.presenter.set_status("Blocked.");
                return TurnOutcome::Blocked { reason };
            }
            match state.start_turn() {
                Ok(ticket) => ticket,
                Err(TurnRejection::NoRiddle) => {
                    self.presenter.append_text("\n[The door hasn't posed a riddle yet.]");
                    self.presenter.set_status("No riddle.");
                    return TurnOutcome::Ignored;
                }
                Err(rejection) => {
                    debug!(%rejection, "turn rejected");
                    return TurnOutcome::Ignored;
                }
            }
        };
        let epoch = ticket.epoch;

        self.transcript.log_player(player_text);
        self.presenter.append_text(&format!("\nYou: {}\nDoor: ", player_text));
        self.presenter.set_status("Door is speaking...");

        let ctx = TurnContext::new(
            Some(&ticket.riddle),
            ticket.remaining_attempts,
            ticket.max_attempts,
        );
        let presenter = &self.presenter;
        let state = &self.state;
        let on_char = |c: char| {
            let current = state
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .is_current(epoch);
            if current {
                let mut buf = [0u8; 4];
                presenter.append_text(c.encode_utf8(&mut buf));
            }
        };

        let reply = self
            .session
            .respond(ctx, player_text, self.config.chars_per_second, on_char)
            .await;
        if !self.is_current(epoch) {
            debug!(epoch, "round reset during door reply");
            return TurnOutcome::Ignored;
        }

        let reply = match reply {
            Ok(reply) => reply,
            Err(e) => return self.turn_failed("door", e),
        };
        self.transcript.log_door(&reply);

        self.lock_state().start_judging();
        self.presenter.set_status("Judging your answer...");

        let verdict = self.judge.evaluate(Some(&ticket.riddle), player_text).await;
        if !self.is_current(epoch) {
            debug!(epoch, "round reset during judging");
            return TurnOutcome::Ignored;
        }

        match verdict {
            Ok(verdict) => self.score(epoch, &verdict).await,
            Err(e) => self.turn_failed("judge", e),
        }
    }

    /// Abandon the current round at any time. Anything in flight is
    /// discarded when it completes.
    pub fn reset_round(&self) {
        let epoch = {
            let mut state = self.lock_state();
            state.reset();
            state.epoch()
        };
        self.session.clear_history();
        self.presenter.set_attempts(self.remaining_attempts());
        self.reset_chat_to_greeting();
        info!(epoch, "round reset");
    }

    async fn score(&self, epoch: u64, verdict: &JudgeResponse) -> TurnOutcome {
        let accuracy = verdict.accuracy_pct();
        self.transcript.log_judge(verdict, accuracy);

        match self.config.judge_display_mode {
            JudgeDisplayMode::None => {}
            JudgeDisplayMode::AccuracyOnly => {
                self.presenter.append_text(&format!("\n\nRiddle Accuracy: {}%", accuracy));
            }
            JudgeDisplayMode::AccuracyAndReason => {
                self.presenter.append_text(&format!(
                    "\n\nRiddle Accuracy: {}%\n{}",
                    accuracy, verdict.reason
                ));
            }
        }

        let (decision, remaining) = {
            let mut state = self.lock_state();
            let decision = state.apply_verdict(verdict, self.config.win_accuracy_threshold);
            (decision, state.remaining_attempts())
        };
        self.presenter.set_attempts(remaining);
        debug!(epoch, accuracy, ?decision, remaining, "turn scored");

        let Some(decision) = decision else {
            return TurnOutcome::Ignored;
        };
        if decision.ends_round() {
            let won = decision == TurnDecision::Won;
            self.end_round(epoch, won).await;
            return TurnOutcome::RoundOver { won, accuracy };
        }

        if decision.consumed_attempt() {
            self.presenter.set_status(&format!("Try again. Attempts left: {}", remaining));
        } else {
            self.presenter.set_status("Close... refine your answer.");
        }
        TurnOutcome::Continue {
            accuracy,
            attempt_consumed: decision.consumed_attempt(),
            remaining,
        }
    }

    /// Show the result, wait out the dwell, then reset for a new round.
    async fn end_round(&self, epoch: u64, won: bool) {
        info!(epoch, won, "round over");
        self.presenter.show_round_result(won);
        self.presenter.set_status(if won { "Solved!" } else { "Game Over" });

        tokio::time::sleep(dwell(self.config.end_screen_seconds)).await;

        {
            let mut state = self.lock_state();
            if !state.is_current(epoch) {
                return;
            }
            state.reset();
        }
        self.session.clear_history();
        self.presenter.set_attempts(self.remaining_attempts());
        self.reset_chat_to_greeting();
    }

    fn turn_failed(&self, context: &str, error: DoorError) -> TurnOutcome {
        let message = error.to_string();
        warn!(context, error = %message, "turn failed");
        self.transcript.log_error(context, &message);

        if error.is_output_blocked() {
            self.presenter.append_text(ContentPolicy::pg13_refusal_line());
            self.presenter.set_status("Answer the riddle.");
        } else if context == "judge" {
            self.presenter.append_text(&format!("\n\n[Judge Error: {}]", message));
            self.presenter.set_status("Error.");
        } else {
            self.presenter.append_text(&format!("\n\n[Error: {}]", message));
            self.presenter.set_status("Error.");
        }

        self.lock_state().await_answer();
        TurnOutcome::Failed { error: message }
    }

    fn reset_chat_to_greeting(&self) {
        self.presenter.set_full_text(&format!("Door: {}\n", self.session.greeting()));
        self.presenter.set_status(STATUS_IDLE);
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.lock_state().is_current(epoch)
    }

    fn lock_state(&self) -> MutexGuard<'_, RoundState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Longest the end-of-round screen is held.
const MAX_DWELL: Duration = Duration::from_secs(600);

fn dwell(seconds: f32) -> Duration {
    if !(seconds.is_finite() && seconds > 0.0) {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f32(seconds).map_or(MAX_DWELL, |dwell| dwell.min(MAX_DWELL))
}
