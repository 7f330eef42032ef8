//! Prompt Assembler - derives the door's system prompt from the round state.
//!
//! The prompt is rebuilt for every request and never stored in the
//! conversation history. It is assembled in a fixed order:
//! 1. **Persona**: tone, safety and riddle-handling rules
//! 2. **Scene**: the greeting the player has already seen
//! 3. **Game state**: private attempt counts and the current urgency cue
//! 4. **Teasing examples**
//! 5. **Riddle**: question and hint, only while a riddle is active

mod templates;

pub use templates::*;

use riddle_rules::{RiddleDefinition, UrgencyCue};
use serde::Serialize;

/// Round state a single door reply depends on.
#[derive(Debug, Clone, Copy)]
pub struct TurnContext<'a> {
    pub riddle: Option<&'a RiddleDefinition>,
    pub remaining_attempts: u32,
    pub max_attempts: u32,
}

impl<'a> TurnContext<'a> {
    pub fn new(
        riddle: Option<&'a RiddleDefinition>,
        remaining_attempts: u32,
        max_attempts: u32,
    ) -> Self {
        Self {
            riddle,
            remaining_attempts,
            max_attempts,
        }
    }
}

/// Riddle fields the door may talk about. The acceptance criteria are
/// deliberately absent.
#[derive(Debug, Clone, Serialize)]
pub struct RiddleContext {
    pub question: String,
    pub hint: String,
}

/// The assembled context ready for prompt generation.
#[derive(Debug, Clone, Serialize)]
pub struct DoorPrompt {
    pub greeting: String,
    pub remaining_attempts: u32,
    pub max_attempts: u32,
    pub urgency: UrgencyCue,
    pub riddle: Option<RiddleContext>,
}

impl DoorPrompt {
    /// Assemble the prompt for one turn.
    pub fn assemble(ctx: &TurnContext<'_>) -> Self {
        let riddle = ctx
            .riddle
            .filter(|r| r.is_presentable())
            .map(|r| RiddleContext {
                question: r.question.clone(),
                hint: r.hint.clone(),
            });

        Self {
            greeting: GREETING.to_string(),
            remaining_attempts: ctx.remaining_attempts,
            max_attempts: ctx.max_attempts,
            urgency: UrgencyCue::for_remaining(ctx.remaining_attempts),
            riddle,
        }
    }

    /// Format the context as a system prompt.
    pub fn to_prompt_string(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(DOOR_PERSONA);
        prompt.push_str("\n\n");

        prompt.push_str("Scene:\n");
        prompt.push_str(&format!("You already greeted the player with: {}\n\n", self.greeting));

        prompt.push_str("Game state (private):\n");
        prompt.push_str(&format!(
            "Attempts remaining (number, do NOT say it): {} of {}\n",
            self.remaining_attempts, self.max_attempts
        ));
        prompt.push_str(ATTEMPT_RULES);
        prompt.push('\n');
        prompt.push_str(&format!("Right now: {}\n\n", self.urgency.instruction()));

        prompt.push_str(TEASING_EXAMPLES);
        prompt.push('\n');

        if let Some(riddle) = &self.riddle {
            prompt.push_str("\nCurrent riddle:\n");
            prompt.push_str(&format!("Question: {}\n", riddle.question));
            prompt.push_str(&format!("Hint you may give if asked: {}\n", riddle.hint));
            prompt.push_str(RIDDLE_RULES);
            prompt.push('\n');
        }

        prompt
    }
}

/// Shorthand for `DoorPrompt::assemble(ctx).to_prompt_string()`.
pub fn door_system_prompt(ctx: &TurnContext<'_>) -> String {
    DoorPrompt::assemble(ctx).to_prompt_string()
}
