//! Riddle generation - one structured call per round.

use std::sync::Arc;

use riddle_rules::{ChatMessage, RiddleDefinition, RiddleId};
use serde::Deserialize;
use tracing::{debug, info};

use crate::backend::ChatBackend;
use crate::envelope;
use crate::error::{Result, Stage};
use crate::prompt::GENERATOR_SYSTEM_PROMPT;

/// What the model is asked to produce. Every field is optional on the wire.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct GeneratedRiddle {
    id: Option<String>,
    question: Option<String>,
    acceptance_criteria: Option<String>,
    hint: Option<String>,
}

impl From<GeneratedRiddle> for RiddleDefinition {
    fn from(raw: GeneratedRiddle) -> Self {
        RiddleDefinition {
            id: RiddleId::or_generate(raw.id.as_deref()),
            question: raw.question.unwrap_or_default(),
            acceptance_criteria: raw.acceptance_criteria.unwrap_or_default(),
            hint: raw.hint.unwrap_or_default(),
        }
    }
}

pub struct RiddleGenerator {
    backend: Arc<dyn ChatBackend>,
}

impl RiddleGenerator {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self { backend }
    }

    /// Ask the backend for a riddle.
    ///
    /// A missing id is synthesized. Other fields pass through as given, even
    /// when empty; callers check [`RiddleDefinition::is_presentable`].
    pub async fn generate(&self, theme_extra: &str) -> Result<RiddleDefinition> {
        let messages = [
            ChatMessage::system(GENERATOR_SYSTEM_PROMPT),
            ChatMessage::user(format!("Extra theme constraints: {}", theme_extra)),
        ];

        let raw = self.backend.chat_once(&messages).await?;
        debug!(raw_len = raw.len(), "generator reply received");

        let parsed: GeneratedRiddle = envelope::decode(&raw, Stage::Generator)?;
        let riddle = RiddleDefinition::from(parsed);
        info!(riddle_id = %riddle.id, "riddle generated");
        Ok(riddle)
    }
}
