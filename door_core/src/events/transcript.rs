use std::sync::{Mutex, PoisonError};

use riddle_rules::{JudgeResponse, RiddleDefinition};
use serde::Serialize;
use tracing::{info, warn};

/// Target used for transcript events, so they can be filtered separately.
pub const TRANSCRIPT_TARGET: &str = "riddle_door::transcript";

/// Session log. Implementations must swallow their own failures.
pub trait TranscriptSink: Send + Sync {
    fn log_riddle(&self, riddle: &RiddleDefinition);
    fn log_player(&self, text: &str);
    fn log_door(&self, text: &str);
    fn log_judge(&self, verdict: &JudgeResponse, accuracy_pct: u8);
    fn log_error(&self, context: &str, message: &str);
}

/// One transcript line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TranscriptEntry {
    Riddle {
        id: String,
        question: String,
        acceptance_criteria: String,
        hint: String,
    },
    Player {
        text: String,
    },
    Door {
        text: String,
    },
    Judge {
        solved: bool,
        confidence: f32,
        accuracy_pct: u8,
        reason: String,
    },
    Error {
        context: String,
        message: String,
    },
}

/// Emits every entry as a structured `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTranscript;

impl TranscriptSink for TracingTranscript {
    fn log_riddle(&self, riddle: &RiddleDefinition) {
        info!(
            target: TRANSCRIPT_TARGET,
            riddle_id = %riddle.id,
            question = %riddle.question,
            acceptance_criteria = %riddle.acceptance_criteria,
            hint = %riddle.hint,
            "riddle"
        );
    }

    fn log_player(&self, text: &str) {
        info!(target: TRANSCRIPT_TARGET, text, "player");
    }

    fn log_door(&self, text: &str) {
        info!(target: TRANSCRIPT_TARGET, text, "door");
    }

    fn log_judge(&self, verdict: &JudgeResponse, accuracy_pct: u8) {
        info!(
            target: TRANSCRIPT_TARGET,
            solved = verdict.solved,
            confidence = verdict.confidence,
            accuracy_pct,
            reason = %verdict.reason,
            "judge"
        );
    }

    fn log_error(&self, context: &str, message: &str) {
        warn!(target: TRANSCRIPT_TARGET, context, message, "error");
    }
}

/// Keeps entries in memory.
#[derive(Debug, Default)]
pub struct MemoryTranscript {
    entries: Mutex<Vec<TranscriptEntry>>,
}

impl MemoryTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<TranscriptEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|entry| match entry {
                TranscriptEntry::Error { message, .. } => Some(message),
                _ => None,
            })
            .collect()
    }

    fn push(&self, entry: TranscriptEntry) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }
}

impl TranscriptSink for MemoryTranscript {
    fn log_riddle(&self, riddle: &RiddleDefinition) {
        self.push(TranscriptEntry::Riddle {
            id: riddle.id.to_string(),
            question: riddle.question.clone(),
            acceptance_criteria: riddle.acceptance_criteria.clone(),
            hint: riddle.hint.clone(),
        });
    }

    fn log_player(&self, text: &str) {
        self.push(TranscriptEntry::Player {
            text: text.to_string(),
        });
    }

    fn log_door(&self, text: &str) {
        self.push(TranscriptEntry::Door {
            text: text.to_string(),
        });
    }

    fn log_judge(&self, verdict: &JudgeResponse, accuracy_pct: u8) {
        self.push(TranscriptEntry::Judge {
            solved: verdict.solved,
            confidence: verdict.confidence,
            accuracy_pct,
            reason: verdict.reason.clone(),
        });
    }

    fn log_error(&self, context: &str, message: &str) {
        self.push(TranscriptEntry::Error {
            context: context.to_string(),
            message: message.to_string(),
        });
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullTranscript;

impl TranscriptSink for NullTranscript {
    fn log_riddle(&self, _riddle: &RiddleDefinition) {}
    fn log_player(&self, _text: &str) {}
    fn log_door(&self, _text: &str) {}
    fn log_judge(&self, _verdict: &JudgeResponse, _accuracy_pct: u8) {}
    fn log_error(&self, _context: &str, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_memory_transcript() {
        let transcript = MemoryTranscript::new();
        transcript.log_player("is it a piano?");
        transcript.log_judge(&JudgeResponse::new(true, 0.9, "Matches."), 90);
        transcript.log_error("judge", "Judge JSON parse failed.");

        let entries = transcript.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(
            entries[0],
            TranscriptEntry::Player {
                text: "is it a piano?".to_string()
            }
        );
        assert_eq!(transcript.errors(), vec!["Judge JSON parse failed.".to_string()]);
    }

    #[test]
    fn test_entries_serialize_with_kind() {
        let entry = TranscriptEntry::Door {
            text: "Hmm.".to_string(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "door", "text": "Hmm."}));
    }

    #[test]
    fn test_tracing_transcript_does_not_panic_without_subscriber() {
        let transcript = TracingTranscript;
        transcript.log_riddle(&RiddleDefinition::new("q", "c", "h"));
        transcript.log_door("text");
    }

    #[test]
    fn test_null_transcript_discards_everything() {
        let sink: Arc<dyn TranscriptSink> = Arc::new(NullTranscript);
        sink.log_player("is it a piano?");
        sink.log_door("Perhaps.");
        sink.log_error("judge", "Judge JSON parse failed.");
    }
}
