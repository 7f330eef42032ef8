//! Riddle definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::RiddleId;

/// Why a riddle cannot be judged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RiddleError {
    #[error("riddle has no question")]
    MissingQuestion,
    #[error("riddle has no acceptance criteria")]
    MissingAcceptanceCriteria,
}

/// A riddle posed for one round. Read-only once the round has started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiddleDefinition {
    #[serde(default = "RiddleId::generate")]
    pub id: RiddleId,
    #[serde(default)]
    pub question: String,
    /// What a correct answer must satisfy. Only the judge ever sees this.
    #[serde(default)]
    pub acceptance_criteria: String,
    #[serde(default)]
    pub hint: String,
}

impl RiddleDefinition {
    /// Create a riddle with a freshly generated id.
    pub fn new(
        question: impl Into<String>,
        acceptance_criteria: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        Self {
            id: RiddleId::generate(),
            question: question.into(),
            acceptance_criteria: acceptance_criteria.into(),
            hint: hint.into(),
        }
    }

    pub fn with_id(mut self, id: RiddleId) -> Self {
        self.id = id;
        self
    }

    /// A riddle can be presented once it has a non-blank question.
    pub fn is_presentable(&self) -> bool {
        !self.question.trim().is_empty()
    }

    /// Check the fields the judge needs.
    pub fn validate_for_judging(&self) -> Result<(), RiddleError> {
        if self.question.trim().is_empty() {
            return Err(RiddleError::MissingQuestion);
        }
        if self.acceptance_criteria.trim().is_empty() {
            return Err(RiddleError::MissingAcceptanceCriteria);
        }
        Ok(())
    }
}

impl std::fmt::Display for RiddleDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} (Criteria: {})",
            self.id, self.question, self.acceptance_criteria
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_riddle() {
        let riddle = RiddleDefinition::new("What has keys but no locks?", "a piano", "music");
        assert!(riddle.is_presentable());
        assert!(riddle.validate_for_judging().is_ok());
        assert!(!riddle.id.as_str().is_empty());
    }

    #[test]
    fn test_validate_for_judging() {
        let mut riddle = RiddleDefinition::new("  ", "a piano", "");
        assert_eq!(
            riddle.validate_for_judging(),
            Err(RiddleError::MissingQuestion)
        );
        assert!(!riddle.is_presentable());

        riddle.question = "What has keys?".to_string();
        riddle.acceptance_criteria = "\n".to_string();
        assert_eq!(
            riddle.validate_for_judging(),
            Err(RiddleError::MissingAcceptanceCriteria)
        );
    }

    #[test]
    fn test_deserialize_camel_case_with_missing_fields() {
        let riddle: RiddleDefinition =
            serde_json::from_str(r#"{"question":"Q?","acceptanceCriteria":"echo"}"#).unwrap();
        assert_eq!(riddle.question, "Q?");
        assert_eq!(riddle.acceptance_criteria, "echo");
        assert_eq!(riddle.hint, "");
        assert!(!riddle.id.as_str().is_empty());
    }

    #[test]
    fn test_display() {
        let riddle = RiddleDefinition::new("Q?", "echo", "").with_id(RiddleId("r1".into()));
        assert_eq!(riddle.to_string(), "[r1] Q? (Criteria: echo)");
    }
}
