//! Entity definitions for a riddle round.

mod chat;
mod riddle;
mod verdict;

pub use chat::*;
pub use riddle::*;
pub use verdict::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a riddle.
///
/// Models may supply their own ids (any non-empty string); when they do not,
/// a fresh one is synthesized from a random UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RiddleId(pub String);

impl RiddleId {
    /// Create a new random riddle ID (32 lowercase hex digits, no dashes).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Use the supplied id when it is non-blank, otherwise generate one.
    pub fn or_generate(candidate: Option<&str>) -> Self {
        match candidate.map(str::trim) {
            Some(id) if !id.is_empty() => Self(id.to_string()),
            _ => Self::generate(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RiddleId {
    fn default() -> Self {
        Self::generate()
    }
}

impl std::fmt::Display for RiddleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = RiddleId::generate();
        let b = RiddleId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 32);
    }

    #[test]
    fn test_or_generate_keeps_supplied_id() {
        assert_eq!(RiddleId::or_generate(Some("echo-1")).as_str(), "echo-1");
        assert_eq!(RiddleId::or_generate(Some(" echo-1 ")).as_str(), "echo-1");
    }

    #[test]
    fn test_or_generate_replaces_blank_id() {
        assert!(!RiddleId::or_generate(Some("   ")).as_str().is_empty());
        assert!(!RiddleId::or_generate(None).as_str().is_empty());
    }
}
