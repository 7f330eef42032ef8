//! Judge verdicts.

use serde::{Deserialize, Serialize};

/// Confidence assumed when the judge reports a value outside `(0, 1]`.
pub const FALLBACK_CONFIDENCE: f32 = 0.75;

/// The judge's assessment of the player's latest answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct JudgeResponse {
    #[serde(default)]
    pub solved: bool,
    /// Expected in `(0, 1]`; anything else falls back to [`FALLBACK_CONFIDENCE`].
    #[serde(default)]
    pub confidence: f32,
    #[serde(default)]
    pub reason: String,
}

impl JudgeResponse {
    pub fn new(solved: bool, confidence: f32, reason: impl Into<String>) -> Self {
        Self {
            solved,
            confidence,
            reason: reason.into(),
        }
    }

    /// Confidence used for scoring.
    pub fn decision_confidence(&self) -> f32 {
        if self.confidence > 0.0 && self.confidence <= 1.0 {
            self.confidence
        } else {
            FALLBACK_CONFIDENCE
        }
    }

    /// Probability that the answer is correct.
    pub fn correctness(&self) -> f32 {
        let c = self.decision_confidence();
        if self.solved {
            c
        } else {
            1.0 - c
        }
    }

    /// Correctness as a whole percentage in `0..=100`. Halves round to even.
    pub fn accuracy_pct(&self) -> u8 {
        (self.correctness() * 100.0).round_ties_even().clamp(0.0, 100.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_solved() {
        assert_eq!(JudgeResponse::new(true, 0.9, "").accuracy_pct(), 90);
        assert_eq!(JudgeResponse::new(true, 1.0, "").accuracy_pct(), 100);
    }

    #[test]
    fn test_accuracy_halves_round_to_even() {
        assert_eq!(JudgeResponse::new(true, 0.125, "").accuracy_pct(), 12);
        assert_eq!(JudgeResponse::new(true, 0.625, "").accuracy_pct(), 62);
        assert_eq!(JudgeResponse::new(false, 0.875, "").accuracy_pct(), 12);
        assert_eq!(JudgeResponse::new(true, 0.375, "").accuracy_pct(), 38);
    }

    #[test]
    fn test_accuracy_unsolved_inverts_confidence() {
        assert_eq!(JudgeResponse::new(false, 0.95, "").accuracy_pct(), 5);
        assert_eq!(JudgeResponse::new(false, 1.0, "").accuracy_pct(), 0);
    }

    #[test]
    fn test_out_of_range_confidence_falls_back() {
        assert_eq!(JudgeResponse::new(true, 0.0, "").accuracy_pct(), 75);
        assert_eq!(JudgeResponse::new(true, 1.5, "").accuracy_pct(), 75);
        assert_eq!(JudgeResponse::new(false, -0.2, "").accuracy_pct(), 25);
        assert_eq!(JudgeResponse::new(true, f32::NAN, "").accuracy_pct(), 75);
    }

    #[test]
    fn test_lenient_decoding() {
        let verdict: JudgeResponse = serde_json::from_str(r#"{"solved":true}"#).unwrap();
        assert!(verdict.solved);
        assert_eq!(verdict.confidence, 0.0);
        assert_eq!(verdict.accuracy_pct(), 75);
    }
}
