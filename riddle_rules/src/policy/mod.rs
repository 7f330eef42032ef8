//! Content policy - a coarse keyword/pattern safety net over player input and
//! door output.
//!
//! This is not a classifier. It catches the obvious cases in four categories
//! and lets everything else through; false negatives are expected. The door's
//! own system prompt carries the rest of the tone rules.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

fn pattern(source: &str) -> Regex {
    RegexBuilder::new(source)
        .case_insensitive(true)
        .build()
        .expect("invalid content policy pattern")
}

static SELF_HARM: Lazy<Regex> = Lazy::new(|| {
    pattern(
        r"\b(kill\s*yourself|kys|suicide|self[-\s]?harm|cut(ting)?\s*(myself|yourself)|end\s*my\s*life)\b",
    )
});

static HATE_HARASSMENT: Lazy<Regex> = Lazy::new(|| {
    pattern(
        r"\b(nazi|kkk|genocide|gas\s*(the|all)|racial\s*slur|kill\s*(all|those)\b)|\b(faggot|nigger|kike|spic|chink|wetback)\b",
    )
});

static GRAPHIC_VIOLENCE: Lazy<Regex> = Lazy::new(|| {
    pattern(
        r"\b(dismember|decapitat(e|ion)|gore|blood\s*(spray|spurting)|rip\s*out\s*organs|torture|snuff)\b",
    )
});

static HARD_DRUGS: Lazy<Regex> = Lazy::new(|| {
    pattern(r"\b(how\s*to\s*make\s*(meth|lsd)|cook\s*meth|drug\s*deal|sell\s*drugs)\b")
});

/// Categories in priority order; the first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyCategory {
    SelfHarm,
    HateHarassment,
    GraphicViolence,
    HardDrugs,
}

impl PolicyCategory {
    pub const PRIORITY: [PolicyCategory; 4] = [
        PolicyCategory::SelfHarm,
        PolicyCategory::HateHarassment,
        PolicyCategory::GraphicViolence,
        PolicyCategory::HardDrugs,
    ];

    fn pattern(&self) -> &'static Regex {
        match self {
            PolicyCategory::SelfHarm => &*SELF_HARM,
            PolicyCategory::HateHarassment => &*HATE_HARASSMENT,
            PolicyCategory::GraphicViolence => &*GRAPHIC_VIOLENCE,
            PolicyCategory::HardDrugs => &*HARD_DRUGS,
        }
    }

    /// Reason shown to the player when their own message is blocked.
    pub fn input_reason(&self) -> &'static str {
        match self {
            PolicyCategory::SelfHarm => "I can't help with self-harm content.",
            PolicyCategory::HateHarassment => "Hate/harassment content isn't allowed.",
            PolicyCategory::GraphicViolence => "Graphic violence isn't allowed in this game.",
            PolicyCategory::HardDrugs => "I can't help with drug-making or dealing content.",
        }
    }

    /// Reason recorded when the door's reply is blocked.
    pub fn output_reason(&self) -> &'static str {
        match self {
            PolicyCategory::SelfHarm => "NPC output violated safety rules (self-harm).",
            PolicyCategory::HateHarassment => "NPC output violated safety rules (hate/harassment).",
            PolicyCategory::GraphicViolence => {
                "NPC output violated safety rules (graphic violence)."
            }
            PolicyCategory::HardDrugs => "NPC output violated safety rules (drug content).",
        }
    }
}

/// Reason given for empty or whitespace-only player input.
pub const EMPTY_MESSAGE_REASON: &str = "Empty message.";

/// Outcome of a policy gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyDecision {
    Allowed,
    Blocked {
        /// `None` for the empty-message rule.
        category: Option<PolicyCategory>,
        reason: String,
    },
}

impl PolicyDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, PolicyDecision::Allowed)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            PolicyDecision::Allowed => None,
            PolicyDecision::Blocked { reason, .. } => Some(reason),
        }
    }

    /// Convert into a `Result`, yielding the block reason as the error.
    pub fn into_result(self) -> Result<(), String> {
        match self {
            PolicyDecision::Allowed => Ok(()),
            PolicyDecision::Blocked { reason, .. } => Err(reason),
        }
    }
}

/// Stateless content gate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentPolicy;

impl ContentPolicy {
    pub fn new() -> Self {
        Self
    }

    /// Gate for player input. Blank input is blocked.
    pub fn check_input(&self, text: &str) -> PolicyDecision {
        if text.trim().is_empty() {
            return PolicyDecision::Blocked {
                category: None,
                reason: EMPTY_MESSAGE_REASON.to_string(),
            };
        }
        match Self::first_match(text) {
            Some(category) => PolicyDecision::Blocked {
                category: Some(category),
                reason: category.input_reason().to_string(),
            },
            None => PolicyDecision::Allowed,
        }
    }

    /// Gate for model output. Blank output is vacuously allowed.
    pub fn check_output(&self, text: &str) -> PolicyDecision {
        if text.trim().is_empty() {
            return PolicyDecision::Allowed;
        }
        match Self::first_match(text) {
            Some(category) => PolicyDecision::Blocked {
                category: Some(category),
                reason: category.output_reason().to_string(),
            },
            None => PolicyDecision::Allowed,
        }
    }

    fn first_match(text: &str) -> Option<PolicyCategory> {
        PolicyCategory::PRIORITY
            .into_iter()
            .find(|category| category.pattern().is_match(text))
    }

    /// In-character line shown in place of a blocked door reply.
    pub fn pg13_refusal_line() -> &'static str {
        "The door's runes dim. \"No. Keep it PG-13, traveler. Back to the riddle.\""
    }
}
