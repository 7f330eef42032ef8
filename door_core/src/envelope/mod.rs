//! JSON envelope extraction - isolates the JSON payload a model was asked to
//! wrap in `<JSON>...</JSON>` or a fenced code block.
//!
//! Nothing here validates JSON grammar. The extracted text is only the
//! likely-JSON substring; decoding it is a separate step with its own error.

use serde::de::DeserializeOwned;

use crate::error::{DoorError, Result, Stage};

pub const OPEN_TAG: &str = "<JSON>";
pub const CLOSE_TAG: &str = "</JSON>";
const FENCE: &str = "```";

/// Extract the JSON payload from free-form model text.
///
/// Tag envelopes take precedence over code fences. Returns `None` when
/// neither yields a non-empty payload.
pub fn extract(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }

    between_tags(text)
        .or_else(|| code_fence(text))
        .and_then(sanitize_json)
}

fn between_tags(text: &str) -> Option<&str> {
    let open = text.find(OPEN_TAG)?;
    let start = open + OPEN_TAG.len();
    let end = start + text[start..].find(CLOSE_TAG)?;
    non_empty(text[start..end].trim())
}

fn code_fence(text: &str) -> Option<&str> {
    let open = text.find(FENCE)?;
    // Whatever follows the opening fence on its line is the language tag.
    let line_end = open + FENCE.len() + text[open + FENCE.len()..].find('\n')?;
    let start = line_end + 1;
    let end = start + text[start..].find(FENCE)?;
    non_empty(text[start..end].trim())
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Strip a byte-order mark and any preamble before the first `{` or `[`.
pub fn sanitize_json(input: &str) -> Option<String> {
    let s = input.trim().trim_start_matches('\u{FEFF}');
    let s = match s.find(&['{', '['][..]) {
        Some(first) => &s[first..],
        None => s,
    };
    non_empty(s.trim()).map(str::to_string)
}

/// Extract and decode an enveloped JSON object.
pub fn decode<T: DeserializeOwned>(raw: &str, stage: Stage) -> Result<T> {
    let json = extract(raw).ok_or(DoorError::NoEnvelope { stage })?;
    serde_json::from_str(&json).map_err(|source| DoorError::Decode { stage, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_tag_envelope() {
        let raw = "Sure thing!\n<JSON>\n  {\"a\":1}  \n</JSON>\nanything else";
        assert_eq!(extract(raw).as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn test_code_fence() {
        let raw = "Here you go:\n```json\n{\"a\":1}\n```\nBye";
        assert_eq!(extract(raw).as_deref(), Some("{\"a\":1}"));

        let bare = "```\n[1,2]\n```";
        assert_eq!(extract(bare).as_deref(), Some("[1,2]"));
    }

    #[test]
    fn test_tags_win_over_fence() {
        let raw = "```json\n{\"fence\":true}\n```\n<JSON>{\"tag\":true}</JSON>";
        assert_eq!(extract(raw).as_deref(), Some("{\"tag\":true}"));
    }

    #[test]
    fn test_empty_tags_fall_back_to_fence() {
        let raw = "<JSON>   </JSON>\n```\n{\"a\":2}\n```";
        assert_eq!(extract(raw).as_deref(), Some("{\"a\":2}"));
    }

    #[test]
    fn test_no_envelope() {
        assert_eq!(extract(""), None);
        assert_eq!(extract("{\"a\":1}"), None);
        assert_eq!(extract("<JSON>{\"a\":1}"), None);
        assert_eq!(extract("```json {\"a\":1}```"), None);
    }

    #[test]
    fn test_sanitize_strips_preamble_and_bom() {
        assert_eq!(sanitize_json("Sure! {\"a\":1}").as_deref(), Some("{\"a\":1}"));
        assert_eq!(sanitize_json("\u{FEFF}{\"a\":1}").as_deref(), Some("{\"a\":1}"));
        assert_eq!(sanitize_json("list: [1] {").as_deref(), Some("[1] {"));
        assert_eq!(sanitize_json("no json here").as_deref(), Some("no json here"));
        assert_eq!(sanitize_json("  "), None);
    }

    #[test]
    fn test_preamble_inside_envelope() {
        let raw = "<JSON>Here is the JSON: {\"a\":1}</JSON>";
        assert_eq!(extract(raw).as_deref(), Some("{\"a\":1}"));
    }

    #[derive(Debug, Deserialize)]
    struct Sample {
        a: i32,
    }

    #[test]
    fn test_decode_errors_are_distinct() {
        let sample: Sample = decode("<JSON>{\"a\":7}</JSON>", Stage::Judge).unwrap();
        assert_eq!(sample.a, 7);

        let err = decode::<Sample>("no envelope", Stage::Judge).unwrap_err();
        assert!(matches!(err, DoorError::NoEnvelope { stage: Stage::Judge }));

        let err = decode::<Sample>("<JSON>{\"a\":</JSON>", Stage::Generator).unwrap_err();
        assert!(matches!(
            err,
            DoorError::Decode {
                stage: Stage::Generator,
                ..
            }
        ));
    }
}
