//! Text helpers for raw model output: JSON string unescaping and streamed
//! delta parsing.

mod delta;

pub use delta::*;

/// Decode backslash escapes in the contents of a JSON string literal.
///
/// Lenient by intent: unknown escapes yield the escaped character itself, a
/// `\u` not followed by four hex digits is kept verbatim, and a trailing lone
/// backslash is kept. UTF-16 surrogate pairs are combined; a lone surrogate
/// becomes U+FFFD.
pub fn unescape(input: &str) -> String {
    if !input.contains('\\') {
        return input.to_string();
    }

    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c != '\\' || i + 1 >= chars.len() {
            out.push(c);
            i += 1;
            continue;
        }

        let next = chars[i + 1];
        i += 2;
        match next {
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{0008}'),
            'f' => out.push('\u{000C}'),
            'u' => match hex4(&chars, i) {
                Some(unit) => {
                    i += 4;
                    out.push(decode_utf16_unit(unit, &chars, &mut i));
                }
                None => out.push_str("\\u"),
            },
            other => out.push(other),
        }
    }

    out
}

/// Parse four hex digits starting at `at`.
fn hex4(chars: &[char], at: usize) -> Option<u16> {
    let digits = chars.get(at..at + 4)?;
    digits.iter().try_fold(0u16, |acc, c| {
        c.to_digit(16).map(|d| (acc << 4) | d as u16)
    })
}

/// Turn one UTF-16 code unit into a char, consuming a following `\uXXXX` low
/// surrogate when `unit` is a high surrogate.
fn decode_utf16_unit(unit: u16, chars: &[char], i: &mut usize) -> char {
    match unit {
        0xD800..=0xDBFF => {
            let low = match (chars.get(*i), chars.get(*i + 1)) {
                (Some('\\'), Some('u')) => hex4(chars, *i + 2),
                _ => None,
            };
            match low {
                Some(low @ 0xDC00..=0xDFFF) => {
                    *i += 6;
                    char::decode_utf16([unit, low])
                        .next()
                        .and_then(|r| r.ok())
                        .unwrap_or(char::REPLACEMENT_CHARACTER)
                }
                _ => char::REPLACEMENT_CHARACTER,
            }
        }
        0xDC00..=0xDFFF => char::REPLACEMENT_CHARACTER,
        other => char::from_u32(other as u32).unwrap_or(char::REPLACEMENT_CHARACTER),
    }
}

/// Truncate to at most `max_chars` characters, appending "..." when cut.
pub fn truncate_chars(input: &str, max_chars: usize) -> String {
    match input.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &input[..byte_idx]),
        None => input.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newline_and_unicode() {
        assert_eq!(unescape("a\\nb\\u0041"), "a\nbA");
    }

    #[test]
    fn test_simple_escapes() {
        assert_eq!(unescape(r#"say \"hi\"\t\\ done\r"#), "say \"hi\"\t\\ done\r");
        assert_eq!(unescape("\\b\\f"), "\u{0008}\u{000C}");
    }

    #[test]
    fn test_unknown_escape_passes_through() {
        assert_eq!(unescape("a\\/b\\qc"), "a/bqc");
    }

    #[test]
    fn test_hex_case_insensitive() {
        assert_eq!(unescape("\\u00e9\\u00E9"), "éé");
    }

    #[test]
    fn test_malformed_unicode_kept() {
        assert_eq!(unescape("x\\u12"), "x\\u12");
        assert_eq!(unescape("x\\uZZZZ"), "x\\uZZZZ");
        assert_eq!(unescape("end\\"), "end\\");
    }

    #[test]
    fn test_surrogate_pairs() {
        assert_eq!(unescape("\\ud83d\\ude00"), "😀");
        assert_eq!(unescape("\\ud83dx"), "\u{FFFD}x");
        assert_eq!(unescape("\\ude00"), "\u{FFFD}");
    }

    #[test]
    fn test_no_escapes_is_identity() {
        assert_eq!(unescape(""), "");
        assert_eq!(unescape("plain text"), "plain text");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel...");
        assert_eq!(truncate_chars("ééé", 2), "éé...");
    }
}
