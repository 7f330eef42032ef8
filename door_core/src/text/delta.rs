//! Delta-buffer parsing for streamed chat completions.

use super::unescape;

const CONTENT_MARKER: &str = "\"content\":\"";

/// Splits a byte stream into lines.
///
/// Bytes are buffered until a `\n` arrives, so a multi-byte character split
/// across chunks is decoded whole.
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    pending: Vec<u8>,
}

impl SseLineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every line it completed, without the line
    /// terminator (`\n` or `\r\n`).
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.pending.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }

    /// Bytes received after the last complete line.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Pull the text delta out of one streamed line such as
/// `data: {"choices":[{"delta":{"content":"Hel"}}]}`.
pub fn extract_delta(line: &str) -> Option<String> {
    if line.trim().is_empty() {
        return None;
    }

    let start = line.find(CONTENT_MARKER)? + CONTENT_MARKER.len();
    let rest = &line[start..];

    let mut escaped = false;
    for (idx, c) in rest.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(unescape(&rest[..idx])),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_split_across_chunks() {
        let mut buffer = SseLineBuffer::new();
        assert!(buffer.push(b"data: one\r\nda").len() == 1);
        let lines = buffer.push(b"ta: two\n\n");
        assert_eq!(lines, vec!["data: two".to_string(), String::new()]);
        assert_eq!(buffer.pending_len(), 0);
    }

    #[test]
    fn test_multibyte_char_split_across_chunks() {
        let bytes = "é\n".as_bytes();
        let mut buffer = SseLineBuffer::new();
        assert!(buffer.push(&bytes[..1]).is_empty());
        assert_eq!(buffer.pending_len(), 1);
        assert_eq!(buffer.push(&bytes[1..]), vec!["é".to_string()]);
    }

    #[test]
    fn test_extract_delta() {
        let line = r#"data: {"choices":[{"delta":{"content":"Hel\"lo\n"}}]}"#;
        assert_eq!(extract_delta(line).as_deref(), Some("Hel\"lo\n"));
    }

    #[test]
    fn test_extract_delta_missing() {
        assert_eq!(extract_delta(""), None);
        assert_eq!(extract_delta("data: [DONE]"), None);
        assert_eq!(extract_delta(r#"{"content":"unterminated"#), None);
    }
}
