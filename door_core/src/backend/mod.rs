//! Chat backends - one contract over heterogeneous chat-completion providers.
//!
//! Replies are mined from the raw response body with a pattern rather than
//! decoded against a schema: providers nest the `content` field at different
//! depths and some return several candidates, of which the last one counts.

mod mock;
mod openai;
mod vllm;

pub use mock::ScriptedBackend;
pub use openai::OpenAiBackend;
pub use vllm::VllmBackend;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use riddle_rules::ChatMessage;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::AiBackendConfig;
use crate::error::{DoorError, Result};
use crate::text::{truncate_chars, unescape};

/// Longest response-body snippet carried in a transport error.
pub const MAX_ERROR_BODY_CHARS: usize = 1200;

static CONTENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)"content"\s*:\s*"((?:\\.|[^"\\])*)""#).expect("invalid content regex")
});

/// A chat-completion provider.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Human-readable provider name used in errors and logs.
    fn provider(&self) -> &'static str;

    /// Send the conversation and return the reply text.
    async fn chat_once(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Incremental delivery. Optional; the default reports it unsupported.
    async fn chat_stream(
        &self,
        _messages: &[ChatMessage],
        _on_delta: &mut (dyn FnMut(&str) + Send),
    ) -> Result<()> {
        Err(DoorError::StreamingUnsupported {
            provider: self.provider(),
        })
    }
}

#[async_trait]
impl ChatBackend for Arc<dyn ChatBackend> {
    fn provider(&self) -> &'static str {
        (**self).provider()
    }

    async fn chat_once(&self, messages: &[ChatMessage]) -> Result<String> {
        (**self).chat_once(messages).await
    }

    async fn chat_stream(
        &self,
        messages: &[ChatMessage],
        on_delta: &mut (dyn FnMut(&str) + Send),
    ) -> Result<()> {
        (**self).chat_stream(messages, on_delta).await
    }
}

/// Construct the backend selected by the config.
pub fn build_backend(config: &AiBackendConfig) -> Result<Arc<dyn ChatBackend>> {
    if config.use_open_ai {
        info!(model = %config.open_ai.model, "backend: OpenAI");
        Ok(Arc::new(OpenAiBackend::new(config)?))
    } else {
        info!(
            model = %config.vllm.model,
            endpoint = %config.vllm.endpoint(),
            "backend: vLLM"
        );
        Ok(Arc::new(VllmBackend::new(config)?))
    }
}

/// Drop messages with blank content. Roles are already restricted to
/// system/user/assistant by [`riddle_rules::Role`].
pub fn sanitize_messages(messages: &[ChatMessage]) -> Vec<ChatMessage> {
    messages
        .iter()
        .filter(|message| !message.is_blank())
        .cloned()
        .collect()
}

/// Unescaped value of the last `"content":"..."` field in `body`.
///
/// An empty value counts as missing.
pub fn extract_last_content(body: &str) -> Option<String> {
    let raw = CONTENT_RE
        .captures_iter(body)
        .last()
        .and_then(|caps| caps.get(1))?;
    let content = unescape(raw.as_str());
    if content.is_empty() {
        None
    } else {
        Some(content)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    stream: bool,
}

/// Shared HTTP plumbing for the OpenAI-compatible wire format.
#[derive(Debug, Clone)]
pub(crate) struct HttpChatClient {
    provider: &'static str,
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
}

impl HttpChatClient {
    pub(crate) fn new(
        provider: &'static str,
        endpoint: String,
        api_key: &str,
        model: String,
        temperature: f32,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()
            .map_err(|e| DoorError::Transport {
                provider,
                status: None,
                detail: e.to_string(),
            })?;
        let api_key = Some(api_key.trim())
            .filter(|key| !key.is_empty())
            .map(str::to_string);
        Ok(Self {
            provider,
            client,
            endpoint,
            api_key,
            model,
            temperature,
        })
    }

    pub(crate) fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &self.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {}", key)).map_err(|e| {
                DoorError::Transport {
                    provider: self.provider,
                    status: None,
                    detail: format!("invalid api key header: {}", e),
                }
            })?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    pub(crate) async fn chat_once(&self, messages: &[ChatMessage]) -> Result<String> {
        let messages = sanitize_messages(messages);
        if messages.is_empty() {
            return Err(DoorError::NoMessages {
                provider: self.provider,
            });
        }

        let body = ChatRequest {
            model: &self.model,
            messages: &messages,
            temperature: self.temperature,
            stream: false,
        };
        debug!(
            provider = self.provider,
            model = %self.model,
            message_count = messages.len(),
            "chat request prepared"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(provider = self.provider, error = %e, "chat request failed");
                DoorError::Transport {
                    provider: self.provider,
                    status: e.status().map(|s| s.as_u16()),
                    detail: e.to_string(),
                }
            })?;

        let status = response.status();
        let text = response.text().await;

        if !status.is_success() {
            let body = text.unwrap_or_default();
            warn!(
                provider = self.provider,
                status = status.as_u16(),
                body_len = body.len(),
                "chat request returned error status"
            );
            return Err(DoorError::Transport {
                provider: self.provider,
                status: Some(status.as_u16()),
                detail: truncate_chars(&body, MAX_ERROR_BODY_CHARS),
            });
        }

        let text = text.map_err(|e| DoorError::Transport {
            provider: self.provider,
            status: Some(status.as_u16()),
            detail: e.to_string(),
        })?;

        let content = extract_last_content(&text).ok_or(DoorError::ResponseParse {
            provider: self.provider,
        })?;
        debug!(
            provider = self.provider,
            body_len = text.len(),
            reply_len = content.len(),
            "chat reply received"
        );
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use riddle_rules::Role;

    #[test]
    fn test_sanitize_drops_blank_messages() {
        let messages = vec![
            ChatMessage::system("rules"),
            ChatMessage::user("   "),
            ChatMessage::assistant(""),
            ChatMessage::user("is it an echo?"),
        ];
        let sanitized = sanitize_messages(&messages);
        assert_eq!(sanitized.len(), 2);
        assert_eq!(sanitized[0].role(), Role::System);
        assert_eq!(sanitized[1].content(), "is it an echo?");
    }

    #[test]
    fn test_extract_last_content_prefers_last() {
        let body = r#"{"choices":[
            {"message":{"role":"assistant","content":"first"}},
            {"message":{"role":"assistant","content":"second \"quoted\"\nline"}}
        ]}"#;
        assert_eq!(
            extract_last_content(body).as_deref(),
            Some("second \"quoted\"\nline")
        );
    }

    #[test]
    fn test_extract_tolerates_garbage_and_spacing() {
        let body = "garbage... \"content\" :  \"Hi \\u0041\" ...more garbage";
        assert_eq!(extract_last_content(body).as_deref(), Some("Hi A"));
    }

    #[test]
    fn test_extract_ignores_similar_keys() {
        let body = r#"{"reasoning_content":"thinking","content":"answer"}"#;
        assert_eq!(extract_last_content(body).as_deref(), Some("answer"));
        let body = r#"{"reasoning_content":"thinking"}"#;
        assert_eq!(extract_last_content(body), None);
    }

    #[test]
    fn test_extract_missing_or_empty() {
        assert_eq!(extract_last_content(""), None);
        assert_eq!(extract_last_content(r#"{"content":null}"#), None);
        assert_eq!(extract_last_content(r#"{"content":""}"#), None);
    }

    #[test]
    fn test_request_shape() {
        let messages = vec![ChatMessage::system("s"), ChatMessage::user("u")];
        let request = ChatRequest {
            model: "m",
            messages: &messages,
            temperature: 0.5,
            stream: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "m",
                "messages": [
                    {"role": "system", "content": "s"},
                    {"role": "user", "content": "u"}
                ],
                "temperature": 0.5,
                "stream": false
            })
        );
    }
}
