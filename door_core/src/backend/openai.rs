use async_trait::async_trait;
use riddle_rules::ChatMessage;

use super::{ChatBackend, HttpChatClient};
use crate::config::AiBackendConfig;
use crate::error::Result;

const PROVIDER: &str = "OpenAI";

/// Hosted OpenAI chat completions.
#[derive(Debug, Clone)]
pub struct OpenAiBackend {
    http: HttpChatClient,
}

impl OpenAiBackend {
    pub fn new(config: &AiBackendConfig) -> Result<Self> {
        let settings = &config.open_ai;
        let http = HttpChatClient::new(
            PROVIDER,
            settings.url.clone(),
            &settings.api_key,
            settings.model.clone(),
            config.temperature,
            config.timeout_secs,
        )?;
        Ok(Self { http })
    }

    pub fn endpoint(&self) -> &str {
        self.http.endpoint()
    }
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    async fn chat_once(&self, messages: &[ChatMessage]) -> Result<String> {
        self.http.chat_once(messages).await
    }
}
