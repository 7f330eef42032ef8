use async_trait::async_trait;
use riddle_rules::ChatMessage;

use super::{ChatBackend, HttpChatClient};
use crate::config::AiBackendConfig;
use crate::error::Result;

const PROVIDER: &str = "vLLM";

/// A self-hosted vLLM server speaking the OpenAI-compatible chat route.
#[derive(Debug, Clone)]
pub struct VllmBackend {
    http: HttpChatClient,
}

impl VllmBackend {
    pub fn new(config: &AiBackendConfig) -> Result<Self> {
        let settings = &config.vllm;
        let http = HttpChatClient::new(
            PROVIDER,
            settings.endpoint(),
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
impl ChatBackend for VllmBackend {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    async fn chat_once(&self, messages: &[ChatMessage]) -> Result<String> {
        self.http.chat_once(messages).await
    }
}
