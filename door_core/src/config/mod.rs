//! Configuration for the backend, the game rules and logging.
//!
//! Everything has a default, so an empty TOML document is a valid config.

use std::fs;
use std::path::Path;

use riddle_rules::{RiddleDefinition, DEFAULT_MAX_ATTEMPTS, DEFAULT_WIN_THRESHOLD};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorConfig {
    pub backend: AiBackendConfig,
    pub game: GameConfig,
    pub logging: LoggingConfig,
}

impl DoorConfig {
    /// Load and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: DoorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Fill empty API keys from `OPENAI_API_KEY` / `VLLM_API_KEY`.
    pub fn with_env_overrides(mut self) -> Self {
        self.backend.apply_env_keys(|name| std::env::var(name).ok());
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.backend.validate()?;
        self.game.validate()
    }
}

/// Which provider to talk to and how.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiBackendConfig {
    pub use_open_ai: bool,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub open_ai: OpenAiSettings,
    pub vllm: VllmSettings,
}

impl Default for AiBackendConfig {
    fn default() -> Self {
        Self {
            use_open_ai: false,
            temperature: 0.7,
            timeout_secs: 60,
            open_ai: OpenAiSettings::default(),
            vllm: VllmSettings::default(),
        }
    }
}

impl AiBackendConfig {
    /// Toggle exposed for menu wiring.
    pub fn set_use_open_ai(&mut self, enabled: bool) {
        self.use_open_ai = enabled;
    }

    fn apply_env_keys(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.open_ai.api_key.trim().is_empty() {
            if let Some(key) = lookup("OPENAI_API_KEY") {
                self.open_ai.api_key = key;
            }
        }
        if self.vllm.api_key.trim().is_empty() {
            if let Some(key) = lookup("VLLM_API_KEY") {
                self.vllm.api_key = key;
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(ConfigError::Invalid(
                "backend.temperature must be a non-negative number".to_string(),
            ));
        }
        if !self.use_open_ai && self.vllm.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "backend.vllm.base_url must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiSettings {
    pub api_key: String,
    pub model: String,
    pub url: String,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            url: "https://api.openai.com/v1/chat/completions".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VllmSettings {
    pub base_url: String,
    pub chat_path: String,
    pub api_key: String,
    pub model: String,
}

impl Default for VllmSettings {
    fn default() -> Self {
        Self {
            base_url: "https://apertus.mediadock.space".to_string(),
            chat_path: "/v1/chat/completions".to_string(),
            api_key: String::new(),
            model: "swiss-ai/Apertus-8B-Instruct-2509".to_string(),
        }
    }
}

impl VllmSettings {
    /// `{base_url}{chat_path}` with a single slash between them.
    pub fn endpoint(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if self.chat_path.is_empty() || self.chat_path.starts_with('/') {
            format!("{}{}", base, self.chat_path)
        } else {
            format!("{}/{}", base, self.chat_path)
        }
    }
}

/// What the player sees after each judgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JudgeDisplayMode {
    None,
    #[default]
    AccuracyOnly,
    AccuracyAndReason,
}

/// Round rules and pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub generate_riddle_on_start: bool,
    /// Free-text theme constraint handed to the generator.
    pub riddle_theme_extra: String,
    /// Used when `generate_riddle_on_start` is false.
    pub manual_riddle: Option<RiddleDefinition>,
    pub max_attempts: u32,
    /// Accuracy percentage needed to win.
    pub win_accuracy_threshold: u8,
    pub judge_display_mode: JudgeDisplayMode,
    /// How long the win/lose result stays up before the round resets.
    pub end_screen_seconds: f32,
    /// Pace of the simulated streaming.
    pub chars_per_second: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            generate_riddle_on_start: true,
            riddle_theme_extra: "Make it a classic but not too common. Keep it short."
                .to_string(),
            manual_riddle: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            win_accuracy_threshold: DEFAULT_WIN_THRESHOLD,
            judge_display_mode: JudgeDisplayMode::AccuracyOnly,
            end_screen_seconds: 3.0,
            chars_per_second: 80.0,
        }
    }
}

impl GameConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.win_accuracy_threshold > 100 {
            return Err(ConfigError::Invalid(
                "game.win_accuracy_threshold must be <= 100".to_string(),
            ));
        }
        if !self.generate_riddle_on_start && self.manual_riddle.is_none() {
            return Err(ConfigError::Invalid(
                "game.manual_riddle is required when generate_riddle_on_start is false"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// Log filter used when `RUST_LOG` is unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
