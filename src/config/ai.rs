//! Grading model configuration (OpenRouter)

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use super::error::ValidationError;

/// Configuration for the external writing evaluator.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// OpenRouter API key
    pub api_key: Secret<String>,

    /// Model identifier routed through OpenRouter
    #[serde(default = "default_model")]
    pub model: String,

    /// Chat-completions base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds. The webhook reply must go out even when
    /// the model stalls, so this bounds every evaluation call.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Referer header value sent to OpenRouter (app attribution)
    #[serde(default = "default_referer")]
    pub referer: String,
}

impl AiConfig {
    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_key.expose_secret().is_empty() {
            return Err(ValidationError::invalid("ai", "api_key is empty"));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::invalid("ai", "timeout_secs must be non-zero"));
        }
        Ok(())
    }
}

fn default_model() -> String {
    "anthropic/claude-sonnet-4".to_string()
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_timeout() -> u64 {
    25
}

fn default_referer() -> String {
    "https://proficienthai.app".to_string()
}
