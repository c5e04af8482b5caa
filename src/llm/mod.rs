pub mod chat;

use crate::config::RelayConfig;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub completion_model: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            completion_model: None,
            base_url: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl LlmConfig {
    pub fn from_relay_config(config: &RelayConfig) -> Self {
        Self {
            api_key: config.gemini_api_key.clone(),
            completion_model: Some(config.chat_model.clone()),
            base_url: Some(config.gemini_base_url.clone()),
            timeout: config.provider_timeout,
        }
    }
}
