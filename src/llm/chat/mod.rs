pub mod gemini;

use async_trait::async_trait;
use std::sync::Arc;

use super::LlmConfig;
use self::gemini::GeminiChatClient;
use crate::config::persona::GenerationConfig;
use crate::error::RelayResult;
use crate::models::chat::ConversationTurn;

#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub response: String,
}

/// Everything the model sees for one exchange.
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    pub system: &'a str,
    pub history: &'a [ConversationTurn],
    pub message: &'a str,
    pub generation: GenerationConfig,
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, request: ChatRequest<'_>) -> RelayResult<CompletionResponse>;

    fn get_model(&self) -> String;
}

pub fn new_client(config: &LlmConfig) -> RelayResult<Arc<dyn ChatClient>> {
    let client = GeminiChatClient::from_config(config)?;
    Ok(Arc::new(client))
}
