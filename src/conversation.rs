use crate::config::persona::{ GENERATION_CONFIG, SYSTEM_DIRECTIVE };
use crate::error::{ RelayError, RelayResult };
use crate::llm::chat::{ ChatClient, ChatRequest };
use crate::models::chat::ConversationTurn;

use log::{ error, info };
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayReply {
    pub reply_text: String,
    pub updated_history: Vec<ConversationTurn>,
}

/// Forwards one user message plus the caller's history to the language model. Nothing is stored
/// between calls; the caller round-trips the history.
#[derive(Clone)]
pub struct ConversationRelay {
    chat_client: Arc<dyn ChatClient>,
}

impl ConversationRelay {
    pub fn new(chat_client: Arc<dyn ChatClient>) -> Self {
        Self { chat_client }
    }

    pub async fn reply(
        &self,
        user_text: &str,
        history: Vec<ConversationTurn>
    ) -> RelayResult<RelayReply> {
        if user_text.trim().is_empty() {
            return Err(RelayError::invalid("No 'text' provided"));
        }

        info!(
            "Relaying message to {} ({} prior turns)",
            self.chat_client.get_model(),
            history.len()
        );

        let request = ChatRequest {
            system: SYSTEM_DIRECTIVE,
            history: &history,
            message: user_text,
            generation: GENERATION_CONFIG,
        };
        let completion = self.chat_client.complete(request).await.map_err(|e| {
            error!("Language model call failed: {}", e);
            match e {
                RelayError::Provider { .. } => e,
                other => RelayError::provider(other.to_string()),
            }
        })?;

        let mut updated_history = history;
        updated_history.push(ConversationTurn::user(user_text));
        updated_history.push(ConversationTurn::model(completion.response.clone()));

        Ok(RelayReply {
            reply_text: completion.response,
            updated_history,
        })
    }
}
