mod memory;

use async_trait::async_trait;
use chrono::Local;
use log::{ debug, info };
use serde_json::{ Map, Value as JsonValue };
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::config::prompt::PromptConfig;
use crate::models::chat::{ ChatMessage, Conversation, ConversationState, Role };

pub use memory::InMemoryConversationStore;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConversationError {
    #[error("Conversation {0} not found")]
    NotFound(String),
}

#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn get(&self, conversation_id: &str) -> Option<Conversation>;

    async fn put(&self, conversation: Conversation);
}

/// Conversation history, state and context on top of a `ConversationStore`.
///
/// Reads against an unknown id return empty or default values; writes fail
/// with `ConversationError::NotFound`.
#[derive(Clone)]
pub struct ConversationManager {
    store: Arc<dyn ConversationStore>,
    prompts: Arc<PromptConfig>,
}

impl ConversationManager {
    pub fn new(store: Arc<dyn ConversationStore>, prompts: Arc<PromptConfig>) -> Self {
        Self { store, prompts }
    }

    pub async fn create_conversation(&self) -> String {
        let id = Uuid::new_v4().to_string();
        self.store.put(Conversation::new(id.clone())).await;
        info!("Created conversation {}", id);
        id
    }

    pub async fn exists(&self, conversation_id: &str) -> bool {
        self.store.get(conversation_id).await.is_some()
    }

    async fn modify<F>(&self, conversation_id: &str, f: F) -> Result<(), ConversationError>
        where F: FnOnce(&mut Conversation) + Send
    {
        let mut conversation = self.store
            .get(conversation_id).await
            .ok_or_else(|| ConversationError::NotFound(conversation_id.to_string()))?;
        f(&mut conversation);
        self.store.put(conversation).await;
        Ok(())
    }

    pub async fn add_message(
        &self,
        conversation_id: &str,
        role: Role,
        content: &str
    ) -> Result<(), ConversationError> {
        debug!("[{}] {} message ({} chars)", conversation_id, role.as_str(), content.len());
        self.modify(conversation_id, |c| {
            c.messages.push(ChatMessage { role, content: content.to_string() });
        }).await
    }

    pub async fn get_messages(&self, conversation_id: &str) -> Vec<ChatMessage> {
        self.store
            .get(conversation_id).await
            .map(|c| c.messages)
            .unwrap_or_default()
    }

    pub async fn get_state(&self, conversation_id: &str) -> ConversationState {
        self.store
            .get(conversation_id).await
            .map(|c| c.state)
            .unwrap_or_default()
    }

    pub async fn set_state(
        &self,
        conversation_id: &str,
        state: ConversationState
    ) -> Result<(), ConversationError> {
        info!("[{}] state -> {}", conversation_id, state);
        self.modify(conversation_id, |c| {
            c.state = state;
        }).await
    }

    pub async fn update_context(
        &self,
        conversation_id: &str,
        key: &str,
        value: JsonValue
    ) -> Result<(), ConversationError> {
        self.modify(conversation_id, |c| {
            c.context.insert(key.to_string(), value);
        }).await
    }

    pub async fn get_context(&self, conversation_id: &str, key: &str) -> Option<JsonValue> {
        self.store
            .get(conversation_id).await
            .and_then(|c| c.context.get(key).cloned())
    }

    pub async fn get_full_context(&self, conversation_id: &str) -> Option<Map<String, JsonValue>> {
        self.store.get(conversation_id).await.map(|c| c.context)
    }

    /// Fixed preamble, the current local date and time, and a trailer chosen
    /// by the conversation's state.
    pub async fn get_system_prompt(&self, conversation_id: &str) -> String {
        let state = self.get_state(conversation_id).await;
        let provider_name = self
            .get_context(conversation_id, "provider_name").await
            .and_then(|v| v.as_str().map(str::to_string));
        let now = Local::now().naive_local();
        self.prompts.system_prompt(state, now, provider_name.as_deref())
    }
}
