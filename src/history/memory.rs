use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::history::ConversationStore;
use crate::models::chat::Conversation;

/// Process-local store; conversations live until restart.
#[derive(Default)]
pub struct InMemoryConversationStore {
    conversations: RwLock<HashMap<String, Conversation>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn get(&self, conversation_id: &str) -> Option<Conversation> {
        self.conversations.read().await.get(conversation_id).cloned()
    }

    async fn put(&self, conversation: Conversation) {
        self.conversations.write().await.insert(conversation.id.clone(), conversation);
    }
}
