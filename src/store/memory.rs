use super::{ConversationStore, StoreError};
use crate::models::{Conversation, Message, MessageStatus, NewMessage};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    conversations: HashMap<Uuid, Conversation>,
    messages: HashMap<Uuid, Vec<Message>>,
}

/// Process-local store; everything is lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn list_conversations(&self) -> Result<Vec<Conversation>, StoreError> {
        let inner = self.inner.read().await;
        let mut list: Vec<Conversation> = inner.conversations.values().cloned().collect();
        list.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(list)
    }

    async fn get_conversation(&self, id: Uuid) -> Result<Conversation, StoreError> {
        self.inner
            .read()
            .await
            .conversations
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::conversation(id))
    }

    async fn create_conversation(&self, title: &str) -> Result<Conversation, StoreError> {
        let now = Utc::now();
        let conversation = Conversation {
            id: Uuid::new_v4(),
            title: title.to_string(),
            created_at: now,
            updated_at: now,
        };

        let mut inner = self.inner.write().await;
        inner
            .conversations
            .insert(conversation.id, conversation.clone());
        inner.messages.insert(conversation.id, Vec::new());
        Ok(conversation)
    }

    async fn rename_conversation(&self, id: Uuid, title: &str) -> Result<Conversation, StoreError> {
        let mut inner = self.inner.write().await;
        let conversation = inner
            .conversations
            .get_mut(&id)
            .ok_or_else(|| StoreError::conversation(id))?;
        conversation.title = title.to_string();
        conversation.updated_at = Utc::now();
        Ok(conversation.clone())
    }

    async fn delete_conversation(&self, id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner
            .conversations
            .remove(&id)
            .ok_or_else(|| StoreError::conversation(id))?;
        inner.messages.remove(&id);
        Ok(())
    }

    async fn list_messages(&self, conversation_id: Uuid) -> Result<Vec<Message>, StoreError> {
        let inner = self.inner.read().await;
        if !inner.conversations.contains_key(&conversation_id) {
            return Err(StoreError::conversation(conversation_id));
        }
        Ok(inner
            .messages
            .get(&conversation_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn append_message(&self, message: NewMessage) -> Result<Message, StoreError> {
        let now = Utc::now();
        let mut inner = self.inner.write().await;
        let conversation = inner
            .conversations
            .get_mut(&message.conversation_id)
            .ok_or_else(|| StoreError::conversation(message.conversation_id))?;
        conversation.updated_at = now;

        let message = Message {
            id: Uuid::new_v4(),
            conversation_id: message.conversation_id,
            role: message.role,
            content: message.content,
            status: message.status,
            created_at: now,
        };
        inner
            .messages
            .entry(message.conversation_id)
            .or_default()
            .push(message.clone());
        Ok(message)
    }

    async fn update_message(
        &self,
        id: Uuid,
        content: &str,
        status: MessageStatus,
    ) -> Result<Message, StoreError> {
        let mut inner = self.inner.write().await;
        let message = inner
            .messages
            .values_mut()
            .flat_map(|messages| messages.iter_mut())
            .find(|message| message.id == id)
            .ok_or_else(|| StoreError::message(id))?;
        message.content = content.to_string();
        message.status = status;
        Ok(message.clone())
    }
}
