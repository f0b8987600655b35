//! Conversation persistence.
//!
//! One `ConversationStore` capability with two adapters; `init` picks the
//! one named by `store.backend`.

use crate::configuration::{Settings, StoreBackend};
use crate::models::{Conversation, Message, MessageStatus, NewMessage};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn conversation(id: Uuid) -> Self {
        Self::NotFound(format!("Conversation {}", id))
    }

    pub fn message(id: Uuid) -> Self {
        Self::NotFound(format!("Message {}", id))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        Self::Database(err.to_string())
    }
}

#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Most recently updated first.
    async fn list_conversations(&self) -> Result<Vec<Conversation>, StoreError>;

    async fn get_conversation(&self, id: Uuid) -> Result<Conversation, StoreError>;

    async fn create_conversation(&self, title: &str) -> Result<Conversation, StoreError>;

    async fn rename_conversation(&self, id: Uuid, title: &str) -> Result<Conversation, StoreError>;

    /// Removes the conversation together with its messages.
    async fn delete_conversation(&self, id: Uuid) -> Result<(), StoreError>;

    /// Oldest first.
    async fn list_messages(&self, conversation_id: Uuid) -> Result<Vec<Message>, StoreError>;

    /// Stores the message and touches the owning conversation's `updated_at`.
    async fn append_message(&self, message: NewMessage) -> Result<Message, StoreError>;

    async fn update_message(
        &self,
        id: Uuid,
        content: &str,
        status: MessageStatus,
    ) -> Result<Message, StoreError>;
}

pub async fn init(settings: &Settings) -> Result<Arc<dyn ConversationStore>, StoreError> {
    match settings.store.backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory conversation store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Postgres => {
            tracing::info!(
                db_host = %settings.database.host,
                db_port = settings.database.port,
                db_name = %settings.database.database_name,
                "Connecting to PostgreSQL"
            );
            let store = PgStore::connect(&settings.database).await?;
            Ok(Arc::new(store))
        }
    }
}
