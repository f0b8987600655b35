use super::{ConversationStore, StoreError};
use crate::configuration::DatabaseSettings;
use crate::models::{Conversation, Message, MessageStatus, NewMessage};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

pub struct PgStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    conversation_id: Uuid,
    role: String,
    content: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<MessageRow> for Message {
    type Error = StoreError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        Ok(Message {
            id: row.id,
            conversation_id: row.conversation_id,
            role: row.role.parse().map_err(StoreError::Corrupt)?,
            content: row.content,
            status: row.status.parse().map_err(StoreError::Corrupt)?,
            created_at: row.created_at,
        })
    }
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and apply pending migrations.
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, StoreError> {
        let connect_options = PgConnectOptions::new()
            .host(&settings.host)
            .port(settings.port)
            .username(&settings.username)
            .password(&settings.password)
            .database(&settings.database_name)
            .ssl_mode(PgSslMode::Prefer);

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(connect_options)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|err| StoreError::Database(format!("migration failed: {}", err)))?;

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl ConversationStore for PgStore {
    async fn list_conversations(&self) -> Result<Vec<Conversation>, StoreError> {
        let query_span = tracing::info_span!("Fetch conversations.");
        let list = sqlx::query_as::<_, Conversation>(
            r#"
            SELECT id, title, created_at, updated_at
            FROM conversation
            ORDER BY updated_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .instrument(query_span)
        .await?;
        Ok(list)
    }

    async fn get_conversation(&self, id: Uuid) -> Result<Conversation, StoreError> {
        let query_span = tracing::info_span!("Fetch conversation.", %id);
        sqlx::query_as::<_, Conversation>(
            r#"
            SELECT id, title, created_at, updated_at
            FROM conversation
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .instrument(query_span)
        .await?
        .ok_or_else(|| StoreError::conversation(id))
    }

    async fn create_conversation(&self, title: &str) -> Result<Conversation, StoreError> {
        let query_span = tracing::info_span!("Saving new conversation into the database");
        let now = Utc::now();
        let conversation = sqlx::query_as::<_, Conversation>(
            r#"
            INSERT INTO conversation (id, title, created_at, updated_at)
            VALUES ($1, $2, $3, $3)
            RETURNING id, title, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(now)
        .fetch_one(&self.pool)
        .instrument(query_span)
        .await?;
        Ok(conversation)
    }

    async fn rename_conversation(&self, id: Uuid, title: &str) -> Result<Conversation, StoreError> {
        let query_span = tracing::info_span!("Renaming conversation", %id);
        sqlx::query_as::<_, Conversation>(
            r#"
            UPDATE conversation
            SET title = $2, updated_at = NOW() at time zone 'utc'
            WHERE id = $1
            RETURNING id, title, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(title)
        .fetch_optional(&self.pool)
        .instrument(query_span)
        .await?
        .ok_or_else(|| StoreError::conversation(id))
    }

    async fn delete_conversation(&self, id: Uuid) -> Result<(), StoreError> {
        let query_span = tracing::info_span!("Deleting conversation", %id);
        // messages go with it via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM conversation WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .instrument(query_span)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::conversation(id));
        }
        Ok(())
    }

    async fn list_messages(&self, conversation_id: Uuid) -> Result<Vec<Message>, StoreError> {
        // distinguishes "unknown conversation" from "no messages yet"
        self.get_conversation(conversation_id).await?;

        let query_span = tracing::info_span!("Fetch messages.", %conversation_id);
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, conversation_id, role, content, status, created_at
            FROM message
            WHERE conversation_id = $1
            ORDER BY created_at ASC, seq ASC
            "#,
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .instrument(query_span)
        .await?;

        rows.into_iter().map(Message::try_from).collect()
    }

    async fn append_message(&self, message: NewMessage) -> Result<Message, StoreError> {
        let query_span = tracing::info_span!(
            "Saving new message into the database",
            conversation_id = %message.conversation_id,
            role = %message.role,
        );

        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let touched = sqlx::query("UPDATE conversation SET updated_at = $2 WHERE id = $1")
            .bind(message.conversation_id)
            .bind(now)
            .execute(&mut *tx)
            .instrument(query_span.clone())
            .await?;
        if touched.rows_affected() == 0 {
            return Err(StoreError::conversation(message.conversation_id));
        }

        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            INSERT INTO message (id, conversation_id, role, content, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, conversation_id, role, content, status, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(message.conversation_id)
        .bind(message.role.as_str())
        .bind(&message.content)
        .bind(message.status.as_str())
        .bind(now)
        .fetch_one(&mut *tx)
        .instrument(query_span)
        .await?;

        tx.commit().await?;
        Message::try_from(row)
    }

    async fn update_message(
        &self,
        id: Uuid,
        content: &str,
        status: MessageStatus,
    ) -> Result<Message, StoreError> {
        let query_span = tracing::info_span!("Updating message", %id, %status);
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            UPDATE message
            SET content = $2, status = $3
            WHERE id = $1
            RETURNING id, conversation_id, role, content, status, created_at
            "#,
        )
        .bind(id)
        .bind(content)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .instrument(query_span)
        .await?
        .ok_or_else(|| StoreError::message(id))?;

        Message::try_from(row)
    }
}
