//! The send lifecycle of one chat: conversation bookkeeping around a
//! streamed reply.

use crate::forms::DEFAULT_TITLE;
use crate::models::{AgentStatus, ChatMessage, Message, MessageStatus, NewMessage, Role};
use crate::store::{ConversationStore, StoreError};
use crate::stream::{CancelToken, ChatStreamClient, DeltaSink, StreamError, StreamOutcome};
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

const NEW_CONVERSATION_TITLE_CHARS: usize = 50;
const FIRST_MESSAGE_TITLE_CHARS: usize = 60;
pub const CANCELLED_REPLY: &str = "Cancelled.";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Message is empty")]
    EmptyMessage,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Stream(#[from] StreamError),
}

pub struct ChatSession {
    store: Arc<dyn ConversationStore>,
    client: ChatStreamClient,
    active: Option<Uuid>,
    status: watch::Sender<AgentStatus>,
}

impl ChatSession {
    pub fn new(store: Arc<dyn ConversationStore>, client: ChatStreamClient) -> Self {
        let (status, _) = watch::channel(AgentStatus::Idle);
        Self {
            store,
            client,
            active: None,
            status,
        }
    }

    pub fn active_conversation(&self) -> Option<Uuid> {
        self.active
    }

    /// Switch to an existing conversation, or to none so the next send starts a new one.
    pub fn select(&mut self, conversation_id: Option<Uuid>) {
        self.active = conversation_id;
    }

    pub fn status(&self) -> AgentStatus {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<AgentStatus> {
        self.status.subscribe()
    }

    /// Store `text` as a user message and stream the assistant's reply into
    /// the store, forwarding each delta to `on_delta` as it arrives.
    ///
    /// Returns the finalized assistant message. A cancelled send is not an
    /// error: whatever arrived is kept, or `Cancelled.` when nothing did.
    #[tracing::instrument(name = "Chat session send.", skip_all, fields(conversation = ?self.active))]
    pub async fn send<F>(
        &mut self,
        text: &str,
        cancel: &CancelToken,
        on_delta: F,
    ) -> Result<Message, SessionError>
    where
        F: FnMut(&str),
    {
        if text.trim().is_empty() {
            return Err(SessionError::EmptyMessage);
        }

        let conversation_id = match self.active {
            Some(id) => id,
            None => {
                let title = title_from(text, NEW_CONVERSATION_TITLE_CHARS);
                let conversation = self.store.create_conversation(&title).await?;
                tracing::info!(conversation = %conversation.id, "Started new conversation");
                self.active = Some(conversation.id);
                conversation.id
            }
        };

        let prior = self.store.list_messages(conversation_id).await?;

        self.store
            .append_message(NewMessage {
                conversation_id,
                role: Role::User,
                content: text.to_string(),
                status: MessageStatus::Complete,
            })
            .await?;

        if prior.is_empty() {
            let title = title_from(text, FIRST_MESSAGE_TITLE_CHARS);
            if let Err(err) = self.store.rename_conversation(conversation_id, &title).await {
                tracing::warn!(error = %err, "Failed to update conversation title");
            }
        }

        let _idle = StatusGuard(&self.status);
        self.status.send_replace(AgentStatus::Thinking);

        let history: Vec<ChatMessage> = prior
            .iter()
            .filter(|message| message.status != MessageStatus::Error)
            .map(ChatMessage::from)
            .chain(std::iter::once(ChatMessage::user(text)))
            .collect();

        self.status.send_replace(AgentStatus::Streaming);
        let placeholder = self
            .store
            .append_message(NewMessage {
                conversation_id,
                role: Role::Assistant,
                content: String::new(),
                status: MessageStatus::Streaming,
            })
            .await?;

        let mut sink = Accumulator {
            content: String::new(),
            on_delta,
        };
        let result = self.client.stream_chat(&history, &mut sink, cancel).await;
        let content = sink.content;

        match result {
            Ok(summary) => {
                let content = if summary.outcome == StreamOutcome::Cancelled && content.is_empty() {
                    CANCELLED_REPLY.to_string()
                } else {
                    content
                };
                tracing::info!(outcome = ?summary.outcome, deltas = summary.deltas, "Assistant reply finished");
                let message = self
                    .store
                    .update_message(placeholder.id, &content, MessageStatus::Complete)
                    .await?;
                Ok(message)
            }
            Err(err) => {
                tracing::error!(error = %err, "Assistant reply failed");
                let content = if content.is_empty() {
                    err.to_string()
                } else {
                    content
                };
                self.store
                    .update_message(placeholder.id, &content, MessageStatus::Error)
                    .await?;
                Err(err.into())
            }
        }
    }

    /// Start the next send in a fresh conversation titled `New Chat`.
    pub async fn new_conversation(&mut self) -> Result<Uuid, SessionError> {
        let conversation = self.store.create_conversation(DEFAULT_TITLE).await?;
        self.active = Some(conversation.id);
        Ok(conversation.id)
    }
}

struct Accumulator<F> {
    content: String,
    on_delta: F,
}

impl<F: FnMut(&str)> DeltaSink for Accumulator<F> {
    fn on_delta(&mut self, delta: &str) {
        self.content.push_str(delta);
        (self.on_delta)(delta);
    }

    fn on_done(&mut self) {}
}

struct StatusGuard<'a>(&'a watch::Sender<AgentStatus>);

impl Drop for StatusGuard<'_> {
    fn drop(&mut self) {
        self.0.send_replace(AgentStatus::Idle);
    }
}

fn title_from(text: &str, max_chars: usize) -> String {
    text.trim().chars().take(max_chars).collect()
}
