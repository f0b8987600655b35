//! Telegram bot: turns incoming updates into replies.
//!
//! Updates arrive either through `POST /telegram/webhook` or through the
//! long-poll loop in [`poller`]; both hand them to [`BotService::handle_update`].

use crate::connectors::{CompletionConnector, ConnectorError, PageFetcher, TelegramConnector};
use crate::connectors::browser::{page_prompt, PAGE_MAX_TOKENS};
use crate::connectors::telegram::{IncomingMessage, Update};
use crate::models::ChatMessage;
use std::sync::Arc;

pub mod poller;
pub mod split;

pub use split::{split_message, MAX_MESSAGE_LEN};

pub const UNAUTHORIZED_REPLY: &str = "⛔ Unauthorized.";
pub const GREETING: &str =
    "🤖 *Nexus AI Agent* is online\\.\n\nSend me any message and I'll respond using AI\\.";
pub const STATUS_REPLY: &str = "✅ Nexus is running and ready.";
pub const NOT_CONFIGURED_REPLY: &str = "❌ AI not configured on server.";
pub const EMPTY_REPLY: &str = "No response generated.";
pub const MISSING_URL_REPLY: &str = "Please provide a URL.";
pub const SEARCH_FAILED_REPLY: &str = "Sorry, I encountered an error.";

pub const SYSTEM_PROMPT: &str = "You are Nexus, a powerful AI assistant responding via Telegram. \
You have browser capabilities to search and read web pages when needed. \
Keep responses concise but helpful. \
Use markdown formatting sparingly (Telegram supports *bold*, _italic_, `code`). \
When you don't know something, say so honestly. \
If asked to browse or search, confirm you can do so.";

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Start,
    Status,
    Search { url: Option<&'a str>, query: String },
    Chat(&'a str),
}

impl<'a> Command<'a> {
    fn parse(text: &'a str) -> Self {
        let mut words = text.split_whitespace();
        // "/search@NexusBot" addresses the same command in group chats
        let name = words
            .next()
            .map(|word| word.split('@').next().unwrap_or(word));

        match name {
            Some("/start") if words.clone().next().is_none() => Self::Start,
            Some("/status") if words.clone().next().is_none() => Self::Status,
            Some("/search") => Self::Search {
                url: words.next(),
                query: words.collect::<Vec<_>>().join(" "),
            },
            _ => Self::Chat(text),
        }
    }
}

pub struct BotService {
    telegram: Arc<dyn TelegramConnector>,
    llm: Arc<dyn CompletionConnector>,
    pages: Arc<dyn PageFetcher>,
    allowed_user_id: Option<i64>,
}

impl BotService {
    pub fn new(
        telegram: Arc<dyn TelegramConnector>,
        llm: Arc<dyn CompletionConnector>,
        pages: Arc<dyn PageFetcher>,
        allowed_user_id: Option<i64>,
    ) -> Self {
        Self {
            telegram,
            llm,
            pages,
            allowed_user_id,
        }
    }

    pub fn telegram(&self) -> &Arc<dyn TelegramConnector> {
        &self.telegram
    }

    /// Non-text updates are ignored. Errors are Telegram send failures.
    #[tracing::instrument(name = "Handle Telegram update.", skip_all, fields(update_id = update.update_id))]
    pub async fn handle_update(&self, update: &Update) -> Result<(), ConnectorError> {
        let Some(message) = update.message.as_ref() else {
            return Ok(());
        };
        let Some(text) = message.text.as_deref() else {
            return Ok(());
        };
        let chat_id = message.chat.id;

        if !self.is_authorized(message) {
            tracing::warn!(
                chat_id,
                sender = ?message.from.as_ref().map(|sender| sender.id),
                "Rejected message from unauthorized user"
            );
            return self.send(chat_id, UNAUTHORIZED_REPLY, None).await;
        }

        match Command::parse(text) {
            Command::Start => {
                self.send(chat_id, GREETING, Some("MarkdownV2")).await
            }
            Command::Status => self.send(chat_id, STATUS_REPLY, None).await,
            Command::Search { url, query } => self.search(chat_id, url, &query).await,
            Command::Chat(text) => self.chat(chat_id, text).await,
        }
    }

    fn is_authorized(&self, message: &IncomingMessage) -> bool {
        match self.allowed_user_id {
            None => true,
            Some(allowed) => message.from.as_ref().map(|sender| sender.id) == Some(allowed),
        }
    }

    async fn chat(&self, chat_id: i64, text: &str) -> Result<(), ConnectorError> {
        self.typing(chat_id).await;

        let messages = [ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(text)];
        let reply = match self.llm.complete(&messages, self.llm.default_max_tokens()).await {
            Ok(reply) if reply.trim().is_empty() => EMPTY_REPLY.to_string(),
            Ok(reply) => reply,
            Err(ConnectorError::NotConfigured(what)) => {
                tracing::error!("{} is not configured", what);
                NOT_CONFIGURED_REPLY.to_string()
            }
            Err(err) => {
                tracing::error!(error = %err, "Completion request failed");
                format!("❌ AI error ({}). Try again.", err.upstream_status().unwrap_or(502))
            }
        };

        self.send_long(chat_id, &reply).await
    }

    async fn search(&self, chat_id: i64, url: Option<&str>, query: &str) -> Result<(), ConnectorError> {
        let Some(url) = url else {
            return self.send(chat_id, MISSING_URL_REPLY, None).await;
        };

        self.typing(chat_id).await;

        match self.answer_from_page(url, query).await {
            Ok(reply) => self.send_long(chat_id, &reply).await,
            Err(err) => {
                tracing::error!(url, error = %err, "Search command failed");
                self.send(chat_id, SEARCH_FAILED_REPLY, None).await
            }
        }
    }

    async fn answer_from_page(&self, url: &str, query: &str) -> Result<String, ConnectorError> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConnectorError::InvalidResponse(format!("unsupported URL: {}", url)));
        }

        let text = self.pages.fetch_text(url).await?;
        let query = if query.trim().is_empty() { "summarize it" } else { query };
        let prompt = page_prompt(url, query, &text);

        let reply = self
            .llm
            .complete(&[ChatMessage::user(prompt)], PAGE_MAX_TOKENS)
            .await?;
        Ok(if reply.trim().is_empty() {
            EMPTY_REPLY.to_string()
        } else {
            reply
        })
    }

    async fn typing(&self, chat_id: i64) {
        if let Err(err) = self.telegram.send_chat_action(chat_id, "typing").await {
            tracing::warn!(chat_id, error = %err, "Failed to send typing indicator");
        }
    }

    async fn send_long(&self, chat_id: i64, text: &str) -> Result<(), ConnectorError> {
        for chunk in split_message(text, MAX_MESSAGE_LEN) {
            self.send(chat_id, &chunk, None).await?;
        }
        Ok(())
    }

    /// A message Telegram refuses is logged and dropped; only transport
    /// failures reach the caller.
    async fn send(&self, chat_id: i64, text: &str, parse_mode: Option<&str>) -> Result<(), ConnectorError> {
        match self.telegram.send_message(chat_id, text, parse_mode).await {
            Err(err) if err.is_rejection() => {
                tracing::error!(chat_id, error = %err, "Telegram rejected sendMessage");
                Ok(())
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectors::browser::MockPageFetcher;
    use crate::connectors::llm::MockCompletionConnector;
    use crate::connectors::telegram::{Chat, MockTelegramConnector, Sender};

    fn update(from: i64, text: Option<&str>) -> Update {
        Update {
            update_id: 1,
            message: Some(IncomingMessage {
                message_id: 10,
                chat: Chat { id: 99 },
                from: Some(Sender {
                    id: from,
                    username: None,
                }),
                text: text.map(|t| t.to_string()),
            }),
        }
    }

    fn bot(
        llm: MockCompletionConnector,
        pages: MockPageFetcher,
        allowed: Option<i64>,
    ) -> (BotService, Arc<MockTelegramConnector>, Arc<MockCompletionConnector>) {
        let telegram = Arc::new(MockTelegramConnector::default());
        let llm = Arc::new(llm);
        let service = BotService::new(telegram.clone(), llm.clone(), Arc::new(pages), allowed);
        (service, telegram, llm)
    }

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse("/start"), Command::Start);
        assert_eq!(Command::parse("/status@NexusBot"), Command::Status);
        assert_eq!(
            Command::parse("/search https://a.b what is it"),
            Command::Search {
                url: Some("https://a.b"),
                query: "what is it".to_string()
            }
        );
        assert_eq!(Command::parse("/start now"), Command::Chat("/start now"));
        assert_eq!(Command::parse("hello"), Command::Chat("hello"));
    }

    #[tokio::test]
    async fn other_users_are_rejected() {
        let (service, telegram, llm) = bot(
            MockCompletionConnector::with_reply("hi"),
            MockPageFetcher::default(),
            Some(1),
        );

        service.handle_update(&update(2, Some("hello"))).await.unwrap();

        assert_eq!(telegram.texts(), vec![UNAUTHORIZED_REPLY]);
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn start_uses_markdown() {
        let (service, telegram, _) = bot(
            MockCompletionConnector::with_reply("hi"),
            MockPageFetcher::default(),
            Some(1),
        );

        service.handle_update(&update(1, Some("/start"))).await.unwrap();

        let sent = telegram.sent.lock().unwrap();
        assert_eq!(sent[0].text, GREETING);
        assert_eq!(sent[0].parse_mode.as_deref(), Some("MarkdownV2"));
    }

    #[tokio::test]
    async fn chat_replies_after_typing() {
        let (service, telegram, llm) = bot(
            MockCompletionConnector::with_reply("Paris."),
            MockPageFetcher::default(),
            None,
        );

        service
            .handle_update(&update(5, Some("Capital of France?")))
            .await
            .unwrap();

        assert_eq!(telegram.actions.lock().unwrap()[0], (99, "typing".to_string()));
        assert_eq!(telegram.texts(), vec!["Paris."]);
        let calls = llm.calls.lock().unwrap();
        assert_eq!(calls[0].0[0], ChatMessage::system(SYSTEM_PROMPT));
        assert_eq!(calls[0].0[1], ChatMessage::user("Capital of France?"));
        assert_eq!(calls[0].1, 1024);
    }

    #[tokio::test]
    async fn chat_failures_have_fixed_replies() {
        let (service, telegram, _) = bot(
            MockCompletionConnector::not_configured(),
            MockPageFetcher::default(),
            None,
        );
        service.handle_update(&update(5, Some("hi"))).await.unwrap();
        assert_eq!(telegram.texts(), vec![NOT_CONFIGURED_REPLY]);

        let (service, telegram, _) = bot(
            MockCompletionConnector::failing(429),
            MockPageFetcher::default(),
            None,
        );
        service.handle_update(&update(5, Some("hi"))).await.unwrap();
        assert_eq!(telegram.texts(), vec!["❌ AI error (429). Try again."]);

        let (service, telegram, _) = bot(
            MockCompletionConnector::with_reply(""),
            MockPageFetcher::default(),
            None,
        );
        service.handle_update(&update(5, Some("hi"))).await.unwrap();
        assert_eq!(telegram.texts(), vec![EMPTY_REPLY]);
    }

    #[tokio::test]
    async fn long_replies_are_split() {
        let (service, telegram, _) = bot(
            MockCompletionConnector::with_reply(&"z".repeat(MAX_MESSAGE_LEN + 10)),
            MockPageFetcher::default(),
            None,
        );
        service.handle_update(&update(5, Some("essay"))).await.unwrap();
        let texts = telegram.texts();
        assert_eq!(texts.len(), 2);
        assert_eq!(texts[1], "z".repeat(10));
    }

    #[tokio::test]
    async fn search_prompts_with_page_text() {
        let (service, telegram, llm) = bot(
            MockCompletionConnector::with_reply("It is about Rust."),
            MockPageFetcher::with_text("Rust is a language."),
            None,
        );

        service
            .handle_update(&update(5, Some("/search https://example.com what is it about")))
            .await
            .unwrap();

        assert_eq!(telegram.texts(), vec!["It is about Rust."]);
        let calls = llm.calls.lock().unwrap();
        assert_eq!(calls[0].1, PAGE_MAX_TOKENS);
        assert_eq!(
            calls[0].0[0].content,
            "Based on the following text from https://example.com, what is it about:\n\nRust is a language."
        );
    }

    #[tokio::test]
    async fn search_errors_are_reported() {
        let (service, telegram, _) = bot(
            MockCompletionConnector::with_reply("unused"),
            MockPageFetcher::default(),
            None,
        );
        service.handle_update(&update(5, Some("/search"))).await.unwrap();
        service
            .handle_update(&update(5, Some("/search https://down.example")))
            .await
            .unwrap();

        assert_eq!(telegram.texts(), vec![MISSING_URL_REPLY, SEARCH_FAILED_REPLY]);
    }

    #[tokio::test]
    async fn rejected_sends_do_not_fail_the_update() {
        let telegram = Arc::new(MockTelegramConnector::rejecting(400));
        let service = BotService::new(
            telegram.clone(),
            Arc::new(MockCompletionConnector::with_reply("hi")),
            Arc::new(MockPageFetcher::default()),
            None,
        );

        service.handle_update(&update(5, Some("hello"))).await.unwrap();
        assert_eq!(telegram.texts(), vec!["hi"]);
    }

    #[tokio::test]
    async fn unreachable_telegram_fails_the_update() {
        let service = BotService::new(
            Arc::new(MockTelegramConnector::unreachable()),
            Arc::new(MockCompletionConnector::with_reply("hi")),
            Arc::new(MockPageFetcher::default()),
            None,
        );

        let err = service.handle_update(&update(5, Some("hello"))).await.unwrap_err();
        assert!(matches!(err, ConnectorError::ServiceUnavailable(_)));
    }

    #[tokio::test]
    async fn non_text_updates_are_ignored() {
        let (service, telegram, _) = bot(
            MockCompletionConnector::with_reply("hi"),
            MockPageFetcher::default(),
            None,
        );
        service.handle_update(&update(5, None)).await.unwrap();
        service
            .handle_update(&Update {
                update_id: 2,
                message: None,
            })
            .await
            .unwrap();
        assert!(telegram.texts().is_empty());
    }
}
