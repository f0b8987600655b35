//! External service connectors
//!
//! Every outbound integration (the completion provider, the Telegram Bot API,
//! plain web pages) sits behind a trait so routes and services only see
//! `Arc<dyn Trait>` and tests can swap in the mocks.
//!
//! ```ignore
//! pub async fn handler(
//!     llm: web::Data<Arc<dyn CompletionConnector>>,
//! ) -> Result<impl Responder, ChatError> {
//!     let reply = llm.complete(&messages, llm.default_max_tokens()).await?;
//! }
//! ```

pub mod browser;
pub mod errors;
pub mod llm;
pub mod telegram;

pub use browser::{HttpPageFetcher, PageFetcher};
pub use errors::ConnectorError;
pub use llm::{ByteStream, CompletionConnector, LlmClient};
pub use telegram::{TelegramClient, TelegramConnector};

pub use llm::init as init_llm;
pub use telegram::init as init_telegram;
