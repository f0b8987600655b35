use nexus::configuration::{get_configuration, Settings, TelegramMode};
use nexus::startup::Services;
use nexus::store::{ConversationStore, MemoryStore};
use std::net::TcpListener;
use std::sync::Arc;
use wiremock::MockServer;

pub const BOT_TOKEN: &str = "test-token";
pub const OWNER_ID: i64 = 42;

pub struct TestApp {
    pub address: String,
    pub store: Arc<MemoryStore>,
    /// Stands in for the OpenAI-compatible completion API.
    pub llm: MockServer,
    /// Stands in for api.telegram.org.
    pub telegram: MockServer,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

/// Start the server on a random port with mocked upstreams and an in-memory
/// store. `customize` runs last and may undo any of the defaults set here.
pub async fn spawn_app_with(customize: impl FnOnce(&mut Settings)) -> TestApp {
    let llm = MockServer::start().await;
    let telegram = MockServer::start().await;

    let mut settings = get_configuration().expect("Failed to get configuration");
    settings.static_dir = "tests/fixtures/dist".to_string();
    settings.llm.base_url = llm.uri();
    settings.llm.api_key = Some("test-key".to_string());
    settings.telegram.mode = TelegramMode::Webhook;
    settings.telegram.api_base_url = telegram.uri();
    settings.telegram.public_url = Some("https://nexus.test".to_string());
    settings.telegram.bot_token = Some(BOT_TOKEN.to_string());
    settings.telegram.allowed_user_id = Some(OWNER_ID);
    customize(&mut settings);

    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let store = Arc::new(MemoryStore::new());
    let shared: Arc<dyn ConversationStore> = store.clone();
    let services = Services::from_settings(&settings).expect("Failed to build services");

    let server = nexus::startup::run(listener, shared, services, settings)
        .await
        .expect("Failed to bind address.");
    let _ = tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        store,
        llm,
        telegram,
    }
}

/// A streamed upstream reply in OpenAI wire format, terminated by `[DONE]`.
pub fn sse_body(deltas: &[&str]) -> String {
    let mut body = String::new();
    for delta in deltas {
        body.push_str(&format!(
            "data: {}\n\n",
            serde_json::json!({"choices": [{"delta": {"content": delta}}]})
        ));
    }
    body.push_str("data: [DONE]\n\n");
    body
}
