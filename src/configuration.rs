use serde;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Settings {
    pub app_port: u16,
    pub app_host: String,
    /// Directory holding the built chat UI (`index.html` + assets).
    pub static_dir: String,
    pub llm: LlmSettings,
    pub telegram: TelegramSettings,
    pub browser: BrowserSettings,
    pub store: StoreSettings,
    pub database: DatabaseSettings,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct LlmSettings {
    /// OpenAI-compatible base URL, e.g. https://api.openai.com/v1
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    /// Bearer credential (from env: LLM_API_KEY)
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, serde::Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TelegramMode {
    Disabled,
    Webhook,
    Polling,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct TelegramSettings {
    pub mode: TelegramMode,
    pub api_base_url: String,
    /// Public URL of this server; the webhook is registered at `{public_url}/telegram/webhook`
    pub public_url: Option<String>,
    pub poll_timeout_secs: u64,
    /// From env: TELEGRAM_BOT_TOKEN
    #[serde(default)]
    pub bot_token: Option<String>,
    /// From env: TELEGRAM_USER_ID
    #[serde(default)]
    pub allowed_user_id: Option<i64>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct BrowserSettings {
    pub timeout_secs: u64,
    pub max_chars: usize,
    pub user_agent: String,
}

#[derive(Debug, Clone, serde::Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct StoreSettings {
    pub backend: StoreBackend,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database_name: String,
    pub max_connections: u32,
}

impl LlmSettings {
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl TelegramSettings {
    pub fn webhook_url(&self) -> Option<String> {
        self.public_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .map(|url| format!("{}/telegram/webhook", url.trim_end_matches('/')))
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let settings = config::Config::builder()
        .set_default("app_host", "127.0.0.1")?
        .set_default("app_port", 3000)?
        .set_default("static_dir", "dist")?
        .set_default("llm.base_url", "https://api.openai.com/v1")?
        .set_default("llm.model", "gpt-4o-mini")?
        .set_default("llm.max_tokens", 1024)?
        .set_default("llm.timeout_secs", 120)?
        .set_default("telegram.mode", "disabled")?
        .set_default("telegram.api_base_url", "https://api.telegram.org")?
        .set_default("telegram.poll_timeout_secs", 30)?
        .set_default("browser.timeout_secs", 20)?
        .set_default("browser.max_chars", 20_000)?
        .set_default("browser.user_agent", "Mozilla/5.0 (compatible; nexus-fetch)")?
        .set_default("store.backend", "memory")?
        .set_default("database.username", "postgres")?
        .set_default("database.password", "postgres")?
        .set_default("database.host", "127.0.0.1")?
        .set_default("database.port", 5432)?
        .set_default("database.database_name", "nexus")?
        .set_default("database.max_connections", 5)?
        // .json, .toml, .yaml, .yml
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(config::Environment::with_prefix("APP").separator("__"))
        .build()?;

    let mut config: Settings = settings.try_deserialize()?;

    // Secrets from the environment win over the configuration file
    config.llm.api_key = env_non_empty("LLM_API_KEY").or(config.llm.api_key);
    config.telegram.bot_token = env_non_empty("TELEGRAM_BOT_TOKEN").or(config.telegram.bot_token);
    if let Some(raw) = env_non_empty("TELEGRAM_USER_ID") {
        let id = raw.trim().parse::<i64>().map_err(|_| {
            config::ConfigError::Message(format!("TELEGRAM_USER_ID is not numeric: {}", raw))
        })?;
        config.telegram.allowed_user_id = Some(id);
    }

    Ok(config)
}
