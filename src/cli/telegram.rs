use super::{runtime, CallableTrait, CliError};
use crate::configuration::get_configuration;
use crate::connectors::{init_telegram, TelegramConnector};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookCommandKind {
    /// Register `url`, or `{telegram.public_url}/telegram/webhook` when absent.
    Set { url: Option<String> },
    Delete,
    Info,
}

/// `nexus-cli telegram set-webhook|delete-webhook|info`
pub struct TelegramWebhookCommand {
    pub kind: WebhookCommandKind,
}

impl TelegramWebhookCommand {
    pub fn new(kind: WebhookCommandKind) -> Self {
        Self { kind }
    }

    async fn execute(&self, telegram: Arc<dyn TelegramConnector>, default_url: Option<String>) -> Result<Value, CliError> {
        let result = match &self.kind {
            WebhookCommandKind::Set { url } => {
                let url = url.clone().or(default_url).ok_or_else(|| {
                    CliError::Usage(
                        "No webhook URL: pass --url or set telegram.public_url".to_string(),
                    )
                })?;
                let result = telegram.set_webhook(&url).await?;
                let info = telegram.webhook_info().await?;
                serde_json::json!({ "action": "set", "webhook_url": url, "result": result, "info": info })
            }
            WebhookCommandKind::Delete => {
                let result = telegram.delete_webhook().await?;
                serde_json::json!({ "action": "delete", "result": result })
            }
            WebhookCommandKind::Info => telegram.webhook_info().await?,
        };
        Ok(result)
    }
}

impl CallableTrait for TelegramWebhookCommand {
    fn call(&self) -> Result<(), CliError> {
        let settings = get_configuration()?;

        runtime()?.block_on(async {
            let telegram = init_telegram(&settings.telegram)
                .ok_or_else(|| CliError::Usage("TELEGRAM_BOT_TOKEN is not set".to_string()))?;

            let output = self.execute(telegram, settings.telegram.webhook_url()).await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&output).map_err(|e| CliError::Usage(e.to_string()))?
            );
            Ok(())
        })
    }
}
