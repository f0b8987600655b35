use super::error_response;
use crate::configuration::{Settings, TelegramMode};
use crate::connectors::telegram::Update;
use crate::telegram::BotService;
use actix_web::{post, web, HttpResponse};
use serde_json::Value;
use std::sync::Arc;

/// Intake for Bot API webhook deliveries. With `telegram.mode = disabled`
/// deliveries are acknowledged without being processed.
#[tracing::instrument(name = "Telegram webhook.", skip_all)]
#[post("/webhook")]
pub async fn webhook_handler(
    body: web::Json<Value>,
    bot: Option<web::Data<Arc<BotService>>>,
    settings: Option<web::Data<Settings>>,
) -> HttpResponse {
    let Some(bot) = bot else {
        tracing::error!("Webhook called but TELEGRAM_BOT_TOKEN is not configured");
        return error_response("TELEGRAM_BOT_TOKEN not configured");
    };

    if settings.map_or(false, |settings| settings.telegram.mode == TelegramMode::Disabled) {
        tracing::warn!("Dropping webhook delivery: telegram.mode is disabled");
        return HttpResponse::Ok().json(serde_json::json!({ "ok": true }));
    }

    let raw = body.into_inner();
    let preview: String = raw.to_string().chars().take(200).collect();
    tracing::info!(update = %preview, "Telegram update received");

    // anything that is not a message update is acknowledged and dropped
    let update: Update = match serde_json::from_value(raw) {
        Ok(update) => update,
        Err(err) => {
            tracing::debug!(error = %err, "Ignoring unsupported update");
            return HttpResponse::Ok().json(serde_json::json!({ "ok": true }));
        }
    };

    match bot.handle_update(&update).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "ok": true })),
        Err(err) => {
            tracing::error!(error = %err, "Telegram webhook error");
            error_response(err.to_string())
        }
    }
}
