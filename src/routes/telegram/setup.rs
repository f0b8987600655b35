use super::error_response;
use crate::configuration::Settings;
use crate::connectors::TelegramConnector;
use actix_web::{post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum WebhookAction {
    #[default]
    Set,
    Delete,
}

#[derive(Debug, Default, Deserialize)]
pub struct SetupRequest {
    #[serde(default)]
    pub action: WebhookAction,
}

/// Register or remove the bot webhook. `set` points Telegram at
/// `{public_url}/telegram/webhook`.
#[tracing::instrument(name = "Telegram webhook setup.", skip_all)]
#[post("/setup")]
pub async fn setup_handler(
    body: Option<web::Json<SetupRequest>>,
    telegram: Option<web::Data<Arc<dyn TelegramConnector>>>,
    settings: web::Data<Settings>,
) -> HttpResponse {
    let action = body.map(|body| body.action).unwrap_or_default();

    let Some(telegram) = telegram else {
        return error_response("Missing TELEGRAM_BOT_TOKEN");
    };

    if action == WebhookAction::Delete {
        return match telegram.delete_webhook().await {
            Ok(result) => HttpResponse::Ok().json(json!({ "action": "delete", "result": result })),
            Err(err) => error_response(err.to_string()),
        };
    }

    let Some(webhook_url) = settings.telegram.webhook_url() else {
        return error_response("Missing telegram.public_url");
    };

    let result = match telegram.set_webhook(&webhook_url).await {
        Ok(result) => result,
        Err(err) => return error_response(err.to_string()),
    };
    let info = match telegram.webhook_info().await {
        Ok(info) => info,
        Err(err) => return error_response(err.to_string()),
    };
    tracing::info!(%webhook_url, "Telegram webhook registered");

    HttpResponse::Ok().json(json!({
        "action": "set",
        "webhook_url": webhook_url,
        "result": result,
        "info": info,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::get_configuration;
    use crate::connectors::telegram::MockTelegramConnector;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::Value;

    fn settings(public_url: Option<&str>) -> Settings {
        let mut settings = get_configuration().unwrap();
        settings.telegram.public_url = public_url.map(|url| url.to_string());
        settings
    }

    #[actix_web::test]
    async fn set_then_delete() {
        let mock = Arc::new(MockTelegramConnector::default());
        let telegram: Arc<dyn TelegramConnector> = mock.clone();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(telegram))
                .app_data(web::Data::new(settings(Some("https://nexus.example/"))))
                .service(setup_handler),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/setup")
            .set_json(json!({"action": "set"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["action"], "set");
        assert_eq!(body["webhook_url"], "https://nexus.example/telegram/webhook");
        assert_eq!(body["info"]["url"], "https://nexus.example/telegram/webhook");

        let req = test::TestRequest::post()
            .uri("/setup")
            .set_json(json!({"action": "delete"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["action"], "delete");
        assert!(mock.webhook.lock().unwrap().is_none());
    }

    #[actix_web::test]
    async fn missing_configuration_is_reported() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(settings(None)))
                .service(setup_handler),
        )
        .await;
        let req = test::TestRequest::post().uri("/setup").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let telegram: Arc<dyn TelegramConnector> = Arc::new(MockTelegramConnector::default());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(telegram))
                .app_data(web::Data::new(settings(None)))
                .service(setup_handler),
        )
        .await;
        let req = test::TestRequest::post().uri("/setup").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Missing telegram.public_url");
    }
}
