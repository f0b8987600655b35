mod setup;
mod webhook;

pub use setup::*;
pub use webhook::*;

use actix_web::HttpResponse;

/// Telegram-facing failures use a bare `{"error": ...}` body.
pub(crate) fn error_response(message: impl Into<String>) -> HttpResponse {
    HttpResponse::InternalServerError().json(serde_json::json!({ "error": message.into() }))
}
