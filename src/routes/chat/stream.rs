use crate::connectors::CompletionConnector;
use crate::errors::ChatError;
use crate::forms::ChatRequest;
use actix_web::{http::header, post, web, HttpResponse};
use futures::{future, StreamExt};
use std::sync::Arc;

/// Relay the upstream `text/event-stream` body as it arrives.
///
/// Failures before the first byte use the failure envelope. Once streaming
/// has started an upstream read error just ends the body.
#[tracing::instrument(name = "Chat stream.", skip_all)]
#[post("/chat/stream")]
pub async fn stream_handler(
    form: web::Json<ChatRequest>,
    llm: web::Data<Arc<dyn CompletionConnector>>,
) -> Result<HttpResponse, ChatError> {
    let messages = form.into_inner().into_messages()?;
    tracing::info!(messages = messages.len(), "Streaming chat from completion API");

    let upstream = llm.stream(&messages, llm.default_max_tokens()).await?;
    let body = upstream.take_while(|chunk| {
        if let Err(err) = chunk {
            tracing::error!(error = %err, "Upstream stream failed mid-reply");
        }
        future::ready(chunk.is_ok())
    });

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .insert_header(("X-Accel-Buffering", "no"))
        .streaming(body))
}
