use crate::connectors::CompletionConnector;
use crate::errors::ChatError;
use crate::forms::ChatRequest;
use crate::helpers::JsonResponse;
use actix_web::{post, web, HttpResponse};
use std::sync::Arc;

/// Forward the conversation upstream and return the whole reply in the envelope.
#[tracing::instrument(name = "Chat completion.", skip_all)]
#[post("/chat")]
pub async fn complete_handler(
    form: web::Json<ChatRequest>,
    llm: web::Data<Arc<dyn CompletionConnector>>,
) -> Result<HttpResponse, ChatError> {
    let messages = form.into_inner().into_messages()?;
    tracing::info!(messages = messages.len(), "Forwarding chat to completion API");

    let reply = llm.complete(&messages, llm.default_max_tokens()).await?;
    if reply.trim().is_empty() {
        return Err(ChatError::empty_reply());
    }

    Ok(JsonResponse::reply(reply))
}
