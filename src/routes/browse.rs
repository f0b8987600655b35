use crate::connectors::browser::{page_prompt, PAGE_MAX_TOKENS};
use crate::connectors::{CompletionConnector, PageFetcher};
use crate::errors::ChatError;
use crate::forms::BrowseRequest;
use crate::helpers::JsonResponse;
use crate::models::ChatMessage;
use actix_web::{post, web, HttpResponse};
use std::sync::Arc;

/// Fetch a page and answer `query` about it.
#[tracing::instrument(name = "Browse page.", skip_all, fields(url = %form.url))]
#[post("/browse")]
pub async fn browse_handler(
    form: web::Json<BrowseRequest>,
    pages: web::Data<Arc<dyn PageFetcher>>,
    llm: web::Data<Arc<dyn CompletionConnector>>,
) -> Result<HttpResponse, ChatError> {
    let url = form.validated_url()?;
    let text = pages.fetch_text(url).await?;

    let prompt = page_prompt(url, form.query_or_default(), &text);
    let reply = llm
        .complete(&[ChatMessage::user(prompt)], PAGE_MAX_TOKENS)
        .await?;
    if reply.trim().is_empty() {
        return Err(ChatError::empty_reply());
    }

    Ok(JsonResponse::reply(reply))
}
