use crate::errors::ChatError;
use crate::forms::{ConversationForm, RenameForm};
use crate::helpers::JsonResponse;
use crate::models::Conversation;
use crate::store::ConversationStore;
use actix_web::{delete, get, patch, post, web, HttpResponse};
use serde_valid::Validate;
use std::sync::Arc;
use uuid::Uuid;

#[tracing::instrument(name = "List conversations.", skip_all)]
#[get("")]
pub async fn list_handler(
    store: web::Data<Arc<dyn ConversationStore>>,
) -> Result<HttpResponse, ChatError> {
    let list = store.list_conversations().await?;
    Ok(JsonResponse::<Conversation>::build().set_list(list).ok())
}

#[tracing::instrument(name = "Create conversation.", skip_all)]
#[post("")]
pub async fn create_handler(
    form: web::Json<ConversationForm>,
    store: web::Data<Arc<dyn ConversationStore>>,
) -> Result<HttpResponse, ChatError> {
    form.validate()
        .map_err(|err| ChatError::ClientInput(err.to_string()))?;

    let conversation = store.create_conversation(&form.title()).await?;
    tracing::info!(id = %conversation.id, "Conversation created");
    Ok(JsonResponse::build().set_item(conversation).created())
}

#[tracing::instrument(name = "Rename conversation.", skip_all, fields(id = %path))]
#[patch("/{id}")]
pub async fn rename_handler(
    path: web::Path<Uuid>,
    form: web::Json<RenameForm>,
    store: web::Data<Arc<dyn ConversationStore>>,
) -> Result<HttpResponse, ChatError> {
    let title = form
        .title()
        .ok_or_else(|| ChatError::ClientInput("Title must be 1-200 characters".to_string()))?;

    let conversation = store.rename_conversation(path.into_inner(), &title).await?;
    Ok(JsonResponse::build().set_item(conversation).ok())
}

#[tracing::instrument(name = "Delete conversation.", skip_all, fields(id = %path))]
#[delete("/{id}")]
pub async fn delete_handler(
    path: web::Path<Uuid>,
    store: web::Data<Arc<dyn ConversationStore>>,
) -> Result<HttpResponse, ChatError> {
    store.delete_conversation(path.into_inner()).await?;
    Ok(JsonResponse::<Conversation>::build().ok())
}
