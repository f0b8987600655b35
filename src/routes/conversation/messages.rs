use crate::errors::ChatError;
use crate::forms::MessageForm;
use crate::helpers::JsonResponse;
use crate::models::Message;
use crate::store::ConversationStore;
use actix_web::{get, post, web, HttpResponse};
use serde_valid::Validate;
use std::sync::Arc;
use uuid::Uuid;

/// Messages of one conversation, oldest first.
#[tracing::instrument(name = "List messages.", skip_all, fields(conversation_id = %path))]
#[get("/{id}/messages")]
pub async fn list_messages_handler(
    path: web::Path<Uuid>,
    store: web::Data<Arc<dyn ConversationStore>>,
) -> Result<HttpResponse, ChatError> {
    let list = store.list_messages(path.into_inner()).await?;
    Ok(JsonResponse::<Message>::build().set_list(list).ok())
}

#[tracing::instrument(name = "Append message.", skip_all, fields(conversation_id = %path))]
#[post("/{id}/messages")]
pub async fn append_message_handler(
    path: web::Path<Uuid>,
    form: web::Json<MessageForm>,
    store: web::Data<Arc<dyn ConversationStore>>,
) -> Result<HttpResponse, ChatError> {
    form.validate()
        .map_err(|err| ChatError::ClientInput(err.to_string()))?;

    let message = store
        .append_message(form.into_inner().into_new_message(path.into_inner()))
        .await?;
    Ok(JsonResponse::build().set_item(message).created())
}
