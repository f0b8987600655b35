use actix_web::HttpResponse;
use serde::Serialize;

/// Success envelope. Failures are rendered by `ChatError`.
#[derive(Serialize)]
pub struct JsonResponse<T> {
    pub(crate) success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) reply: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) item: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) list: Option<Vec<T>>,
}

pub struct JsonResponseBuilder<T>
where
    T: serde::Serialize,
{
    reply: Option<String>,
    item: Option<T>,
    list: Option<Vec<T>>,
}

impl<T> Default for JsonResponseBuilder<T>
where
    T: serde::Serialize,
{
    fn default() -> Self {
        Self {
            reply: None,
            item: None,
            list: None,
        }
    }
}

impl<T> JsonResponseBuilder<T>
where
    T: serde::Serialize,
{
    pub(crate) fn set_reply(mut self, reply: impl Into<String>) -> Self {
        self.reply = Some(reply.into());
        self
    }

    pub(crate) fn set_item(mut self, item: T) -> Self {
        self.item = Some(item);
        self
    }

    pub(crate) fn set_list(mut self, list: Vec<T>) -> Self {
        self.list = Some(list);
        self
    }

    fn into_response(self) -> JsonResponse<T> {
        JsonResponse {
            success: true,
            reply: self.reply,
            item: self.item,
            list: self.list,
        }
    }

    pub(crate) fn ok(self) -> HttpResponse {
        HttpResponse::Ok().json(self.into_response())
    }

    pub(crate) fn created(self) -> HttpResponse {
        HttpResponse::Created().json(self.into_response())
    }
}

impl<T> JsonResponse<T>
where
    T: serde::Serialize,
{
    pub(crate) fn build() -> JsonResponseBuilder<T> {
        JsonResponseBuilder::default()
    }
}

impl JsonResponse<()> {
    /// `{"success": true, "reply": "..."}`
    pub(crate) fn reply(text: impl Into<String>) -> HttpResponse {
        JsonResponse::<()>::build().set_reply(text).ok()
    }
}
