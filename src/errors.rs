use crate::connectors::ConnectorError;
use crate::store::StoreError;
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;

/// Failures surfaced at the HTTP boundary. Every variant renders as the
/// failure envelope `{"success": false, "error": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// Missing or malformed request input
    #[error("{0}")]
    ClientInput(String),
    /// Deployment is missing a credential or setting
    #[error("{0}")]
    Configuration(String),
    /// Completion API failed or produced nothing
    #[error("{0}")]
    Upstream(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl ChatError {
    pub fn empty_reply() -> Self {
        Self::Upstream("Upstream returned an empty response".to_string())
    }
}

impl From<ConnectorError> for ChatError {
    fn from(err: ConnectorError) -> Self {
        match err {
            ConnectorError::NotConfigured(what) => {
                Self::Configuration(format!("{} is not configured", what))
            }
            other => Self::Upstream(other.to_string()),
        }
    }
}

impl From<StoreError> for ChatError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => Self::NotFound(what),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl ResponseError for ChatError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ClientInput(_) => StatusCode::BAD_REQUEST,
            Self::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            Self::Configuration(msg) => tracing::error!("Configuration error: {}", msg),
            Self::Upstream(msg) => tracing::error!("Upstream error: {}", msg),
            Self::Internal(msg) => tracing::error!("Internal error: {}", msg),
            Self::ClientInput(msg) | Self::NotFound(msg) => tracing::debug!("{}", msg),
        }

        let message = self.to_string();
        let message = if message.trim().is_empty() {
            "Internal error".to_string()
        } else {
            message
        };

        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": message,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_becomes_configuration_error() {
        let err: ChatError = ConnectorError::NotConfigured("LLM_API_KEY".into()).into();
        assert!(matches!(err, ChatError::Configuration(_)));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "LLM_API_KEY is not configured");
    }

    #[test]
    fn envelope_error_is_never_blank() {
        let resp = ChatError::Upstream(String::new()).error_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }
}
