/// Errors that can occur during external service communication
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    /// HTTP request/response error, with the upstream status when one was received
    #[error("HTTP error: {message}")]
    HttpError {
        status: Option<u16>,
        message: String,
    },
    /// Service unreachable or timeout
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Invalid response format from external service
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    /// Authentication error (401/403)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    /// Rate limited or exceeded quota
    #[error("Rate limited: {0}")]
    RateLimited(String),
    /// Required credential is not configured
    #[error("Not configured: {0}")]
    NotConfigured(String),
}

impl ConnectorError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::HttpError {
            status: Some(status),
            message: message.into(),
        }
    }

    /// The remote end answered and refused the request, as opposed to a
    /// transport failure or a local problem.
    pub fn is_rejection(&self) -> bool {
        self.upstream_status().is_some()
    }

    /// Upstream HTTP status, when the failure came from a response.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::HttpError { status, .. } => *status,
            Self::Unauthorized(_) => Some(401),
            Self::RateLimited(_) => Some(429),
            _ => None,
        }
    }

    /// Map a non-success status and body to the matching variant.
    pub fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        match status {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                Self::Unauthorized(body)
            }
            reqwest::StatusCode::TOO_MANY_REQUESTS => Self::RateLimited(body),
            status if body.trim().is_empty() => {
                Self::http(status.as_u16(), format!("upstream returned {}", status))
            }
            status => Self::http(status.as_u16(), body),
        }
    }
}

impl From<reqwest::Error> for ConnectorError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest errors carry the URL but never the request headers
        if err.is_timeout() {
            Self::ServiceUnavailable(format!("Request timeout: {}", err))
        } else if err.is_connect() {
            Self::ServiceUnavailable(format!("Connection failed: {}", err))
        } else {
            Self::HttpError {
                status: err.status().map(|s| s.as_u16()),
                message: err.to_string(),
            }
        }
    }
}
