//! Backend client error types.

/// Errors from the itinerary backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON deserialization failed
    #[error("JSON parse error: {message}{}", body.as_ref().map(|b| format!(" (body: {b})")).unwrap_or_default())]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Session missing, expired or rejected
    #[error("unauthorized (session missing or expired)")]
    Unauthorized,

    /// Authenticated but not allowed
    #[error("forbidden")]
    Forbidden,

    /// Resource does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Backend answered `success: false`
    #[error("request rejected: {0}")]
    Rejected(String),

    /// Any other non-success status
    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    /// Client could not be built from its configuration
    #[error("not configured: {0}")]
    NotConfigured(String),
}

impl ApiError {
    /// Whether the error means the session is no longer usable.
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}
