//! Domain-specific error types for celebration-rsvp

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::normalize::ValidationError;
use crate::sheets::Sheet;

/// Main error type for the RSVP service
#[derive(Error, Debug)]
pub enum RsvpError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Upstream {sheet} sheet unavailable (HTTP {status})")]
    UpstreamUnavailable { sheet: Sheet, status: u16 },

    #[error("Upstream error: {message}")]
    Upstream { message: String },

    #[error("Unexpected payload shape from {sheet} sheet")]
    MalformedShape { sheet: Sheet },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    Unauthorized { message: String },

    #[error("{message}")]
    FeatureDisabled { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl RsvpError {
    /// True for failures that originate from the spreadsheet proxy or the wire to it.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            RsvpError::Network { .. }
                | RsvpError::UpstreamUnavailable { .. }
                | RsvpError::Upstream { .. }
                | RsvpError::MalformedShape { .. }
                | RsvpError::Serialization { .. }
        )
    }
}

impl From<anyhow::Error> for RsvpError {
    fn from(err: anyhow::Error) -> Self {
        RsvpError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for RsvpError {
    fn from(err: serde_json::Error) -> Self {
        RsvpError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for RsvpError {
    fn from(err: reqwest::Error) -> Self {
        RsvpError::Network {
            message: format!("HTTP request failed: {}", err),
        }
    }
}

/// Result type alias for RSVP operations
pub type Result<T> = std::result::Result<T, RsvpError>;

/// Error returned from route handlers, rendered as `{"error": message}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// Map a domain error to a response. Upstream and internal failures are
    /// logged with their cause and replaced by the generic `context` message.
    pub fn with_context(context: &str, err: RsvpError) -> Self {
        match err {
            RsvpError::Validation(v) => Self::bad_request(v.to_string()),
            RsvpError::NotFound { message } => Self::new(StatusCode::NOT_FOUND, message),
            RsvpError::Unauthorized { message } => Self::unauthorized(message),
            RsvpError::FeatureDisabled { message } => Self::new(StatusCode::FORBIDDEN, message),
            other => {
                tracing::error!(error = %other, "{context}");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, context)
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
