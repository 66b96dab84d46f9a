//! Error type for the admin proxy and its JSON envelope rendering

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use busdesk_core::ApiEnvelope;
use thiserror::Error;
use tracing::{error, warn};

/// Errors returned by proxy handlers
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Malformed or out-of-range request parameters
    #[error("{0}")]
    BadRequest(String),

    /// No admin token was presented
    #[error("{0}")]
    Unauthorized(String),

    /// Unknown resource or settings section
    #[error("{0}")]
    NotFound(String),

    /// The upstream answered with a non-2xx status
    #[error("{message}")]
    Upstream {
        /// Status returned by the upstream
        status: u16,
        /// Error text from the upstream envelope
        message: String,
    },

    /// The upstream could not be reached
    #[error("upstream request failed: {0}")]
    Transport(String),

    /// The upstream did not answer in time
    #[error("upstream request timed out")]
    Timeout,

    /// Anything else
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status sent to the caller
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::Transport(_) => StatusCode::BAD_GATEWAY,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<busdesk_core::Error> for ApiError {
    fn from(err: busdesk_core::Error) -> Self {
        match err {
            busdesk_core::Error::NotFound { resource } => Self::NotFound(format!("Unknown {resource}")),
            busdesk_core::Error::Validation { field, message } => {
                Self::BadRequest(format!("Invalid {field}: {message}"))
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = %status, error = %self, "admin request failed");
        } else {
            warn!(status = %status, error = %self, "admin request rejected");
        }
        (status, Json(ApiEnvelope::<()>::failure(self.to_string()))).into_response()
    }
}

/// Result alias for handlers
pub type ApiResult<T> = std::result::Result<T, ApiError>;
