//! Handler-boundary errors and their HTTP rendering.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::metrics::REJECTIONS;
use crate::models::ErrorBody;
use crate::telegram::TelegramError;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("rate limit exceeded")]
    TooManyRequests { retry_after: Duration },

    #[error("missing or mismatched shared secret")]
    Unauthorized,

    #[error("message missing or blank")]
    MessageRequired,

    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("telegram rejected the message: {0}")]
    Upstream(String),

    #[error("telegram call failed: {0}")]
    Internal(String),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            RelayError::Unauthorized => StatusCode::UNAUTHORIZED,
            RelayError::MessageRequired => StatusCode::BAD_REQUEST,
            RelayError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            RelayError::Upstream(_) => StatusCode::BAD_GATEWAY,
            RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the caller. Never carries upstream detail.
    pub fn public_message(&self) -> &'static str {
        match self {
            RelayError::TooManyRequests { .. } => "Too many requests",
            RelayError::Unauthorized => "Unauthorized",
            RelayError::MessageRequired => "Message required",
            RelayError::PayloadTooLarge { .. } => "Payload too large",
            RelayError::Upstream(_) => "Telegram send failed",
            RelayError::Internal(_) => "Server error",
        }
    }

    fn reason(&self) -> &'static str {
        match self {
            RelayError::TooManyRequests { .. } => "rate_limited",
            RelayError::Unauthorized => "unauthorized",
            RelayError::MessageRequired => "bad_request",
            RelayError::PayloadTooLarge { .. } => "payload_too_large",
            RelayError::Upstream(_) => "upstream_rejected",
            RelayError::Internal(_) => "server_error",
        }
    }
}

impl From<TelegramError> for RelayError {
    fn from(err: TelegramError) -> Self {
        match err {
            TelegramError::Rejected { .. } => RelayError::Upstream(err.to_string()),
            TelegramError::Transport(_) | TelegramError::Decode(_) => {
                RelayError::Internal(err.to_string())
            }
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        REJECTIONS.with_label_values(&[self.reason()]).inc();

        match &self {
            RelayError::Upstream(detail) => warn!(%status, %detail, "Relay failed upstream"),
            RelayError::Internal(detail) => error!(%status, %detail, "Relay failed"),
            other => info!(%status, reason = %other, "Request rejected"),
        }

        let body = Json(ErrorBody {
            error: self.public_message().to_string(),
        });
        let mut response = (status, body).into_response();

        if let RelayError::TooManyRequests { retry_after } = self {
            // round up so clients never retry inside the same window
            let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            if let Ok(value) = HeaderValue::from_str(&secs.max(1).to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}
