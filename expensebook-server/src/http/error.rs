//! API error types with IntoResponse
//!
//! Every failure becomes a `{ success: false, message }` envelope.
//! Rejected input keeps its specific reason; anything else is logged and
//! answered with a generic message.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::envelope::Envelope;
use crate::error::Error;
use crate::models::ValidationError;

/// Message returned for every non-input failure
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error.";

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Candidate violated its schema (400)
    Validation(ValidationError),

    /// Unique value already taken (409)
    Conflict { message: String },

    /// Body was not usable JSON (400)
    BadRequest { message: String },

    /// Configuration, connection or store failure (500, logged)
    Internal { operation: &'static str, source: Error },
}

impl ApiError {
    /// Wrap a core error raised while performing `operation`.
    pub fn during(operation: &'static str, err: Error) -> Self {
        if !err.is_rejection() {
            return Self::Internal {
                operation,
                source: err,
            };
        }
        match err {
            Error::Validation(e) => Self::Validation(e),
            other => Self::Conflict {
                message: other.to_string(),
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::Validation(e) => e.to_string(),
            Self::Conflict { message } | Self::BadRequest { message } => message,
            Self::Internal { operation, source } => {
                // Log the actual error, return generic message
                tracing::error!(operation, error = %source, "request failed");
                INTERNAL_ERROR_MESSAGE.to_owned()
            }
        };

        (status, Json(Envelope::failure(message))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest {
            message: rejection.body_text(),
        }
    }
}
