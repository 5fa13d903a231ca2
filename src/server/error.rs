//! Error-to-HTTP response conversion.
//!
//! Every failure answers with a JSON object holding a single `error` key:
//! a field-keyed map for form validation, a message string otherwise.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::upload_form::FieldErrors;
use crate::images::PrepareError;

/// Failure of an API handler.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// One or more form fields are invalid.
    #[error("invalid form fields")]
    Validation(FieldErrors),

    /// The upload could not be decoded, resized or re-encoded.
    #[error(transparent)]
    Prepare(#[from] PrepareError),

    /// No record with the requested ID. Holds the ID as requested.
    #[error("Image with id.{0} not found")]
    ImageNotFound(String),

    /// The request body is not a readable multipart form.
    #[error("{message}")]
    Multipart { status: StatusCode, message: String },

    /// Storage or database failure.
    #[error(transparent)]
    Store(#[from] imagehost_common::Error),
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        ApiError::Multipart {
            status: e.status(),
            message: e.body_text(),
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(e: MultipartRejection) -> Self {
        ApiError::Multipart {
            status: e.status(),
            message: e.body_text(),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Prepare(_) => StatusCode::BAD_REQUEST,
            ApiError::ImageNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Multipart { status, .. } => *status,
            ApiError::Store(e) => StatusCode::from_u16(e.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self,
                "Server error in API handler"
            );
        }

        let body = match &self {
            ApiError::Validation(fields) => json!({ "error": fields }),
            other => json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
