//! Conversion of domain failures into HTTP responses.
//!
//! Every failure body has the shape `{"error": "<message>"}`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::domains::community_notes::CommunityNoteError;

const GENERIC_ERROR: &str = "Something went wrong while processing the community note";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: GENERIC_ERROR.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<CommunityNoteError> for ApiError {
    fn from(err: CommunityNoteError) -> Self {
        match err {
            CommunityNoteError::Validation(message) => Self::bad_request(message),
            CommunityNoteError::AlreadyVoted => Self::bad_request(err.to_string()),
            CommunityNoteError::NotFound => Self::not_found(err.to_string()),
            // Clients of the submit endpoint treat the window violation as a
            // server-side refusal, not a malformed request.
            CommunityNoteError::RateLimited => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: err.to_string(),
            },
            CommunityNoteError::Storage(source) => {
                error!(error = %source, "Community note storage failure");
                Self::internal()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(format!("Invalid request body: {}", rejection.body_text()))
    }
}
