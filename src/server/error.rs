//! Mapping of request failures to HTTP responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::llm::GenerationError;

/// Every way the summary endpoint can fail, one status per variant
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Unauthorized")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("User not found")]
    UserNotFound,

    #[error("File ID is required")]
    MissingFileId,

    #[error("File not found")]
    FileNotFound,

    #[error("Access denied")]
    Forbidden,

    #[error("No transcript available for this file")]
    MissingTranscript,

    #[error("AI service not configured")]
    NotConfigured,

    #[error("Failed to generate summary")]
    Generation(#[source] GenerationError),

    #[error("Failed to update file")]
    UpdateFailed,

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::MissingToken | Self::InvalidToken | Self::UserNotFound => {
                StatusCode::UNAUTHORIZED
            }
            Self::MissingFileId | Self::MissingTranscript => StatusCode::BAD_REQUEST,
            Self::FileNotFound => StatusCode::NOT_FOUND,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotConfigured
            | Self::Generation(_)
            | Self::UpdateFailed
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            Self::Generation(e) => Some(e.to_string()),
            Self::Internal(e) => Some(format!("{:#}", e)),
            _ => None,
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.to_string(),
            details: self.details(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
