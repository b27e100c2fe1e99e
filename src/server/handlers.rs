//! HTTP handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::auth::token_from_headers;
use crate::server::error::ApiError;
use crate::server::AppState;
use crate::storage::FilePatch;

#[derive(Debug, Deserialize)]
pub struct RegenerateSummaryRequest {
    #[serde(rename = "fileId", default)]
    pub file_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegenerateSummaryResponse {
    pub success: bool,
    pub message: String,
    pub summary: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub summaries: bool,
}

/// POST /api/files/regenerate-summary
///
/// Regenerate the AI summary of a file owned by the caller from its stored
/// transcript and persist it. The file's topic is kept, or set to the
/// default label when it has none.
pub async fn regenerate_summary(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<RegenerateSummaryRequest>, JsonRejection>,
) -> Result<Json<RegenerateSummaryResponse>, ApiError> {
    let token = token_from_headers(&headers).ok_or_else(|| {
        warn!("Regenerate summary rejected: no token provided");
        ApiError::MissingToken
    })?;

    let claims = state.tokens.verify(&token).ok_or_else(|| {
        warn!("Regenerate summary rejected: token verification failed");
        ApiError::InvalidToken
    })?;

    let user = state.users.find_by_email(&claims.email)?.ok_or_else(|| {
        warn!("Regenerate summary rejected: token subject has no account");
        ApiError::UserNotFound
    })?;

    let file_id = match payload {
        Ok(Json(body)) => body.file_id,
        Err(rejection) => {
            warn!(error = %rejection, "Regenerate summary rejected: unreadable body");
            None
        }
    };
    let file_id = file_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or(ApiError::MissingFileId)?;

    info!(user_id = %user.id, file_id = %file_id, "Regenerating summary");

    let file = state.files.find_by_id(&file_id)?.ok_or_else(|| {
        warn!(file_id = %file_id, "File not found");
        ApiError::FileNotFound
    })?;

    if file.user_id != user.id {
        warn!(
            file_id = %file.id,
            owner_id = %file.user_id,
            user_id = %user.id,
            "Access denied to file"
        );
        return Err(ApiError::Forbidden);
    }

    let transcript = file.usable_transcript().ok_or_else(|| {
        warn!(file_id = %file.id, "File has no transcript");
        ApiError::MissingTranscript
    })?;

    let generator = state.summaries.as_ref().ok_or_else(|| {
        error!("Summary generation requested but no LLM provider is configured");
        ApiError::NotConfigured
    })?;

    let summary = generator.generate(transcript).await.map_err(|e| {
        error!(
            file_id = %file.id,
            retryable = e.is_retryable(),
            "Summary generation failed: {}",
            e
        );
        ApiError::Generation(e)
    })?;

    let patch = FilePatch {
        summary: Some(summary.clone()),
        topic: Some(file.topic_or_default()),
    };

    match state.files.update(&file.id, &patch) {
        Ok(Some(_)) => {}
        Ok(None) => {
            error!(file_id = %file.id, "File disappeared before the summary was saved");
            return Err(ApiError::UpdateFailed);
        }
        Err(e) => {
            error!(file_id = %file.id, "Failed to save summary: {:#}", e);
            return Err(ApiError::UpdateFailed);
        }
    }

    info!(file_id = %file.id, summary_chars = summary.chars().count(), "Summary regenerated");

    Ok(Json(RegenerateSummaryResponse {
        success: true,
        message: "Summary regenerated successfully".to_string(),
        summary,
    }))
}

/// Any method other than POST on the summary route
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::VERSION,
        summaries: state.summaries.is_some(),
    })
}
