//! HTTP server for recap
//!
//! Serves the summary regeneration endpoint on top of the shared stores.

pub mod error;
pub mod handlers;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::auth::TokenSigner;
use crate::config::Settings;
use crate::llm::SummaryGenerator;
use crate::storage::{Database, FileStore, UserStore};

pub use error::ApiError;

/// Path of the summary regeneration endpoint
pub const REGENERATE_SUMMARY_PATH: &str = "/api/files/regenerate-summary";

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub files: Arc<dyn FileStore>,
    pub tokens: Arc<TokenSigner>,
    /// `None` when no LLM provider could be built at startup
    pub summaries: Option<SummaryGenerator>,
}

/// Build the application router
///
/// Oversized bodies are rejected at JSON extraction, which the handler
/// only inspects after authentication.
pub fn router(state: AppState, body_limit_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            REGENERATE_SUMMARY_PATH,
            post(handlers::regenerate_summary).fallback(handlers::method_not_allowed),
        )
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("Request handler panicked: {}", message);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError::Internal(anyhow::anyhow!("handler panicked")).body()),
    )
        .into_response()
}

/// Build the state from settings.
///
/// A missing token secret is fatal. A missing LLM credential only disables
/// summary generation; the endpoint then reports the service as unconfigured.
pub fn build_state(settings: &Settings) -> Result<AppState> {
    settings.ensure_dirs()?;

    let db = Arc::new(Database::open(settings)?);
    let tokens = Arc::new(TokenSigner::from_settings(settings)?);

    let summaries = match SummaryGenerator::from_settings(settings) {
        Ok(generator) => {
            info!("Summary generation enabled ({})", generator.provider_name());
            Some(generator)
        }
        Err(e) => {
            warn!("Summary generation disabled: {}", e);
            None
        }
    };

    Ok(AppState {
        users: db.clone(),
        files: db,
        tokens,
        summaries,
    })
}

/// Run the HTTP server until Ctrl-C
pub async fn serve(settings: &Settings) -> Result<()> {
    info!("Starting recap server");

    let state = build_state(settings)?;
    let addr = settings.bind_addr()?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state, settings.server.body_limit_bytes))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Shutting down server");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}
