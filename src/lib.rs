//! recap - Backend for a transcription service
//!
//! Stores users and their transcribed files, and regenerates AI summaries
//! for those transcripts behind an authenticated HTTP endpoint.

pub mod auth;
pub mod cli;
pub mod config;
pub mod llm;
pub mod server;
pub mod storage;

use thiserror::Error;

/// Main error type for recap
#[derive(Error, Debug)]
pub enum RecapError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),
}

pub type Result<T> = std::result::Result<T, RecapError>;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "recap";
