//! Configuration module for recap
//!
//! Handles loading and managing application settings from TOML files.

mod settings;

pub use settings::{Settings, API_KEY_ENV, TOKEN_SECRET_ENV};
