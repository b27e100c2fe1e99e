//! Storage module for recap
//!
//! Users and their transcribed files live in a single SQLite database.

mod database;
mod models;
mod store;

pub use database::{Database, DatabaseStats};
pub use models::{FilePatch, FileRecord, User, DEFAULT_TOPIC};
pub use store::{FileStore, UserStore};
