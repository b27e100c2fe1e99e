//! Store traits used by the request handlers
//!
//! The HTTP layer only sees these lookups, so tests can swap the SQLite
//! database for something that records calls.

use anyhow::Result;

use crate::storage::{Database, FilePatch, FileRecord, User};

/// Read access to user accounts
pub trait UserStore: Send + Sync {
    /// Find a user by login email
    fn find_by_email(&self, email: &str) -> Result<Option<User>>;
}

/// Read/write access to transcribed files
pub trait FileStore: Send + Sync {
    /// Find a file by id
    fn find_by_id(&self, id: &str) -> Result<Option<FileRecord>>;

    /// Apply `patch` to the file; `None` means no such file
    fn update(&self, id: &str, patch: &FilePatch) -> Result<Option<FileRecord>>;
}

impl UserStore for Database {
    fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email(email)
    }
}

impl FileStore for Database {
    fn find_by_id(&self, id: &str) -> Result<Option<FileRecord>> {
        self.get_file(id)
    }

    fn update(&self, id: &str, patch: &FilePatch) -> Result<Option<FileRecord>> {
        self.update_file(id, patch)
    }
}
