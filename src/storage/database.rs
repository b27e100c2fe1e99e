//! SQLite database management

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::config::Settings;
use crate::storage::models::{normalize_email, FilePatch, FileRecord, User};

/// Database wrapper for recap
///
/// The connection sits behind a mutex so one `Database` can be shared by
/// every request handler.
pub struct Database {
    conn: Mutex<Connection>,
}

const CURRENT_SCHEMA_VERSION: i64 = 1;

const FILE_COLUMNS: &str =
    "id, user_id, title, transcript, summary, topic, created_at, updated_at";

impl Database {
    /// Open or create the database
    pub fn open(settings: &Settings) -> Result<Self> {
        let db_path = settings.database_path();

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        Self::open_path(&db_path)
    }

    /// Open database at a specific path (useful for testing)
    pub fn open_path(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;

        let db = Self {
            conn: Mutex::new(conn),
        };
        db.initialize()?;

        Ok(db)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.initialize()?;
        Ok(db)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("Database connection lock poisoned"))
    }

    /// Initialize database schema
    fn initialize(&self) -> Result<()> {
        // Enable foreign keys
        self.conn()?.execute_batch("PRAGMA foreign_keys = ON;")?;

        let current_version = self.schema_version()?;
        if current_version > CURRENT_SCHEMA_VERSION {
            anyhow::bail!(
                "Database schema version {} is newer than supported version {}",
                current_version,
                CURRENT_SCHEMA_VERSION
            );
        }

        if current_version < 1 {
            self.migrate_to_v1()?;
            self.set_schema_version(1)?;
        }

        Ok(())
    }

    /// Current schema version tracked in PRAGMA user_version.
    pub fn schema_version(&self) -> Result<i64> {
        Ok(self
            .conn()?
            .query_row("PRAGMA user_version;", [], |row| row.get(0))?)
    }

    fn set_schema_version(&self, version: i64) -> Result<()> {
        self.conn()?
            .execute(&format!("PRAGMA user_version = {}", version), [])?;
        Ok(())
    }

    fn migrate_to_v1(&self) -> Result<()> {
        self.conn()?.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                name TEXT,
                created_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS files (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                title TEXT NOT NULL,
                transcript TEXT,
                summary TEXT,
                topic TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_files_user_id
                ON files(user_id, created_at DESC);
            "#,
        )?;

        Ok(())
    }

    /// Insert a new user
    pub fn insert_user(&self, user: &User) -> Result<()> {
        self.conn()?
            .execute(
                "INSERT INTO users (id, email, name, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![
                    user.id,
                    normalize_email(&user.email),
                    user.name,
                    user.created_at.timestamp(),
                ],
            )
            .with_context(|| format!("Failed to insert user {}", user.email))?;

        Ok(())
    }

    /// Get a user by ID
    pub fn get_user(&self, id: &str) -> Result<Option<User>> {
        Ok(self
            .conn()?
            .query_row(
                "SELECT id, email, name, created_at FROM users WHERE id = ?1",
                params![id],
                row_to_user,
            )
            .optional()?)
    }

    /// Get a user by email (case-insensitive)
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .conn()?
            .query_row(
                "SELECT id, email, name, created_at FROM users WHERE email = ?1",
                params![normalize_email(email)],
                row_to_user,
            )
            .optional()?)
    }

    /// List users ordered by creation date
    pub fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT id, email, name, created_at FROM users ORDER BY created_at")?;

        let users = stmt
            .query_map([], row_to_user)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(users)
    }

    /// Insert a new file
    pub fn insert_file(&self, file: &FileRecord) -> Result<()> {
        self.conn()?.execute(
            r#"
            INSERT INTO files (id, user_id, title, transcript, summary, topic, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                file.id,
                file.user_id,
                file.title,
                file.transcript,
                file.summary,
                file.topic,
                file.created_at.timestamp(),
                file.updated_at.timestamp(),
            ],
        )?;

        Ok(())
    }

    /// Get a file by ID
    pub fn get_file(&self, id: &str) -> Result<Option<FileRecord>> {
        Ok(self
            .conn()?
            .query_row(
                &format!("SELECT {} FROM files WHERE id = ?1", FILE_COLUMNS),
                params![id],
                row_to_file,
            )
            .optional()?)
    }

    /// List files owned by a user, newest first
    pub fn list_files_for_user(&self, user_id: &str) -> Result<Vec<FileRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM files WHERE user_id = ?1 ORDER BY created_at DESC",
            FILE_COLUMNS
        ))?;

        let files = stmt
            .query_map(params![user_id], row_to_file)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(files)
    }

    /// Apply a partial update to a file.
    ///
    /// Returns the updated record, or `None` when no file has that id.
    pub fn update_file(&self, id: &str, patch: &FilePatch) -> Result<Option<FileRecord>> {
        let changed = self.conn()?.execute(
            r#"
            UPDATE files
            SET summary = COALESCE(?2, summary),
                topic = COALESCE(?3, topic),
                updated_at = ?4
            WHERE id = ?1
            "#,
            params![id, patch.summary, patch.topic, Utc::now().timestamp()],
        )?;

        if changed == 0 {
            return Ok(None);
        }

        self.get_file(id)
    }

    /// Delete a file
    pub fn delete_file(&self, id: &str) -> Result<()> {
        self.conn()?
            .execute("DELETE FROM files WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Get database statistics
    pub fn get_stats(&self) -> Result<DatabaseStats> {
        let conn = self.conn()?;
        let total_users: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        let total_files: i64 = conn.query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))?;
        let summarized_files: i64 = conn.query_row(
            "SELECT COUNT(*) FROM files WHERE summary IS NOT NULL",
            [],
            |row| row.get(0),
        )?;

        Ok(DatabaseStats {
            total_users: total_users as usize,
            total_files: total_files as usize,
            summarized_files: summarized_files as usize,
        })
    }
}

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    let created_timestamp: i64 = row.get(3)?;

    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        created_at: from_timestamp(created_timestamp),
    })
}

fn row_to_file(row: &rusqlite::Row) -> rusqlite::Result<FileRecord> {
    let created_timestamp: i64 = row.get(6)?;
    let updated_timestamp: i64 = row.get(7)?;

    Ok(FileRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        transcript: row.get(3)?,
        summary: row.get(4)?,
        topic: row.get(5)?,
        created_at: from_timestamp(created_timestamp),
        updated_at: from_timestamp(updated_timestamp),
    })
}

fn from_timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(secs, 0).unwrap_or_default()
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    pub total_users: usize,
    pub total_files: usize,
    pub summarized_files: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn seeded() -> (Database, User, FileRecord) {
        let db = Database::open_memory().unwrap();
        let user = User::new("owner@example.com");
        db.insert_user(&user).unwrap();

        let mut file = FileRecord::new(&user.id, "Weekly sync".to_string());
        file.transcript = Some("We talked about the roadmap.".to_string());
        db.insert_file(&file).unwrap();

        (db, user, file)
    }

    #[test]
    fn test_create_database() {
        let db = Database::open_memory().unwrap();
        let stats = db.get_stats().unwrap();
        assert_eq!(stats.total_users, 0);
        assert_eq!(stats.total_files, 0);
    }

    #[test]
    fn test_user_lookup_ignores_email_case() {
        let (db, user, _) = seeded();

        let found = db.get_user_by_email("Owner@Example.com").unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert!(db.get_user_by_email("nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_email_is_rejected() {
        let (db, _, _) = seeded();
        assert!(db.insert_user(&User::new("OWNER@example.com")).is_err());
    }

    #[test]
    fn test_update_file_only_touches_patched_fields() {
        let (db, _, file) = seeded();

        let patch = FilePatch {
            summary: Some("A useful summary of the meeting.".to_string()),
            topic: None,
        };
        let updated = db.update_file(&file.id, &patch).unwrap().unwrap();

        assert_eq!(updated.summary.as_deref(), Some("A useful summary of the meeting."));
        assert_eq!(updated.topic, None);
        assert_eq!(updated.transcript, file.transcript);
        assert_eq!(updated.title, "Weekly sync");
    }

    #[test]
    fn test_update_missing_file_returns_none() {
        let (db, _, _) = seeded();
        let patch = FilePatch {
            summary: Some("x".to_string()),
            topic: Some("y".to_string()),
        };
        assert!(db.update_file("missing", &patch).unwrap().is_none());
        assert_eq!(db.get_stats().unwrap().summarized_files, 0);
    }

    #[test]
    fn test_new_database_sets_schema_version() {
        let db = Database::open_memory().unwrap();
        assert_eq!(db.schema_version().unwrap(), 1);
    }

    #[test]
    fn test_reopening_database_keeps_records() {
        let tmp = tempdir().unwrap();
        let db_path = tmp.path().join("recap.db");

        let user = User::new("persist@example.com");
        {
            let db = Database::open_path(&db_path).unwrap();
            db.insert_user(&user).unwrap();
        }

        let db = Database::open_path(&db_path).unwrap();
        assert_eq!(db.schema_version().unwrap(), 1);
        assert_eq!(db.get_user(&user.id).unwrap().unwrap().email, "persist@example.com");
    }

    #[test]
    fn test_newer_schema_is_refused() {
        let tmp = tempdir().unwrap();
        let db_path = tmp.path().join("future.db");

        let conn = Connection::open(&db_path).unwrap();
        conn.execute_batch("PRAGMA user_version = 7;").unwrap();
        drop(conn);

        let err = match Database::open_path(&db_path) {
            Ok(_) => panic!("expected newer schema to be refused"),
            Err(e) => e.to_string(),
        };
        assert!(err.contains("newer than supported"));
    }
}
