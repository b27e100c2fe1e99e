//! Data models for storage

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Topic assigned to a file when a summary is generated and none is set yet.
pub const DEFAULT_TOPIC: &str = "General";

/// An account that owns files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier (UUID)
    pub id: String,

    /// Login email, stored lowercased
    pub email: String,

    /// Optional display name
    pub name: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with the given email
    pub fn new(email: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email: normalize_email(email),
            name: None,
            created_at: Utc::now(),
        }
    }
}

/// One uploaded audio/video job and the text derived from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Unique identifier (UUID)
    pub id: String,

    /// Owning user
    pub user_id: String,

    /// Display title
    pub title: String,

    /// Transcribed text
    pub transcript: Option<String>,

    /// AI-generated synopsis of the transcript
    pub summary: Option<String>,

    /// Topic label
    pub topic: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl FileRecord {
    /// Create a new file owned by `user_id`
    pub fn new(user_id: &str, title: String) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title,
            transcript: None,
            summary: None,
            topic: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Transcript text, if present and not blank
    pub fn usable_transcript(&self) -> Option<&str> {
        self.transcript
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }

    /// Current topic, or the default label when unset
    pub fn topic_or_default(&self) -> String {
        match self.topic.as_deref().map(str::trim) {
            Some(topic) if !topic.is_empty() => topic.to_string(),
            _ => DEFAULT_TOPIC.to_string(),
        }
    }
}

/// Partial update of a file; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilePatch {
    pub summary: Option<String>,
    pub topic: Option<String>,
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
