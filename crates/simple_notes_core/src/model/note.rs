//! Note domain record.
//!
//! # Responsibility
//! - Define the single entity persisted by the notes store.
//! - Own the JSON wire shape (`camelCase`, millisecond ISO-8601 timestamps).
//!
//! # Invariants
//! - `id` is stable and never reused for another note.
//! - `updated_at` is never earlier than `created_at`.
//! - `title` is trimmed and non-empty once the note reaches the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Opaque stable identifier of one note.
///
/// Persisted as a plain JSON string. Ids written by older sessions keep
/// whatever shape they had, so no format is enforced on read.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Wraps an existing id value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Canonical note record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Stable id generated at creation.
    pub id: NoteId,
    /// Trimmed, non-empty title.
    pub title: String,
    /// Free text body, may be empty.
    pub body: String,
    /// Set once at creation.
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    /// Set at creation and on every edit.
    #[serde(with = "iso_millis")]
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Creates a fresh note whose `created_at` and `updated_at` are both `now`.
    pub fn new(
        id: NoteId,
        title: impl Into<String>,
        body: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            body: body.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces title and body and bumps `updated_at`.
    ///
    /// `updated_at` never moves before `created_at`, even if the clock did.
    pub fn apply_edit(
        &mut self,
        title: impl Into<String>,
        body: impl Into<String>,
        now: DateTime<Utc>,
    ) {
        self.title = title.into();
        self.body = body.into();
        self.updated_at = now.max(self.created_at);
    }

    /// Returns whether the note has been edited since creation.
    pub fn was_edited(&self) -> bool {
        self.updated_at != self.created_at
    }
}

/// RFC 3339 with millisecond precision and a `Z` suffix on write; any RFC 3339
/// offset is accepted on read and normalized to UTC.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(raw.as_str())
            .map(|value| value.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
