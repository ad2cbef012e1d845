//! Note collection persistence.
//!
//! # Responsibility
//! - Own the fixed storage key and the JSON array wire format.
//! - Repair what can be repaired on load and drop the rest.
//!
//! # Invariants
//! - `load` returns unique ids, non-blank titles and
//!   `updated_at >= created_at` for every returned note.
//! - `save` writes the full collection in one `set_item` call.

use crate::model::note::Note;
use crate::storage::{KeyValueStorage, StorageError};
use log::{info, warn};
use serde_json::Value;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key holding the serialized note array.
pub const NOTES_STORAGE_KEY: &str = "notes_app.items";

/// Returns the storage key used for the note collection.
pub fn notes_storage_key() -> &'static str {
    NOTES_STORAGE_KEY
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Write-path failure of the persistence adapter.
#[derive(Debug)]
pub enum RepoError {
    /// Collection could not be encoded as JSON.
    Serialize(serde_json::Error),
    /// Storage backend rejected the write.
    Storage(StorageError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serialize(err) => write!(f, "failed to serialize notes: {err}"),
            Self::Storage(err) => write!(f, "failed to write notes: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Serialize(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

impl From<StorageError> for RepoError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Counters describing what `load` kept and dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub kept: usize,
    pub skipped_malformed: usize,
    pub skipped_blank_title: usize,
    pub skipped_duplicate_id: usize,
    pub clamped_updated_at: usize,
}

impl LoadReport {
    /// Total number of array elements that did not make it into the result.
    pub fn skipped(&self) -> usize {
        self.skipped_malformed + self.skipped_blank_title + self.skipped_duplicate_id
    }
}

/// Reads and writes the note collection in a single storage slot.
pub struct NoteRepository<S: KeyValueStorage> {
    storage: S,
}

impl<S: KeyValueStorage> NoteRepository<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Loads the persisted collection, or an empty one on any failure.
    pub fn load(&self) -> Vec<Note> {
        self.load_with_report().0
    }

    /// Same as [`Self::load`], also reporting repaired and dropped entries.
    pub fn load_with_report(&self) -> (Vec<Note>, LoadReport) {
        let raw = match self.storage.get_item(NOTES_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return (Vec::new(), LoadReport::default()),
            Err(err) => {
                warn!("event=notes_load module=repo status=degraded reason=storage_read_failed error={err}");
                return (Vec::new(), LoadReport::default());
            }
        };

        if raw.trim().is_empty() {
            return (Vec::new(), LoadReport::default());
        }

        let items = match serde_json::from_str::<Value>(raw.as_str()) {
            Ok(Value::Array(items)) => items,
            Ok(_) => {
                warn!("event=notes_load module=repo status=degraded reason=not_an_array bytes={}", raw.len());
                return (Vec::new(), LoadReport::default());
            }
            Err(err) => {
                warn!(
                    "event=notes_load module=repo status=degraded reason=invalid_json bytes={} line={} column={}",
                    raw.len(),
                    err.line(),
                    err.column()
                );
                return (Vec::new(), LoadReport::default());
            }
        };

        let (notes, report) = sanitize_items(items);
        if report.skipped() > 0 || report.clamped_updated_at > 0 {
            warn!(
                "event=notes_load module=repo status=repaired kept={} malformed={} blank_title={} duplicate_id={} clamped={}",
                report.kept,
                report.skipped_malformed,
                report.skipped_blank_title,
                report.skipped_duplicate_id,
                report.clamped_updated_at
            );
        } else {
            info!("event=notes_load module=repo status=ok count={}", report.kept);
        }
        (notes, report)
    }

    /// Serializes the full collection and overwrites the storage slot.
    pub fn save(&mut self, notes: &[Note]) -> RepoResult<()> {
        let payload = serde_json::to_string(notes)?;
        self.storage.set_item(NOTES_STORAGE_KEY, payload.as_str())?;
        info!(
            "event=notes_save module=repo status=ok count={} bytes={}",
            notes.len(),
            payload.len()
        );
        Ok(())
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }
}

fn sanitize_items(items: Vec<Value>) -> (Vec<Note>, LoadReport) {
    let mut report = LoadReport::default();
    let mut seen = HashSet::new();
    let mut notes = Vec::with_capacity(items.len());

    for item in items {
        let mut note = match serde_json::from_value::<Note>(item) {
            Ok(note) => note,
            Err(_) => {
                report.skipped_malformed += 1;
                continue;
            }
        };
        if note.title.trim().is_empty() {
            report.skipped_blank_title += 1;
            continue;
        }
        if !seen.insert(note.id.clone()) {
            report.skipped_duplicate_id += 1;
            continue;
        }
        if note.updated_at < note.created_at {
            note.updated_at = note.created_at;
            report.clamped_updated_at += 1;
        }
        notes.push(note);
    }

    report.kept = notes.len();
    (notes, report)
}
