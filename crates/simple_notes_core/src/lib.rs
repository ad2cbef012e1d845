//! Core domain logic for Simple Notes.
//! This crate is the single source of truth for note invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod storage;

pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::draft::{DraftError, NoteDraft, SaveRequest};
pub use model::note::{Note, NoteId};
pub use repo::note_repo::{
    notes_storage_key, LoadReport, NoteRepository, RepoError, RepoResult, NOTES_STORAGE_KEY,
};
pub use service::clock::{Clock, IdGenerator, SystemClock, UuidIdGenerator};
pub use service::note_store::{
    ConfirmDelete, DeleteOutcome, EditState, NoteStore, StoreError, StoreEvent, StoreResult,
};
pub use storage::{KeyValueStorage, MemoryStorage, SqliteStorage, StorageError, StorageResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
