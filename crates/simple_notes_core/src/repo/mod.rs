//! Persistence adapter over a key-value storage slot.
//!
//! # Responsibility
//! - Serialize the whole note collection into one storage slot.
//! - Read it back defensively, degrading to an empty collection.
//!
//! # Invariants
//! - Every save fully replaces the previously persisted collection.
//! - Loading never fails; bad data is dropped, never surfaced.

pub mod note_repo;
