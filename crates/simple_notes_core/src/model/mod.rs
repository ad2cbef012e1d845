//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record shared by storage and presentation.
//! - Define the presentation-side draft and its title validation.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - A persisted note never carries a blank title.

pub mod draft;
pub mod note;
