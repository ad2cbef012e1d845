//! Note store use-case layer.
//!
//! # Responsibility
//! - Own the authoritative in-memory collection and the edit target.
//! - Keep presentation code decoupled from storage details.

pub mod clock;
pub mod note_store;
