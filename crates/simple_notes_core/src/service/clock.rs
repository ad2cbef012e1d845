//! Injectable time and id sources.
//!
//! # Invariants
//! - `SystemClock` yields millisecond precision so in-memory timestamps equal
//!   their persisted round-trip.

use crate::model::note::NoteId;
use chrono::{DateTime, SubsecRound, Utc};
use uuid::Uuid;

/// Source of "now" for note timestamps.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time, truncated to milliseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(3)
    }
}

/// Source of fresh note ids.
pub trait IdGenerator {
    fn next_id(&mut self) -> NoteId;
}

/// Random v4 UUID ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&mut self) -> NoteId {
        NoteId::new(Uuid::new_v4().to_string())
    }
}
