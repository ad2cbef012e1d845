//! Form-side draft of a note and its validation gate.

use crate::model::note::Note;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validated payload accepted by `NoteStore::save`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    /// Trimmed, non-empty title.
    pub title: String,
    /// Body exactly as typed.
    pub body: String,
}

/// Unvalidated title/body pair as edited by the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub body: String,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Blank form used when no note is being edited.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Hydrates the form from the note entering edit mode.
    pub fn from_note(note: &Note) -> Self {
        Self::new(note.title.clone(), note.body.clone())
    }

    /// Checks the title and produces a save request.
    ///
    /// The title is trimmed; the body is passed through untouched.
    pub fn validate(&self) -> Result<SaveRequest, DraftError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(DraftError::TitleRequired);
        }
        Ok(SaveRequest {
            title: title.to_string(),
            body: self.body.clone(),
        })
    }
}

/// Draft validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftError {
    TitleRequired,
}

impl Display for DraftError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TitleRequired => write!(f, "Title is required."),
        }
    }
}

impl Error for DraftError {}
