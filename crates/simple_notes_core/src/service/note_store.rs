//! In-memory note store with write-through persistence.
//!
//! # Responsibility
//! - Apply create/update/delete with timestamping.
//! - Track which note is being edited (`Idle` / `Editing(id)`).
//! - Derive the recency-ordered view handed to presentation.
//! - Write the full collection through to storage after every mutation.
//!
//! # Invariants
//! - At most one note per id.
//! - The edit target, when set, names a note in the collection.
//! - A failed write-through never rolls back or corrupts in-memory state.

use crate::model::draft::SaveRequest;
use crate::model::note::{Note, NoteId};
use crate::repo::note_repo::{NoteRepository, RepoError};
use crate::service::clock::{Clock, IdGenerator, SystemClock, UuidIdGenerator};
use crate::storage::KeyValueStorage;
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

const MAX_ID_ATTEMPTS: usize = 16;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store operation failure.
#[derive(Debug)]
pub enum StoreError {
    /// The mutation was applied in memory but could not be persisted.
    Persist(RepoError),
    /// The id generator kept returning ids already in use.
    IdCollision(NoteId),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Persist(err) => write!(f, "{err}"),
            Self::IdCollision(id) => write!(f, "could not allocate a unique note id (last: {id})"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persist(err) => Some(err),
            Self::IdCollision(_) => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Persist(value)
    }
}

/// Edit-mode state machine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditState {
    #[default]
    Idle,
    Editing(NoteId),
}

impl EditState {
    pub fn target(&self) -> Option<&NoteId> {
        match self {
            Self::Idle => None,
            Self::Editing(id) => Some(id),
        }
    }

    pub fn is_editing(&self, id: &NoteId) -> bool {
        self.target() == Some(id)
    }
}

/// Status signal emitted after each store operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Added { id: NoteId, title: String },
    Updated { id: NoteId, title: String },
    EditStarted { id: NoteId, title: String },
    EditCanceled,
    /// `removed` is `false` when the id was not in the collection.
    Deleted { id: NoteId, removed: bool },
}

impl StoreEvent {
    /// Short announcement text for a live status region.
    pub fn message(&self) -> String {
        match self {
            Self::Added { .. } => "Note added.".to_string(),
            Self::Updated { .. } => "Note updated.".to_string(),
            Self::EditStarted { title, .. } => format!("Editing note: {title}"),
            Self::EditCanceled => "Edit canceled.".to_string(),
            Self::Deleted { .. } => "Note deleted.".to_string(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Added { .. } => "added",
            Self::Updated { .. } => "updated",
            Self::EditStarted { .. } => "edit_started",
            Self::EditCanceled => "edit_canceled",
            Self::Deleted { .. } => "deleted",
        }
    }
}

/// Yes/no confirmation the presentation layer provides before a delete.
pub trait ConfirmDelete {
    fn confirm_delete(&mut self, note: &Note) -> bool;
}

impl<F> ConfirmDelete for F
where
    F: FnMut(&Note) -> bool,
{
    fn confirm_delete(&mut self, note: &Note) -> bool {
        self(note)
    }
}

/// Result of a confirmed delete request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The user declined; nothing changed and nothing was written.
    Declined,
    Deleted(StoreEvent),
}

/// Authoritative note collection for one session.
pub struct NoteStore<S: KeyValueStorage> {
    repo: NoteRepository<S>,
    notes: Vec<Note>,
    edit_state: EditState,
    status: Option<String>,
    clock: Box<dyn Clock>,
    ids: Box<dyn IdGenerator>,
}

impl<S: KeyValueStorage> NoteStore<S> {
    /// Loads the persisted collection using wall-clock time and UUID ids.
    pub fn open(repo: NoteRepository<S>) -> Self {
        Self::with_sources(repo, Box::new(SystemClock), Box::new(UuidIdGenerator))
    }

    /// Loads the persisted collection with caller-provided time and id sources.
    pub fn with_sources(
        repo: NoteRepository<S>,
        clock: Box<dyn Clock>,
        ids: Box<dyn IdGenerator>,
    ) -> Self {
        let notes = repo.load();
        debug!("event=store_open module=store status=ok count={}", notes.len());
        Self {
            repo,
            notes,
            edit_state: EditState::Idle,
            status: None,
            clock,
            ids,
        }
    }

    /// Creates a note, or updates the edit target when one is set.
    ///
    /// The request is trusted: title validation happens in `NoteDraft`.
    /// Clears the edit target and writes through in both cases.
    pub fn save(&mut self, request: SaveRequest) -> StoreResult<StoreEvent> {
        let SaveRequest { title, body } = request;
        let now = self.clock.now();
        let target = self
            .edit_state
            .target()
            .and_then(|id| self.position_of(id));

        let event = match target {
            Some(index) => {
                let note = &mut self.notes[index];
                note.apply_edit(title, body, now);
                StoreEvent::Updated {
                    id: note.id.clone(),
                    title: note.title.clone(),
                }
            }
            None => {
                let id = self.fresh_id()?;
                let note = Note::new(id.clone(), title, body, now);
                let event = StoreEvent::Added {
                    id,
                    title: note.title.clone(),
                };
                self.notes.insert(0, note);
                event
            }
        };

        self.edit_state = EditState::Idle;
        self.commit(event)
    }

    /// Enters edit mode for `id`. Unknown ids are ignored.
    pub fn begin_edit(&mut self, id: &NoteId) -> Option<StoreEvent> {
        let title = self.get(id)?.title.clone();
        self.edit_state = EditState::Editing(id.clone());
        Some(self.announce(StoreEvent::EditStarted {
            id: id.clone(),
            title,
        }))
    }

    /// Leaves edit mode unconditionally.
    pub fn cancel_edit(&mut self) -> StoreEvent {
        self.edit_state = EditState::Idle;
        self.announce(StoreEvent::EditCanceled)
    }

    /// Removes `id` if present, then writes through.
    ///
    /// Callers are expected to have obtained user confirmation; see
    /// [`Self::confirm_and_delete`].
    pub fn delete(&mut self, id: &NoteId) -> StoreResult<StoreEvent> {
        let before = self.notes.len();
        self.notes.retain(|note| &note.id != id);
        let removed = self.notes.len() != before;

        if self.edit_state.is_editing(id) {
            self.edit_state = EditState::Idle;
        }

        self.commit(StoreEvent::Deleted {
            id: id.clone(),
            removed,
        })
    }

    /// Asks `confirm` before deleting an existing note.
    ///
    /// Unknown ids skip the prompt and go straight to [`Self::delete`].
    pub fn confirm_and_delete<C>(
        &mut self,
        id: &NoteId,
        confirm: &mut C,
    ) -> StoreResult<DeleteOutcome>
    where
        C: ConfirmDelete + ?Sized,
    {
        if let Some(note) = self.get(id) {
            if !confirm.confirm_delete(note) {
                debug!("event=note_delete module=store status=declined");
                return Ok(DeleteOutcome::Declined);
            }
        }
        self.delete(id).map(DeleteOutcome::Deleted)
    }

    /// Copy of the collection ordered by `updated_at` descending.
    ///
    /// Ties keep their persisted relative order.
    pub fn derived_view(&self) -> Vec<Note> {
        let mut view = self.notes.clone();
        view.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        view
    }

    /// Collection in persisted order.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn get(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| &note.id == id)
    }

    pub fn edit_state(&self) -> &EditState {
        &self.edit_state
    }

    pub fn editing_id(&self) -> Option<&NoteId> {
        self.edit_state.target()
    }

    /// Note currently loaded into the form, if any.
    pub fn editing_note(&self) -> Option<&Note> {
        self.editing_id().and_then(|id| self.get(id))
    }

    /// Message of the most recent status signal.
    pub fn status_message(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn repository(&self) -> &NoteRepository<S> {
        &self.repo
    }

    /// Ends the session and hands back the persistence adapter.
    pub fn into_repository(self) -> NoteRepository<S> {
        self.repo
    }

    fn position_of(&self, id: &NoteId) -> Option<usize> {
        self.notes.iter().position(|note| &note.id == id)
    }

    fn fresh_id(&mut self) -> StoreResult<NoteId> {
        let mut attempts = 1;
        let mut candidate = self.ids.next_id();
        while self.position_of(&candidate).is_some() {
            if attempts == MAX_ID_ATTEMPTS {
                error!("event=note_save module=store status=error error_code=id_collision attempts={attempts}");
                return Err(StoreError::IdCollision(candidate));
            }
            candidate = self.ids.next_id();
            attempts += 1;
        }
        Ok(candidate)
    }

    fn announce(&mut self, event: StoreEvent) -> StoreEvent {
        self.status = Some(event.message());
        event
    }

    fn commit(&mut self, event: StoreEvent) -> StoreResult<StoreEvent> {
        let event = self.announce(event);
        if let Err(err) = self.repo.save(&self.notes) {
            error!(
                "event=write_through module=store status=error kind={} count={} error={err}",
                event.kind(),
                self.notes.len()
            );
            return Err(StoreError::Persist(err));
        }
        info!(
            "event=write_through module=store status=ok kind={} count={}",
            event.kind(),
            self.notes.len()
        );
        Ok(event)
    }
}
