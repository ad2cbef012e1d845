//! Edit-form submission: hydrate, overlay the given fields, validate.

use anyhow::{anyhow, Result};
use log::warn;
use simple_notes_core::{
    KeyValueStorage, Note, NoteDraft, NoteId, NoteStore, SaveRequest, StoreEvent,
};

/// Builds a save request from `current`, replacing only the given fields.
pub fn edit_request(
    current: &Note,
    title: Option<String>,
    body: Option<String>,
) -> Result<SaveRequest, simple_notes_core::DraftError> {
    let mut draft = NoteDraft::from_note(current);
    if let Some(title) = title {
        draft.title = title;
    }
    if let Some(body) = body {
        draft.body = body;
    }
    draft.validate()
}

/// Runs one edit session against `store`.
///
/// A rejected draft leaves edit mode, so the store is never left `Editing`.
pub fn submit_edit<S: KeyValueStorage>(
    store: &mut NoteStore<S>,
    id: &NoteId,
    title: Option<String>,
    body: Option<String>,
) -> Result<StoreEvent> {
    if store.begin_edit(id).is_none() {
        warn!("event=note_edit module=cli status=error error_code=unknown_id");
        return Err(anyhow!("no note with id `{id}`"));
    }
    let request = match store.editing_note().map(|note| edit_request(note, title, body)) {
        Some(Ok(request)) => request,
        Some(Err(err)) => {
            store.cancel_edit();
            warn!("event=note_edit module=cli status=rejected error_code=title_required");
            return Err(err.into());
        }
        None => {
            store.cancel_edit();
            return Err(anyhow!("no note with id `{id}`"));
        }
    };
    Ok(store.save(request)?)
}
