use chrono::{DateTime, Duration, Utc};
use simple_notes_core::{
    Clock, DeleteOutcome, EditState, IdGenerator, KeyValueStorage, MemoryStorage, Note, NoteDraft,
    NoteId, NoteRepository, NoteStore, SaveRequest, StorageError, StorageResult, StoreError,
    StoreEvent, NOTES_STORAGE_KEY,
};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

#[derive(Clone)]
struct ManualClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl ManualClock {
    fn starting_at(raw: &str) -> Self {
        let start = DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc);
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    fn advance(&self, millis: i64) {
        self.now.set(self.now.get() + Duration::milliseconds(millis));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

struct SequentialIds {
    next: u32,
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> NoteId {
        self.next += 1;
        NoteId::new(format!("note-{}", self.next))
    }
}

struct ConstantIds;

impl IdGenerator for ConstantIds {
    fn next_id(&mut self) -> NoteId {
        NoteId::new("same")
    }
}

/// Accepts reads, rejects every write.
struct QuotaExceededStorage;

impl KeyValueStorage for QuotaExceededStorage {
    fn get_item(&self, _key: &str) -> StorageResult<Option<String>> {
        Ok(None)
    }

    fn set_item(&mut self, _key: &str, _value: &str) -> StorageResult<()> {
        Err(StorageError::Unavailable("quota exceeded".to_string()))
    }
}

fn store_with(storage: MemoryStorage, clock: &ManualClock) -> NoteStore<MemoryStorage> {
    NoteStore::with_sources(
        NoteRepository::new(storage),
        Box::new(clock.clone()),
        Box::new(SequentialIds { next: 0 }),
    )
}

fn request(title: &str, body: &str) -> SaveRequest {
    NoteDraft::new(title, body).validate().unwrap()
}

fn persisted(store: &NoteStore<MemoryStorage>) -> Vec<Note> {
    let raw = store
        .repository()
        .storage()
        .get_item(NOTES_STORAGE_KEY)
        .unwrap()
        .expect("collection should have been written");
    serde_json::from_str(&raw).unwrap()
}

#[test]
fn save_without_edit_target_creates_note() {
    let clock = ManualClock::starting_at("2024-05-01T09:00:00Z");
    let mut store = store_with(MemoryStorage::new(), &clock);

    let event = store.save(request("Groceries", "Milk")).unwrap();

    assert!(matches!(event, StoreEvent::Added { ref title, .. } if title == "Groceries"));
    assert_eq!(store.len(), 1);
    let note = &store.notes()[0];
    assert_eq!(note.title, "Groceries");
    assert_eq!(note.body, "Milk");
    assert_eq!(note.created_at, note.updated_at);
    assert_eq!(store.editing_id(), None);
    assert_eq!(store.status_message(), Some("Note added."));
    assert_eq!(persisted(&store), store.notes());
}

#[test]
fn new_notes_are_prepended() {
    let clock = ManualClock::starting_at("2024-05-01T09:00:00Z");
    let mut store = store_with(MemoryStorage::new(), &clock);

    store.save(request("first", "")).unwrap();
    clock.advance(10);
    store.save(request("second", "")).unwrap();

    let titles: Vec<_> = store.notes().iter().map(|n| n.title.as_str()).collect();
    assert_eq!(titles, vec!["second", "first"]);
}

#[test]
fn save_with_edit_target_updates_in_place() {
    let clock = ManualClock::starting_at("2024-05-01T09:00:00Z");
    let mut store = store_with(MemoryStorage::new(), &clock);
    store.save(request("Groceries", "Milk")).unwrap();
    clock.advance(5);
    store.save(request("Ideas", "")).unwrap();
    let id1 = store.notes()[1].id.clone();
    let original = store.get(&id1).unwrap().clone();

    let started = store.begin_edit(&id1).expect("note exists");
    assert_eq!(store.status_message(), Some("Editing note: Groceries"));
    assert!(matches!(started, StoreEvent::EditStarted { ref id, .. } if id == &id1));
    clock.advance(60_000);
    let event = store.save(request("Groceries v2", "Milk, eggs")).unwrap();

    assert!(matches!(event, StoreEvent::Updated { ref id, .. } if id == &id1));
    assert_eq!(store.len(), 2);
    assert_eq!(store.notes()[1].id, id1);
    let updated = store.get(&id1).unwrap();
    assert_eq!(updated.title, "Groceries v2");
    assert_eq!(updated.body, "Milk, eggs");
    assert_eq!(updated.created_at, original.created_at);
    assert!(updated.updated_at > original.updated_at);
    assert!(updated.was_edited());
    assert_eq!(store.edit_state(), &EditState::Idle);
    assert_eq!(store.status_message(), Some("Note updated."));
    assert_eq!(persisted(&store), store.notes());
}

#[test]
fn update_keeps_updated_at_after_created_at_when_clock_goes_back() {
    let clock = ManualClock::starting_at("2024-05-01T09:00:00Z");
    let mut store = store_with(MemoryStorage::new(), &clock);
    store.save(request("a", "")).unwrap();
    let id = store.notes()[0].id.clone();

    store.begin_edit(&id).unwrap();
    clock.advance(-3_600_000);
    store.save(request("b", "")).unwrap();

    let note = store.get(&id).unwrap();
    assert!(note.updated_at >= note.created_at);
}

#[test]
fn begin_edit_on_unknown_id_is_a_no_op() {
    let clock = ManualClock::starting_at("2024-05-01T09:00:00Z");
    let mut store = store_with(MemoryStorage::new(), &clock);
    store.save(request("a", "")).unwrap();

    assert_eq!(store.begin_edit(&NoteId::new("missing")), None);
    assert_eq!(store.edit_state(), &EditState::Idle);
    assert_eq!(store.editing_note(), None);
    assert_eq!(store.status_message(), Some("Note added."));
}

#[test]
fn cancel_edit_returns_to_idle_and_next_save_creates() {
    let clock = ManualClock::starting_at("2024-05-01T09:00:00Z");
    let mut store = store_with(MemoryStorage::new(), &clock);
    store.save(request("a", "")).unwrap();
    let id = store.notes()[0].id.clone();

    store.begin_edit(&id).unwrap();
    assert_eq!(store.editing_note().map(|n| n.title.as_str()), Some("a"));
    assert_eq!(store.cancel_edit(), StoreEvent::EditCanceled);
    assert_eq!(store.editing_id(), None);
    assert_eq!(store.status_message(), Some("Edit canceled."));

    store.save(request("b", "")).unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(store.get(&id).unwrap().title, "a");
}

#[test]
fn deleting_the_edit_target_clears_it() {
    let clock = ManualClock::starting_at("2024-05-01T09:00:00Z");
    let mut store = store_with(MemoryStorage::new(), &clock);
    store.save(request("Groceries", "Milk")).unwrap();
    let id1 = store.notes()[0].id.clone();

    store.begin_edit(&id1).unwrap();
    let event = store.delete(&id1).unwrap();

    assert_eq!(
        event,
        StoreEvent::Deleted {
            id: id1.clone(),
            removed: true
        }
    );
    assert!(store.is_empty());
    assert_eq!(store.editing_id(), None);
    assert_eq!(store.status_message(), Some("Note deleted."));
    assert!(persisted(&store).is_empty());
}

#[test]
fn deleting_another_note_keeps_edit_target() {
    let clock = ManualClock::starting_at("2024-05-01T09:00:00Z");
    let mut store = store_with(MemoryStorage::new(), &clock);
    store.save(request("keep", "")).unwrap();
    store.save(request("drop", "")).unwrap();
    let keep = store.notes()[1].id.clone();
    let drop = store.notes()[0].id.clone();

    store.begin_edit(&keep).unwrap();
    store.delete(&drop).unwrap();

    assert_eq!(store.edit_state(), &EditState::Editing(keep));
    assert_eq!(store.len(), 1);
}

#[test]
fn deleting_missing_id_still_writes_through() {
    let clock = ManualClock::starting_at("2024-05-01T09:00:00Z");
    let mut store = store_with(MemoryStorage::new(), &clock);
    assert!(store.repository().storage().is_empty());

    let event = store.delete(&NoteId::new("ghost")).unwrap();

    assert!(matches!(event, StoreEvent::Deleted { removed: false, .. }));
    assert!(store.is_empty());
    assert_eq!(
        store
            .repository()
            .storage()
            .get_item(NOTES_STORAGE_KEY)
            .unwrap()
            .as_deref(),
        Some("[]")
    );
    assert_eq!(store.status_message(), Some("Note deleted."));
}

#[test]
fn declined_confirmation_leaves_everything_untouched() {
    let clock = ManualClock::starting_at("2024-05-01T09:00:00Z");
    let mut store = store_with(MemoryStorage::new(), &clock);
    store.save(request("Precious", "")).unwrap();
    let id = store.notes()[0].id.clone();
    let before = persisted(&store);
    let asked = RefCell::new(Vec::new());

    let mut decline = |note: &Note| {
        asked.borrow_mut().push(note.title.clone());
        false
    };
    let outcome = store.confirm_and_delete(&id, &mut decline).unwrap();

    assert_eq!(outcome, DeleteOutcome::Declined);
    assert_eq!(asked.borrow().as_slice(), ["Precious".to_string()]);
    assert_eq!(store.len(), 1);
    assert_eq!(persisted(&store), before);
    assert_eq!(store.status_message(), Some("Note added."));
}

#[test]
fn accepted_confirmation_deletes() {
    let clock = ManualClock::starting_at("2024-05-01T09:00:00Z");
    let mut store = store_with(MemoryStorage::new(), &clock);
    store.save(request("Old", "")).unwrap();
    let id = store.notes()[0].id.clone();

    let mut accept = |_: &Note| true;
    let outcome = store.confirm_and_delete(&id, &mut accept).unwrap();

    assert!(matches!(
        outcome,
        DeleteOutcome::Deleted(StoreEvent::Deleted { removed: true, .. })
    ));
    assert!(store.is_empty());
}

#[test]
fn confirmation_is_skipped_for_unknown_ids() {
    let clock = ManualClock::starting_at("2024-05-01T09:00:00Z");
    let mut store = store_with(MemoryStorage::new(), &clock);
    let mut calls = 0;

    let mut count = |_: &Note| {
        calls += 1;
        false
    };
    let outcome = store
        .confirm_and_delete(&NoteId::new("ghost"), &mut count)
        .unwrap();

    assert!(matches!(
        outcome,
        DeleteOutcome::Deleted(StoreEvent::Deleted { removed: false, .. })
    ));
    assert_eq!(calls, 0);
}

#[test]
fn derived_view_orders_by_updated_at_and_is_stable_on_ties() {
    let clock = ManualClock::starting_at("2024-05-01T09:00:00Z");
    let mut store = store_with(MemoryStorage::new(), &clock);
    store.save(request("a", "")).unwrap();
    store.save(request("b", "")).unwrap();
    store.save(request("c", "")).unwrap();

    let tied: Vec<_> = store
        .derived_view()
        .into_iter()
        .map(|n| n.title)
        .collect();
    assert_eq!(tied, vec!["c", "b", "a"]);

    let a = store.notes()[2].id.clone();
    store.begin_edit(&a).unwrap();
    clock.advance(1);
    store.save(request("a2", "")).unwrap();

    let view: Vec<_> = store
        .derived_view()
        .into_iter()
        .map(|n| n.title)
        .collect();
    assert_eq!(view, vec!["a2", "c", "b"]);
    let persisted_order: Vec<_> = store.notes().iter().map(|n| n.title.as_str()).collect();
    assert_eq!(persisted_order, vec!["c", "b", "a2"]);
}

#[test]
fn write_failure_surfaces_error_but_keeps_memory_state() {
    let clock = ManualClock::starting_at("2024-05-01T09:00:00Z");
    let mut store = NoteStore::with_sources(
        NoteRepository::new(QuotaExceededStorage),
        Box::new(clock.clone()),
        Box::new(SequentialIds { next: 0 }),
    );

    let err = store.save(request("Big", "x")).unwrap_err();

    assert!(matches!(err, StoreError::Persist(_)));
    assert!(err.to_string().contains("quota exceeded"));
    assert_eq!(store.len(), 1);
    assert_eq!(store.notes()[0].title, "Big");
    assert_eq!(store.editing_id(), None);

    let id = store.notes()[0].id.clone();
    assert!(store.delete(&id).is_err());
    assert!(store.is_empty());
}

#[test]
fn colliding_ids_are_rejected_without_mutation() {
    let clock = ManualClock::starting_at("2024-05-01T09:00:00Z");
    let mut store = NoteStore::with_sources(
        NoteRepository::new(MemoryStorage::new()),
        Box::new(clock.clone()),
        Box::new(ConstantIds),
    );

    store.save(request("first", "")).unwrap();
    let err = store.save(request("second", "")).unwrap_err();

    assert!(matches!(err, StoreError::IdCollision(ref id) if id.as_str() == "same"));
    assert_eq!(store.len(), 1);
    assert_eq!(persisted(&store).len(), 1);
}

#[test]
fn reopened_store_sees_previous_session() {
    let clock = ManualClock::starting_at("2024-05-01T09:00:00Z");
    let mut store = store_with(MemoryStorage::new(), &clock);
    store.save(request("Groceries", "Milk")).unwrap();
    clock.advance(1_000);
    store.save(request("Ideas", "")).unwrap();
    let before = store.notes().to_vec();

    let storage = store.into_repository().into_storage();
    let reopened = store_with(storage, &clock);

    assert_eq!(reopened.notes(), before.as_slice());
    assert_eq!(reopened.edit_state(), &EditState::Idle);
    assert_eq!(reopened.status_message(), None);
}

#[test]
fn invariants_hold_across_mixed_operation_sequences() {
    let clock = ManualClock::starting_at("2024-05-01T09:00:00Z");
    let mut store = store_with(MemoryStorage::new(), &clock);
    // Small LCG keeps the sequence deterministic.
    let mut seed: u64 = 0x5eed;
    let mut next = move || {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (seed >> 33) as usize
    };

    for step in 0..400 {
        clock.advance((next() % 3) as i64);
        let size_before = store.len();
        let editing_before = store.editing_id().cloned();
        let pick = |store: &NoteStore<MemoryStorage>, roll: usize| {
            if store.is_empty() || roll % 5 == 0 {
                NoteId::new(format!("missing-{roll}"))
            } else {
                store.notes()[roll % store.len()].id.clone()
            }
        };

        match next() % 4 {
            0 => {
                let was_editing = editing_before
                    .as_ref()
                    .map_or(false, |id| store.get(id).is_some());
                store.save(request(&format!("title {step}"), "")).unwrap();
                let expected = if was_editing { size_before } else { size_before + 1 };
                assert_eq!(store.len(), expected);
            }
            1 => {
                let id = pick(&store, next());
                let existed = store.get(&id).is_some();
                store.delete(&id).unwrap();
                assert_eq!(store.len(), size_before - usize::from(existed));
                if editing_before.as_ref() == Some(&id) {
                    assert_eq!(store.editing_id(), None);
                } else {
                    assert_eq!(store.editing_id(), editing_before.as_ref());
                }
            }
            2 => {
                let id = pick(&store, next());
                let exists = store.get(&id).is_some();
                let event = store.begin_edit(&id);
                assert_eq!(event.is_some(), exists);
            }
            _ => {
                store.cancel_edit();
                assert_eq!(store.editing_id(), None);
            }
        }

        let ids: HashSet<_> = store.notes().iter().map(|n| n.id.clone()).collect();
        assert_eq!(ids.len(), store.len());
        assert!(store.notes().iter().all(|n| n.updated_at >= n.created_at));
        assert!(store.notes().iter().all(|n| !n.title.trim().is_empty()));
        if let Some(id) = store.editing_id() {
            assert!(store.get(id).is_some());
        }
        let view = store.derived_view();
        assert!(view.windows(2).all(|w| w[0].updated_at >= w[1].updated_at));
    }

    assert_eq!(persisted(&store), store.notes());
}
