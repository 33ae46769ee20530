use std::collections::HashSet;

use simplenotes::clock::ManualClock;
use simplenotes::note::Note;
use simplenotes::storage::MemoryStorage;
use simplenotes::store::NoteStore;

fn empty_store() -> (NoteStore, MemoryStorage, ManualClock) {
    let storage = MemoryStorage::new();
    let clock = ManualClock::new(1_700_000_000_000);
    let store = NoteStore::load(storage.clone(), clock.clone());
    (store, storage, clock)
}

fn note(id: &str, title: &str, body: &str) -> Note {
    Note {
        id: id.to_string(),
        title: title.to_string(),
        body: body.to_string(),
        created: 1,
        updated: 1,
    }
}

fn store_with(notes: &[Note]) -> (NoteStore, MemoryStorage) {
    let storage = MemoryStorage::with_contents(serde_json::to_vec(notes).unwrap());
    let store = NoteStore::load(storage.clone(), ManualClock::new(10));
    (store, storage)
}

fn ids(notes: &[Note]) -> Vec<&str> {
    notes.iter().map(|n| n.id.as_str()).collect()
}

fn persisted(storage: &MemoryStorage) -> Vec<Note> {
    serde_json::from_slice(&storage.contents().unwrap()).unwrap()
}

#[test]
fn create_update_reorder_search_delete_scenario() {
    let (mut store, storage, clock) = empty_store();

    let created = store.create();
    assert_eq!(store.len(), 1);
    assert_eq!(created.title, "");
    assert_eq!(created.body, "");
    assert_eq!(created.created, created.updated);

    clock.advance(5);
    store.update(&created.id, "Milk", "Buy milk");
    let stored = store.get(&created.id).unwrap().clone();
    assert_eq!(stored.title, "Milk");
    assert_eq!(stored.body, "Buy milk");
    assert!(stored.updated > stored.created);
    assert_eq!(stored.created, created.created);

    store.reorder_to_top(&created.id);
    assert_eq!(store.notes(), &[stored.clone()]);

    let found = store.search("milk");
    assert_eq!(found, vec![stored]);

    store.delete(&created.id);
    assert!(store.is_empty());
    assert_eq!(persisted(&storage), Vec::<Note>::new());
}

#[test]
fn update_in_the_same_millisecond_still_advances_updated() {
    let (mut store, _storage, _clock) = empty_store();
    let created = store.create();
    store.update(&created.id, "a", "");
    let stored = store.get(&created.id).unwrap();
    assert!(stored.updated > stored.created);
}

#[test]
fn create_prepends_and_persists() {
    let (mut store, storage, clock) = empty_store();
    let first = store.create();
    clock.advance(1);
    let second = store.create();
    assert_eq!(ids(store.notes()), vec![second.id.as_str(), first.id.as_str()]);
    assert_eq!(persisted(&storage), store.notes().to_vec());
}

#[test]
fn ids_stay_unique_when_created_in_the_same_millisecond() {
    let (mut store, _storage, _clock) = empty_store();
    for _ in 0..200 {
        store.create();
    }
    let distinct: HashSet<&str> = store.notes().iter().map(|n| n.id.as_str()).collect();
    assert_eq!(distinct.len(), 200);
}

#[test]
fn unknown_ids_leave_collection_and_slot_untouched() {
    let notes = vec![note("a", "one", ""), note("b", "two", "")];
    let (mut store, storage) = store_with(&notes);
    let before = storage.contents();

    store.update("missing", "x", "y");
    store.delete("missing");
    store.reorder_to_top("missing");

    assert_eq!(store.notes(), notes.as_slice());
    assert_eq!(storage.contents(), before);
    assert!(store.get("missing").is_none());
}

#[test]
fn update_keeps_position() {
    let notes = vec![note("a", "one", ""), note("b", "two", ""), note("c", "three", "")];
    let (mut store, _storage) = store_with(&notes);
    store.update("b", "TWO", "changed");
    assert_eq!(ids(store.notes()), vec!["a", "b", "c"]);
    assert_eq!(store.get("b").unwrap().body, "changed");
}

#[test]
fn reorder_to_top_keeps_relative_order_of_the_rest() {
    let notes = vec![
        note("a", "", ""),
        note("b", "", ""),
        note("c", "", ""),
        note("d", "", ""),
    ];
    let (mut store, storage) = store_with(&notes);

    store.reorder_to_top("c");
    assert_eq!(ids(store.notes()), vec!["c", "a", "b", "d"]);
    store.reorder_to_top("d");
    assert_eq!(ids(store.notes()), vec!["d", "c", "a", "b"]);
    store.reorder_to_top("d");
    assert_eq!(ids(store.notes()), vec!["d", "c", "a", "b"]);
    assert_eq!(ids(&persisted(&storage)), vec!["d", "c", "a", "b"]);
}

#[test]
fn search_is_a_case_insensitive_subsequence() {
    let notes = vec![
        note("a", "Groceries", "buy MILK and eggs"),
        note("b", "Work", "quarterly report"),
        note("c", "milkshake recipe", ""),
        note("d", "", "nothing here"),
    ];
    let (store, _storage) = store_with(&notes);

    assert_eq!(ids(&store.search("milk")), vec!["a", "c"]);
    assert_eq!(ids(&store.search("MILK")), vec!["a", "c"]);
    assert_eq!(ids(&store.search("  Report ")), vec!["b"]);
    assert!(store.search("absent").is_empty());

    for term in ["milk", "e", "work", "zz", "here"] {
        let needle = term.to_lowercase();
        let expected: Vec<Note> = notes
            .iter()
            .filter(|n| n.title.to_lowercase().contains(&needle) || n.body.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        assert_eq!(store.search(term), expected, "term {:?}", term);
    }
}

#[test]
fn blank_search_returns_everything_in_order() {
    let notes = vec![note("b", "x", ""), note("a", "y", "")];
    let (store, _storage) = store_with(&notes);
    assert_eq!(store.search(""), notes);
    assert_eq!(store.search("   "), notes);
}

#[test]
fn search_does_not_mutate() {
    let notes = vec![note("a", "x", ""), note("b", "y", "")];
    let (store, storage) = store_with(&notes);
    let before = storage.contents();
    let _ = store.search("y");
    assert_eq!(store.notes(), notes.as_slice());
    assert_eq!(storage.contents(), before);
}

#[test]
fn regex_search_matches_title_or_body() {
    let notes = vec![note("a", "Todo 1", ""), note("b", "x", "todo 22"), note("c", "none", "")];
    let (store, _storage) = store_with(&notes);
    assert_eq!(ids(&store.search_regex(r"(?i)todo \d+").unwrap()), vec!["a", "b"]);
    assert!(store.search_regex("(").is_err());
}

#[test]
fn persisted_collection_round_trips() {
    let (mut store, storage, clock) = empty_store();
    let a = store.create();
    clock.advance(3);
    let b = store.create();
    store.update(&a.id, "Alpha", "first\nsecond");
    store.update(&b.id, "Beta", "");
    store.reorder_to_top(&a.id);

    let reloaded = NoteStore::load(storage.clone(), clock.clone());
    assert_eq!(reloaded.notes(), store.notes());
    assert!(reloaded.load_issue().is_none());
}

#[test]
fn malformed_slot_loads_as_empty() {
    let raws: [&[u8]; 4] = [b"not json", br#"{"id":"a"}"#, b"", b"null"];
    for raw in raws {
        let storage = MemoryStorage::with_contents(raw.to_vec());
        let store = NoteStore::load(storage, ManualClock::new(0));
        assert!(store.is_empty());
        assert!(store.load_issue().is_some());
    }
}

#[test]
fn absent_slot_loads_as_empty_without_issue() {
    let (store, _storage, _clock) = empty_store();
    assert!(store.is_empty());
    assert!(store.load_issue().is_none());
}

#[test]
fn records_with_missing_fields_get_defaults() {
    let storage = MemoryStorage::with_contents(r#"[{"id":"a","title":"only title"}]"#);
    let store = NoteStore::load(storage, ManualClock::new(0));
    let loaded = store.get("a").unwrap();
    assert_eq!(loaded.title, "only title");
    assert_eq!(loaded.body, "");
    assert_eq!(loaded.created, 0);
}

#[test]
fn failed_writes_are_remembered_not_raised() {
    let (mut store, storage, _clock) = empty_store();
    storage.fail_writes(true);
    let created = store.create();
    assert!(store.contains(&created.id));
    assert!(store.persist_error().is_some());
    assert!(store.sync().is_err());

    storage.fail_writes(false);
    store.sync().unwrap();
    assert!(store.persist_error().is_none());
    assert_eq!(persisted(&storage), store.notes().to_vec());
}

#[test]
fn reload_picks_up_external_writes() {
    let (mut store, storage, _clock) = empty_store();
    store.create();
    storage.set(serde_json::to_vec(&vec![note("x", "external", "")]).unwrap());
    store.reload();
    assert_eq!(ids(store.notes()), vec!["x"]);
}

#[test]
fn clear_and_stats() {
    let mut notes = vec![note("a", "", ""), note("b", "", "")];
    notes[0].created = 5;
    notes[0].updated = 50;
    notes[1].created = 2;
    notes[1].updated = 20;
    let (mut store, storage) = store_with(&notes);

    let stats = store.stats();
    assert_eq!(stats.count, 2);
    assert_eq!(stats.oldest_created, Some(2));
    assert_eq!(stats.newest_updated, Some(50));

    store.clear();
    assert!(store.is_empty());
    assert_eq!(store.stats().oldest_created, None);
    assert!(persisted(&storage).is_empty());
}

#[test]
fn update_after_loading_the_largest_timestamp_does_not_overflow() {
    let raw = format!(r#"[{{"id":"a","title":"t","body":"","created":0,"updated":{}}}]"#, i64::MAX);
    let storage = MemoryStorage::with_contents(raw);
    let mut store = NoteStore::load(storage.clone(), ManualClock::new(1_000));
    store.update("a", "x", "y");
    let stored = store.get("a").unwrap();
    assert_eq!(stored.title, "x");
    assert_eq!(stored.updated, i64::MAX);
    assert_eq!(persisted(&storage)[0].body, "y");
}

#[test]
fn null_fields_keep_the_rest_of_the_note() {
    let raw = r#"[{"id":"a","title":null,"body":"keep me","created":1,"updated":2}]"#;
    let storage = MemoryStorage::with_contents(raw);
    let mut store = NoteStore::load(storage.clone(), ManualClock::new(10));
    assert_eq!(store.len(), 1);
    let loaded = store.get("a").unwrap();
    assert_eq!(loaded.display_title(), "(Untitled)");
    assert_eq!(loaded.body, "keep me");

    store.create();
    assert!(persisted(&storage).iter().any(|n| n.id == "a" && n.body == "keep me"));
}
