use std::collections::HashSet;

use log::{debug, error, info, warn};
use rand::Rng;
use regex::Regex;
use serde_json::Value;

use crate::clock::Clock;
use crate::errors::Result;
use crate::note::Note;
use crate::storage::Storage;

const ID_SUFFIX_LEN: usize = 4;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Summary numbers for `info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreStats {
    pub count: usize,
    pub oldest_created: Option<i64>,
    pub newest_updated: Option<i64>,
}

pub struct NoteStore {
    notes: Vec<Note>,
    storage: Box<dyn Storage>,
    clock: Box<dyn Clock>,
    load_issue: Option<String>,
    persist_error: Option<String>,
}

impl NoteStore {
    /// Read the collection from `storage`. An absent slot is an empty
    /// collection, and so is one that cannot be read or parsed.
    pub fn load<S, C>(storage: S, clock: C) -> NoteStore
        where S: Storage + 'static,
              C: Clock + 'static
    {
        let mut store = NoteStore {
            notes: vec![],
            storage: Box::new(storage),
            clock: Box::new(clock),
            load_issue: None,
            persist_error: None,
        };
        store.reload();
        store
    }

    /// Replace the in-memory collection with what the slot holds now.
    pub fn reload(&mut self) {
        let (notes, issue) = match self.storage.read() {
            Ok(Some(bytes)) => decode_collection(&bytes),
            Ok(None) => (vec![], None),
            Err(e) => (vec![], Some(format!("failed to read {}: {}", self.storage.describe(), e))),
        };
        if let Some(ref reason) = issue {
            warn!("event=slot_load status=discarded slot={} reason={}",
                  self.storage.describe(), reason);
        }
        info!("event=slot_load slot={} notes={}", self.storage.describe(), notes.len());
        self.notes = notes;
        self.load_issue = issue;
    }

    /// why the last load fell back to an empty collection, if it did
    pub fn load_issue(&self) -> Option<&str> {
        self.load_issue.as_deref()
    }

    /// why the last write failed, if it did
    pub fn persist_error(&self) -> Option<&str> {
        self.persist_error.as_deref()
    }

    pub fn describe(&self) -> String {
        self.storage.describe()
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.notes.iter().position(|n| n.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    /// Create an empty note at the front of the collection.
    pub fn create(&mut self) -> Note {
        let now = self.clock.now_millis();
        let note = Note {
            id: self.fresh_id(now),
            title: String::new(),
            body: String::new(),
            created: now,
            updated: now,
        };
        self.notes.insert(0, note.clone());
        debug!("event=note_create id={}", note.id);
        self.persist();
        note
    }

    /// Replace title and body of `id`, leaving its position alone.
    pub fn update(&mut self, id: &str, title: &str, body: &str) {
        let now = self.clock.now_millis();
        let note = match self.notes.iter_mut().find(|n| n.id == id) {
            Some(n) => n,
            None => {
                debug!("event=note_update status=unknown_id id={}", id);
                return;
            }
        };
        note.title = title.to_string();
        note.body = body.to_string();
        // a same-millisecond update still moves forward
        note.updated = now.max(note.updated.saturating_add(1));
        debug!("event=note_update id={}", id);
        self.persist();
    }

    pub fn delete(&mut self, id: &str) {
        match self.position(id) {
            Some(pos) => {
                self.notes.remove(pos);
                debug!("event=note_delete id={}", id);
                self.persist();
            }
            None => debug!("event=note_delete status=unknown_id id={}", id),
        }
    }

    /// Move `id` to the front, keeping everyone else in order.
    pub fn reorder_to_top(&mut self, id: &str) {
        match self.position(id) {
            Some(0) => {}
            Some(pos) => {
                let note = self.notes.remove(pos);
                self.notes.insert(0, note);
                self.persist();
            }
            None => debug!("event=note_reorder status=unknown_id id={}", id),
        }
    }

    /// Notes whose title or body contains `term`, ignoring case, in
    /// collection order. A blank term matches everything.
    pub fn search(&self, term: &str) -> Vec<Note> {
        let term = term.trim();
        if term.is_empty() {
            return self.notes.clone();
        }
        let needle = term.to_lowercase();
        self.notes.iter().filter(|n| n.matches(&needle)).cloned().collect()
    }

    /// Like [`NoteStore::search`] with a regular expression.
    pub fn search_regex(&self, pattern: &str) -> Result<Vec<Note>> {
        let re = Regex::new(pattern)?;
        Ok(self.notes
               .iter()
               .filter(|n| re.is_match(&n.title) || re.is_match(&n.body))
               .cloned()
               .collect())
    }

    /// remove every note
    pub fn clear(&mut self) {
        self.notes.clear();
        self.persist();
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            count: self.notes.len(),
            oldest_created: self.notes.iter().map(|n| n.created).min(),
            newest_updated: self.notes.iter().map(|n| n.updated).max(),
        }
    }

    /// Write the collection again and report failure to the caller.
    pub fn sync(&mut self) -> Result<()> {
        let result = self.write_slot();
        self.persist_error = result.as_ref().err().map(|e| e.to_string());
        result
    }

    fn write_slot(&mut self) -> Result<()> {
        let bytes = serde_json::to_vec(&self.notes)?;
        self.storage.write(&bytes)
    }

    fn persist(&mut self) {
        match self.write_slot() {
            Ok(()) => self.persist_error = None,
            Err(e) => {
                error!("event=slot_write status=failed slot={} error={}",
                       self.storage.describe(), e);
                self.persist_error = Some(e.to_string());
            }
        }
    }

    fn fresh_id(&self, now: i64) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let mut id = to_base36(now.max(0) as u64);
            for _ in 0..ID_SUFFIX_LEN {
                id.push(BASE36[rng.gen_range(0..BASE36.len())] as char);
            }
            if !self.contains(&id) {
                return id;
            }
        }
    }
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = vec![];
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Parse slot bytes. Records that are not note objects, lack an id, or
/// repeat an earlier id are skipped.
fn decode_collection(bytes: &[u8]) -> (Vec<Note>, Option<String>) {
    let records = match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Array(records)) => records,
        Ok(_) => return (vec![], Some("slot does not hold a JSON array".to_string())),
        Err(e) => return (vec![], Some(format!("unparsable slot: {}", e))),
    };

    let mut seen = HashSet::new();
    let mut notes = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<Note>(record) {
            Ok(note) if note.id.is_empty() => {
                warn!("event=slot_load status=skipped index={} reason=missing_id", index);
            }
            Ok(note) => {
                if seen.insert(note.id.clone()) {
                    notes.push(note);
                } else {
                    warn!("event=slot_load status=skipped index={} reason=duplicate_id id={}",
                          index, note.id);
                }
            }
            Err(e) => warn!("event=slot_load status=skipped index={} reason={}", index, e),
        }
    }
    (notes, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base36_matches_known_values() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_700_000_000_000), "loyw3v28");
    }

    #[test]
    fn non_array_slot_is_discarded() {
        let (notes, issue) = decode_collection(br#"{"id":"a"}"#);
        assert!(notes.is_empty());
        assert!(issue.is_some());
    }

    #[test]
    fn only_records_without_a_usable_id_are_skipped() {
        let raw = br#"[{"id":"a","title":"one"},{"title":"no id"},42,{"id":"a","title":"dup"},{"id":"b","title":7},{"id":null,"body":"x"}]"#;
        let (notes, issue) = decode_collection(raw);
        assert!(issue.is_none());
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].title, "one");
        assert_eq!(notes[1].id, "b");
        assert_eq!(notes[1].title, "7");
    }
}
