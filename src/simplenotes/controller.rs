use std::collections::VecDeque;
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::note::{Note, TITLE_MAX_CHARS};
use crate::store::NoteStore;
use crate::utils::truncate_chars;

/// Simulated latency between a save request and its commit.
pub const SAVE_DELAY: Duration = Duration::from_millis(150);

pub const DELETE_PROMPT: &str = "Delete this note?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Body,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    /// draft mirrors the stored note
    Clean(Note),
    /// draft has edits not yet committed
    Dirty(Note),
}

impl Selection {
    pub fn draft(&self) -> Option<&Note> {
        match *self {
            Selection::None => None,
            Selection::Clean(ref n) | Selection::Dirty(ref n) => Some(n),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.draft().map(|n| n.id.as_str())
    }

    pub fn is_dirty(&self) -> bool {
        matches!(*self, Selection::Dirty(_))
    }
}

/// Blocking yes/no question put to the user before destructive actions.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// A save waiting for its delay to pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSave {
    pub id: String,
    pub title: String,
    pub body: String,
    pub due: Instant,
}

pub struct Controller {
    store: NoteStore,
    selection: Selection,
    pending: VecDeque<PendingSave>,
    search: String,
}

impl Controller {
    pub fn new(store: NoteStore) -> Controller {
        let mut controller = Controller {
            store: store,
            selection: Selection::None,
            pending: VecDeque::new(),
            search: String::new(),
        };
        controller.reconcile();
        controller
    }

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn draft(&self) -> Option<&Note> {
        self.selection.draft()
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selection.id()
    }

    /// true while at least one save has not been committed
    pub fn saving(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_saves(&self) -> impl Iterator<Item = &PendingSave> {
        self.pending.iter()
    }

    /// Saving is refused while a save is in flight, and for a draft whose
    /// title and body are both blank.
    pub fn can_save(&self) -> bool {
        match self.draft() {
            Some(d) => !self.saving() && !(d.title.trim().is_empty() && d.body.trim().is_empty()),
            None => false,
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, term: &str) {
        self.search = term.to_string();
    }

    /// the sidebar contents: the collection filtered by the search term
    pub fn visible_notes(&self) -> Vec<Note> {
        self.store.search(&self.search)
    }

    pub fn select_note(&mut self, id: &str) {
        self.selection = match self.store.get(id) {
            Some(note) => Selection::Clean(note.clone()),
            None => Selection::None,
        };
        debug!("event=select id={} found={}", id, self.selection.draft().is_some());
    }

    pub fn add_note(&mut self) -> Note {
        let note = self.store.create();
        self.selection = Selection::Clean(note.clone());
        info!("event=note_add id={}", note.id);
        self.reconcile();
        note
    }

    /// Change one field of the draft. Returns false when nothing is selected.
    pub fn edit_field(&mut self, field: Field, value: &str) -> bool {
        let mut draft = match self.selection.draft() {
            Some(d) => d.clone(),
            None => return false,
        };
        match field {
            Field::Title => draft.title = truncate_chars(value, TITLE_MAX_CHARS),
            Field::Body => draft.body = value.to_string(),
        }
        self.selection = Selection::Dirty(draft);
        true
    }

    /// Schedule the draft to be committed at `now + SAVE_DELAY`. Returns
    /// false when there is no draft to save.
    pub fn save(&mut self, now: Instant) -> bool {
        let draft = match self.selection {
            Selection::Clean(ref mut d) | Selection::Dirty(ref mut d) if !d.id.is_empty() => d,
            _ => return false,
        };
        draft.title = draft.title.trim().to_string();
        let save = PendingSave {
            id: draft.id.clone(),
            title: draft.title.clone(),
            body: draft.body.clone(),
            due: now + SAVE_DELAY,
        };
        debug!("event=save_scheduled id={} in_flight={}", save.id, self.pending.len() + 1);
        self.pending.push_back(save);
        true
    }

    /// Commit every save due at `now`, oldest first. Returns how many were
    /// committed.
    pub fn tick(&mut self, now: Instant) -> usize {
        let mut committed = 0;
        while self.pending.front().map_or(false, |s| s.due <= now) {
            if let Some(save) = self.pending.pop_front() {
                if self.commit(save) {
                    committed += 1;
                }
            }
        }
        if committed > 0 {
            self.reconcile();
        }
        committed
    }

    /// Commit every pending save regardless of its delay.
    pub fn flush(&mut self) -> usize {
        let mut committed = 0;
        while let Some(save) = self.pending.pop_front() {
            if self.commit(save) {
                committed += 1;
            }
        }
        if committed > 0 {
            self.reconcile();
        }
        committed
    }

    fn commit(&mut self, save: PendingSave) -> bool {
        if !self.store.contains(&save.id) {
            info!("event=save_dropped id={} reason=note_gone", save.id);
            return false;
        }
        self.store.update(&save.id, &save.title, &save.body);
        self.store.reorder_to_top(&save.id);
        info!("event=save_committed id={}", save.id);

        let refreshed = match self.selection.draft() {
            Some(d) if d.id == save.id => self.store
                                              .get(&save.id)
                                              .filter(|s| s.title == d.title && s.body == d.body)
                                              .cloned(),
            _ => None,
        };
        if let Some(stored) = refreshed {
            self.selection = Selection::Clean(stored);
        }
        true
    }

    /// Ask `confirm`, then delete `id`. Returns whether a note was removed.
    pub fn delete_note(&mut self, id: &str, confirm: &mut dyn Confirm) -> bool {
        if !self.store.contains(id) {
            return false;
        }
        if !confirm.confirm(DELETE_PROMPT) {
            debug!("event=note_delete status=declined id={}", id);
            return false;
        }
        self.store.delete(id);
        self.pending.retain(|s| s.id != id);
        if self.selected_id() == Some(id) {
            self.selection = Selection::None;
        }
        info!("event=note_delete id={}", id);
        self.reconcile();
        true
    }

    /// Re-read the slot, picking up changes made by someone else.
    pub fn reload(&mut self) {
        self.store.reload();
        self.reconcile();
    }

    /// Run `f` against the store directly, then reconcile the selection.
    pub fn with_store<F, T>(&mut self, f: F) -> T
        where F: FnOnce(&mut NoteStore) -> T
    {
        let result = f(&mut self.store);
        self.reconcile();
        result
    }

    /// Drop a selection whose note is gone, and select the first note when
    /// nothing is selected.
    pub fn reconcile(&mut self) {
        if let Some(id) = self.selection.id() {
            if !self.store.contains(id) {
                debug!("event=selection_cleared id={}", id);
                self.selection = Selection::None;
            }
        }
        if let Selection::None = self.selection {
            if let Some(first) = self.store.notes().first() {
                self.selection = Selection::Clean(first.clone());
            }
        }
    }
}
