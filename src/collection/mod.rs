//! In-memory lifecycle of live notes.
//!
//! [`NoteCollection`] owns the authoritative list of open notes and decides
//! when they are written through its [`NoteStore`]. Every mutation requests a
//! debounced save of the full snapshot; closing the last note saves
//! synchronously instead, since nothing will be left to fire the timer.

mod debounce;
mod event;

pub use debounce::{Debouncer, SaveToken, DEFAULT_SAVE_DELAY};
pub use event::{parse_event, run, ExitReason, NoteEvent, UiCommand};

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::entity::{Note, NoteChange, NoteId};
use crate::error::{Result, StickiesError};
use crate::notices::Notice;
use crate::storage::NoteStore;

/// A note currently open in the UI.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveNote {
    pub id: NoteId,
    pub note: Note,
}

/// Result of closing a note.
#[derive(Debug)]
pub enum Closed {
    /// Other notes are still open; a debounced save was requested.
    Remaining(usize),
    /// That was the last note. Holds the result of the final synchronous
    /// save; the application should exit afterwards.
    Last(Result<()>),
}

#[derive(Debug)]
pub struct NoteCollection {
    store: NoteStore,
    notes: Vec<LiveNote>,
    saver: Debouncer,
    completed_saves: u64,
}

impl NoteCollection {
    /// An empty collection. Most callers want [`NoteCollection::initialize`].
    pub fn new(store: NoteStore, save_delay: Duration) -> Self {
        Self {
            store,
            notes: Vec::new(),
            saver: Debouncer::new(save_delay),
            completed_saves: 0,
        }
    }

    /// Restore persisted notes, or spawn a single default note when there
    /// are none. Returns the notices raised while restoring.
    pub fn initialize(store: NoteStore, save_delay: Duration) -> (Self, Vec<Notice>) {
        let restored = store.restore();
        let mut collection = Self::new(store, save_delay);

        collection
            .notes
            .extend(restored.notes.into_iter().map(|note| LiveNote {
                id: NoteId::new(),
                note,
            }));

        if collection.notes.is_empty() {
            collection.spawn_note(None, Instant::now());
        }

        info!(
            count = collection.notes.len(),
            source = ?restored.source,
            "initialized notes"
        );
        (collection, restored.notices)
    }

    /// Open a new note, from `initial` or with fresh defaults.
    pub fn spawn_note(&mut self, initial: Option<Note>, now: Instant) -> NoteId {
        let note = initial
            .map(Note::normalized)
            .unwrap_or_else(Note::spawn_default);
        let id = NoteId::new();
        debug!(%id, x = note.x, y = note.y, "spawned note");
        self.notes.push(LiveNote { id, note });
        self.request_save(now);
        id
    }

    /// Apply a change reported by the UI and request a save.
    pub fn update_note(&mut self, id: NoteId, change: NoteChange, now: Instant) -> Result<()> {
        let live = self
            .notes
            .iter_mut()
            .find(|live| live.id == id)
            .ok_or(StickiesError::NoteNotFound(id))?;
        live.note.apply(change);
        self.request_save(now);
        Ok(())
    }

    /// Remove a closed note. Closing the last note flushes synchronously.
    pub fn close_note(&mut self, id: NoteId, now: Instant) -> Result<Closed> {
        let index = self
            .notes
            .iter()
            .position(|live| live.id == id)
            .ok_or(StickiesError::NoteNotFound(id))?;
        self.notes.remove(index);
        debug!(%id, remaining = self.notes.len(), "closed note");

        if self.notes.is_empty() {
            self.saver.cancel();
            return Ok(Closed::Last(self.save_now()));
        }

        self.request_save(now);
        Ok(Closed::Remaining(self.notes.len()))
    }

    /// Schedule a debounced save, superseding any pending one.
    pub fn request_save(&mut self, now: Instant) {
        self.saver.schedule(now);
    }

    /// Run the pending save if its quiet period has elapsed.
    pub fn poll_save(&mut self, now: Instant) -> Option<Result<()>> {
        let token = self.saver.pending_token()?;
        if !self.saver.fire(token, now) {
            return None;
        }
        Some(self.save_now())
    }

    /// Run the pending save immediately, if there is one.
    pub fn flush(&mut self) -> Option<Result<()>> {
        if self.saver.cancel() {
            Some(self.save_now())
        } else {
            None
        }
    }

    fn save_now(&mut self) -> Result<()> {
        self.store.save(&self.snapshot())?;
        self.completed_saves += 1;
        Ok(())
    }

    pub fn save_deadline(&self) -> Option<Instant> {
        self.saver.deadline()
    }

    pub fn has_pending_save(&self) -> bool {
        self.saver.is_pending()
    }

    pub fn completed_saves(&self) -> u64 {
        self.completed_saves
    }

    /// Current state of every open note, in display order.
    pub fn snapshot(&self) -> Vec<Note> {
        self.notes.iter().map(|live| live.note.clone()).collect()
    }

    pub fn notes(&self) -> &[LiveNote] {
        &self.notes
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes
            .iter()
            .find(|live| live.id == id)
            .map(|live| &live.note)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn store(&self) -> &NoteStore {
        &self.store
    }
}
