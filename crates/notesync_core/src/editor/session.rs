//! Editor working buffer with dirty tracking and debounced autosave.
//!
//! # Responsibility
//! - Hold a private copy of the selected note's title/content.
//! - Turn keystroke-level edits into at most one save intent per quiet
//!   period, or immediately on explicit save.
//! - Reconcile the buffer with confirmed notes coming back from the store.
//!
//! # Invariants
//! - At most one debounce deadline is pending.
//! - Selection changes discard unsynced edits unconditionally.
//! - A failed save leaves the buffer and the dirty flag untouched; edits
//!   survive in memory only.
//! - A confirmation is adopted only when no edit happened after the save it
//!   answers was issued.

use crate::editor::debounce::Debouncer;
use crate::model::note::{normalize_title, Note, NoteId, NotePatch};
use log::debug;
use std::time::Duration;
use tokio::time::Instant;

/// Editable field of the working buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Content,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    /// No note selected.
    Empty,
    /// Buffer mirrors the last confirmed note.
    Clean,
    /// Buffer holds edits not yet confirmed by the remote store.
    Dirty,
}

/// Request to persist the working buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveIntent {
    pub note_id: NoteId,
    pub patch: NotePatch,
    /// Buffer revision captured when the intent was issued.
    pub revision: u64,
}

#[derive(Debug, Clone)]
pub struct EditSession {
    note_id: Option<NoteId>,
    title: String,
    content: String,
    dirty: bool,
    revision: u64,
    in_flight: Option<u64>,
    debounce: Debouncer,
}

impl EditSession {
    pub fn new(autosave_delay: Duration) -> Self {
        Self {
            note_id: None,
            title: String::new(),
            content: String::new(),
            dirty: false,
            revision: 0,
            in_flight: None,
            debounce: Debouncer::new(autosave_delay),
        }
    }

    pub fn state(&self) -> EditState {
        match (&self.note_id, self.dirty) {
            (None, _) => EditState::Empty,
            (Some(_), false) => EditState::Clean,
            (Some(_), true) => EditState::Dirty,
        }
    }

    pub fn note_id(&self) -> Option<&NoteId> {
        self.note_id.as_ref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether a save intent is awaiting its confirmation.
    pub fn is_saving(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    /// Resets the buffer from `note`, cancelling any pending autosave.
    pub fn load(&mut self, note: Option<&Note>) {
        if self.dirty {
            debug!(
                "event=edits_discarded module=editor status=ok note_id={}",
                self.note_id
                    .as_ref()
                    .map(NoteId::as_str)
                    .unwrap_or("none")
            );
        }
        self.debounce.cancel();
        self.dirty = false;
        self.in_flight = None;
        match note {
            Some(note) => {
                self.note_id = Some(note.id.clone());
                self.title = note.title.clone();
                self.content = note.content.clone();
            }
            None => {
                self.note_id = None;
                self.title.clear();
                self.content.clear();
            }
        }
    }

    /// Applies one edit and restarts the quiet period.
    ///
    /// Returns `false` when no note is selected.
    pub fn on_field_change(&mut self, field: Field, value: impl Into<String>, now: Instant) -> bool {
        if self.note_id.is_none() {
            return false;
        }
        match field {
            Field::Title => self.title = value.into(),
            Field::Content => self.content = value.into(),
        }
        self.dirty = true;
        self.revision += 1;
        self.debounce.arm(now);
        true
    }

    /// Saves immediately when dirty.
    pub fn on_explicit_save(&mut self) -> Option<SaveIntent> {
        self.debounce.cancel();
        self.issue_intent()
    }

    /// Fires the autosave once the quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<SaveIntent> {
        if self.debounce.fire_if_due(now) {
            self.issue_intent()
        } else {
            None
        }
    }

    /// Adopts a confirmed note. Returns `true` when the buffer was replaced.
    pub fn confirm(&mut self, note: &Note, revision: u64) -> bool {
        if self.note_id.as_ref() != Some(&note.id) {
            return false;
        }
        if self.in_flight == Some(revision) {
            self.in_flight = None;
        }
        if revision != self.revision {
            // Edits made after the save was issued stay in the buffer.
            return false;
        }
        self.title = note.title.clone();
        self.content = note.content.clone();
        self.dirty = false;
        true
    }

    /// Records a failed save. The buffer stays dirty for a manual retry.
    pub fn fail(&mut self, note_id: &NoteId, revision: u64) {
        self.release(note_id, revision);
    }

    /// Forgets the in-flight save of `revision` without touching the buffer.
    pub fn release(&mut self, note_id: &NoteId, revision: u64) {
        if self.note_id.as_ref() == Some(note_id) && self.in_flight == Some(revision) {
            self.in_flight = None;
        }
    }

    /// Cancels the pending autosave, if any.
    pub fn close(&mut self) {
        self.debounce.cancel();
    }

    fn issue_intent(&mut self) -> Option<SaveIntent> {
        let note_id = self.note_id.clone()?;
        if !self.dirty || self.in_flight == Some(self.revision) {
            return None;
        }
        self.in_flight = Some(self.revision);
        Some(SaveIntent {
            note_id,
            patch: NotePatch::new(normalize_title(self.title.as_str()), self.content.clone()),
            revision: self.revision,
        })
    }
}
