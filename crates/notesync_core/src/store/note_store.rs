//! Authoritative note collection synchronized with the remote store.
//!
//! # Responsibility
//! - Provide load/create/update/remove/select use-cases over `NotesApi`.
//! - Keep a store-scoped error message for the full-screen error state.
//! - Offer split-phase variants so an event loop can keep several requests
//!   in flight while only completions mutate the store.
//!
//! # Invariants
//! - Writes are confirm-then-apply: nothing changes before the remote store
//!   acknowledges, and a failure leaves the last-known-good collection.
//! - Note ids are unique within the collection.
//! - Created notes are prepended; no other reordering ever happens.
//! - An update response older than one already applied for the same note
//!   is dropped.
//! - Selection is an id; it never points at a note outside the collection.

use crate::model::note::{CreateNoteBody, Note, NoteDraft, NoteId, NotePatch, UpdateNoteBody};
use crate::remote::{FetchError, FetchResult, NotesApi};
use chrono::Utc;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::Arc;

/// Update request issued but not yet confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpdate {
    /// Store-wide issue order; larger is newer.
    pub seq: u64,
    pub id: NoteId,
    pub body: UpdateNoteBody,
}

/// How a confirmed update response was folded into the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Replaced the collection entry.
    Applied(Note),
    /// Older than a response already applied for the same note; dropped.
    Stale(Note),
    /// The note left the collection while the request was in flight.
    Orphaned(Note),
}

impl UpdateOutcome {
    /// The note as confirmed by the server, applied or not.
    pub fn into_note(self) -> Note {
        match self {
            Self::Applied(note) | Self::Stale(note) | Self::Orphaned(note) => note,
        }
    }
}

pub struct NoteStore<A: NotesApi> {
    api: Arc<A>,
    notes: Vec<Note>,
    selected: Option<NoteId>,
    loading: bool,
    error: Option<String>,
    next_seq: u64,
    applied_seq: HashMap<NoteId, u64>,
}

impl<A: NotesApi> NoteStore<A> {
    /// Creates an empty store over `api`. Nothing is fetched until
    /// `load_all` runs.
    pub fn new(api: A) -> Self {
        Self {
            api: Arc::new(api),
            notes: Vec::new(),
            selected: None,
            loading: false,
            error: None,
            next_seq: 1,
            applied_seq: HashMap::new(),
        }
    }

    pub fn api(&self) -> &A {
        self.api.as_ref()
    }

    /// Shared handle for issuing requests outside a `&mut self` borrow.
    pub fn api_handle(&self) -> Arc<A> {
        Arc::clone(&self.api)
    }

    /// Notes in display order, most recently created first.
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

    pub fn selected(&self) -> Option<&Note> {
        self.selected.as_ref().and_then(|id| self.get(id))
    }

    pub fn selected_id(&self) -> Option<&NoteId> {
        self.selected.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// User-facing message of the last failure, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Replaces the collection with the remote list.
    pub async fn load_all(&mut self) -> FetchResult<Vec<Note>> {
        self.begin_load();
        let result = self.api.list_notes().await;
        self.finish_load(result)
    }

    /// Clears the error state and reloads.
    pub async fn retry(&mut self) -> FetchResult<Vec<Note>> {
        self.clear_error();
        self.load_all().await
    }

    pub fn begin_load(&mut self) {
        self.loading = true;
        debug!("event=notes_load module=store status=start");
    }

    pub fn finish_load(&mut self, result: FetchResult<Vec<Note>>) -> FetchResult<Vec<Note>> {
        self.loading = false;
        let notes = result.map_err(|err| self.record_failure(err))?;

        self.notes = dedupe_by_id(notes);
        // Sequence numbers outlive reloads so late responses stay ordered.
        let notes = &self.notes;
        self.applied_seq.retain(|id, _| notes.iter().any(|note| &note.id == id));
        self.error = None;
        if let Some(selected) = self.selected.take() {
            if self.get(&selected).is_some() {
                self.selected = Some(selected);
            }
        }
        info!(
            "event=notes_load module=store status=ok count={}",
            self.notes.len()
        );
        Ok(self.notes.clone())
    }

    /// Creates a note remotely, then prepends and selects it.
    pub async fn create(&mut self, draft: NoteDraft) -> FetchResult<Note> {
        let body = self.prepare_create(draft);
        let result = self.api.create_note(&body).await;
        self.finish_create(result)
    }

    /// Builds the POST body with client-side timestamps.
    pub fn prepare_create(&self, draft: NoteDraft) -> CreateNoteBody {
        CreateNoteBody::from_draft(draft, Utc::now())
    }

    pub fn finish_create(&mut self, result: FetchResult<Note>) -> FetchResult<Note> {
        let note = result.map_err(|err| self.record_failure(err))?;

        self.notes.retain(|existing| existing.id != note.id);
        self.notes.insert(0, note.clone());
        self.selected = Some(note.id.clone());
        info!(
            "event=note_create module=store status=ok note_id={} count={}",
            note.id,
            self.notes.len()
        );
        Ok(note)
    }

    /// Saves `patch` remotely and applies the confirmed note in place.
    ///
    /// Returns the server's confirmed note even when it was not applied.
    pub async fn update(&mut self, id: &NoteId, patch: NotePatch) -> FetchResult<Note> {
        let pending = self.prepare_update(id, patch);
        let result = self.api.update_note(&pending.id, &pending.body).await;
        self.finish_update(&pending, result).map(UpdateOutcome::into_note)
    }

    /// Stamps `updatedAt` and assigns the request sequence number.
    pub fn prepare_update(&mut self, id: &NoteId, patch: NotePatch) -> PendingUpdate {
        let seq = self.next_seq;
        self.next_seq += 1;
        PendingUpdate {
            seq,
            id: id.clone(),
            body: UpdateNoteBody::from_patch(patch, Utc::now()),
        }
    }

    pub fn finish_update(
        &mut self,
        pending: &PendingUpdate,
        result: FetchResult<Note>,
    ) -> FetchResult<UpdateOutcome> {
        let note = result.map_err(|err| self.record_failure(err))?;

        let last_applied = self.applied_seq.get(&pending.id).copied().unwrap_or(0);
        if pending.seq <= last_applied {
            debug!(
                "event=note_update module=store status=stale note_id={} seq={} applied_seq={}",
                pending.id, pending.seq, last_applied
            );
            return Ok(UpdateOutcome::Stale(note));
        }

        match self.notes.iter_mut().find(|existing| existing.id == pending.id) {
            Some(entry) => {
                *entry = note.clone();
                self.applied_seq.insert(pending.id.clone(), pending.seq);
                info!(
                    "event=note_update module=store status=ok note_id={} seq={}",
                    pending.id, pending.seq
                );
                Ok(UpdateOutcome::Applied(note))
            }
            None => {
                debug!(
                    "event=note_update module=store status=orphaned note_id={}",
                    pending.id
                );
                Ok(UpdateOutcome::Orphaned(note))
            }
        }
    }

    /// Deletes remotely, then drops the entry and clears its selection.
    pub async fn remove(&mut self, id: &NoteId) -> FetchResult<()> {
        let result = self.api.delete_note(id).await;
        self.finish_remove(id, result)
    }

    pub fn finish_remove(&mut self, id: &NoteId, result: FetchResult<()>) -> FetchResult<()> {
        result.map_err(|err| self.record_failure(err))?;

        self.notes.retain(|note| &note.id != id);
        self.applied_seq.remove(id);
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        info!(
            "event=note_delete module=store status=ok note_id={} count={}",
            id,
            self.notes.len()
        );
        Ok(())
    }

    /// Changes the selection. Unknown ids select nothing.
    pub fn select(&mut self, id: Option<&NoteId>) -> Option<&Note> {
        self.selected = match id {
            Some(id) if self.get(id).is_some() => Some(id.clone()),
            Some(id) => {
                warn!("event=note_select module=store status=unknown note_id={id}");
                None
            }
            None => None,
        };
        self.selected()
    }

    fn record_failure(&mut self, err: FetchError) -> FetchError {
        warn!(
            "event=remote_call module=store status=error op={} detail={}",
            err.operation().as_str(),
            err.detail()
        );
        self.error = Some(err.user_message().to_string());
        err
    }
}

fn dedupe_by_id(notes: Vec<Note>) -> Vec<Note> {
    let mut seen = std::collections::HashSet::with_capacity(notes.len());
    notes
        .into_iter()
        .filter(|note| seen.insert(note.id.clone()))
        .collect()
}
