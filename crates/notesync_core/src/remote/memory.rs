//! In-process `NotesApi` fake.
//!
//! # Responsibility
//! - Behave like the REST backend (server-assigned ids and timestamps,
//!   404-style failures for unknown ids) without a network.
//! - Let callers inject failures and latency and inspect issued calls.
//!
//! # Invariants
//! - Cloning yields another handle to the same server state.
//! - Injected failures are consumed in FIFO order per operation.

use crate::model::note::{CreateNoteBody, Note, NoteId, UpdateNoteBody};
use crate::remote::{FetchError, FetchResult, NotesApi, Operation};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use uuid::Uuid;

/// One call received by the fake, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    List,
    Create(CreateNoteBody),
    Update(NoteId, UpdateNoteBody),
    Delete(NoteId),
}

#[derive(Debug, Default)]
struct MemoryState {
    notes: Vec<Note>,
    calls: Vec<RecordedCall>,
    failures: VecDeque<Operation>,
    unavailable: bool,
    latency: Duration,
}

impl MemoryState {
    fn take_failure(&mut self, operation: Operation) -> Option<FetchError> {
        if self.unavailable {
            return Some(FetchError::new(operation, "connection refused"));
        }
        let position = self.failures.iter().position(|op| *op == operation)?;
        self.failures.remove(position);
        Some(FetchError::new(operation, "HTTP 500 Internal Server Error"))
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryNotesApi {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryNotesApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `notes` already stored, in list order.
    pub fn with_notes(notes: Vec<Note>) -> Self {
        let api = Self::new();
        api.guard().notes = notes;
        api
    }

    /// Makes the next call of `operation` fail once.
    pub fn fail_next(&self, operation: Operation) {
        self.guard().failures.push_back(operation);
    }

    /// Makes every call fail until reset, like an unreachable backend.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.guard().unavailable = unavailable;
    }

    /// Delay applied before every response.
    pub fn set_latency(&self, latency: Duration) {
        self.guard().latency = latency;
    }

    /// Server-side view of the collection.
    pub fn stored_notes(&self) -> Vec<Note> {
        self.guard().notes.clone()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.guard().calls.clone()
    }

    pub fn update_calls(&self) -> Vec<(NoteId, UpdateNoteBody)> {
        self.guard()
            .calls
            .iter()
            .filter_map(|call| match call {
                RecordedCall::Update(id, body) => Some((id.clone(), body.clone())),
                _ => None,
            })
            .collect()
    }

    fn guard(&self) -> MutexGuard<'_, MemoryState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Records the call and returns the configured latency.
    fn record(&self, call: RecordedCall) -> Duration {
        let mut state = self.guard();
        state.calls.push(call);
        state.latency
    }
}

async fn wait(latency: Duration) {
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
}

#[async_trait]
impl NotesApi for InMemoryNotesApi {
    async fn list_notes(&self) -> FetchResult<Vec<Note>> {
        wait(self.record(RecordedCall::List)).await;
        let mut state = self.guard();
        if let Some(err) = state.take_failure(Operation::Load) {
            return Err(err);
        }
        Ok(state.notes.clone())
    }

    async fn create_note(&self, body: &CreateNoteBody) -> FetchResult<Note> {
        wait(self.record(RecordedCall::Create(body.clone()))).await;
        let mut state = self.guard();
        if let Some(err) = state.take_failure(Operation::Create) {
            return Err(err);
        }
        let now = Utc::now();
        let note = Note {
            id: NoteId::new(Uuid::new_v4().to_string()),
            title: body.title.clone(),
            content: body.content.clone(),
            created_at: now,
            updated_at: now,
        };
        state.notes.push(note.clone());
        Ok(note)
    }

    async fn update_note(&self, id: &NoteId, body: &UpdateNoteBody) -> FetchResult<Note> {
        wait(self.record(RecordedCall::Update(id.clone(), body.clone()))).await;
        let mut state = self.guard();
        if let Some(err) = state.take_failure(Operation::Update) {
            return Err(err);
        }
        let note = state
            .notes
            .iter_mut()
            .find(|note| &note.id == id)
            .ok_or_else(|| FetchError::new(Operation::Update, "HTTP 404 Not Found"))?;
        note.title = body.title.clone();
        note.content = body.content.clone();
        note.updated_at = Utc::now().max(note.updated_at);
        Ok(note.clone())
    }

    async fn delete_note(&self, id: &NoteId) -> FetchResult<()> {
        wait(self.record(RecordedCall::Delete(id.clone()))).await;
        let mut state = self.guard();
        if let Some(err) = state.take_failure(Operation::Delete) {
            return Err(err);
        }
        let before = state.notes.len();
        state.notes.retain(|note| &note.id != id);
        if state.notes.len() == before {
            return Err(FetchError::new(Operation::Delete, "HTTP 404 Not Found"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{InMemoryNotesApi, RecordedCall};
    use crate::model::note::{CreateNoteBody, NoteDraft, NoteId};
    use crate::remote::{NotesApi, Operation};
    use chrono::Utc;

    #[tokio::test]
    async fn injected_failure_is_consumed_once() {
        let api = InMemoryNotesApi::new();
        api.fail_next(Operation::Load);

        let err = api.list_notes().await.unwrap_err();
        assert_eq!(err.operation(), Operation::Load);
        assert!(api.list_notes().await.unwrap().is_empty());
        assert_eq!(api.calls(), vec![RecordedCall::List, RecordedCall::List]);
    }

    #[tokio::test]
    async fn delete_of_unknown_id_fails() {
        let api = InMemoryNotesApi::new();
        let body = CreateNoteBody::from_draft(NoteDraft::new("a", "b"), Utc::now());
        let created = api.create_note(&body).await.unwrap();

        assert!(api.delete_note(&NoteId::from("missing")).await.is_err());
        api.delete_note(&created.id).await.unwrap();
        assert!(api.stored_notes().is_empty());
    }
}
