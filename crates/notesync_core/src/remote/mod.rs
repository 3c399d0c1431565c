//! Remote note store boundary.
//!
//! # Responsibility
//! - Define the `NotesApi` contract consumed by `NoteStore`.
//! - Collapse every remote failure into one `FetchError` per operation.
//!
//! # Invariants
//! - Implementations never mutate client state; they only report what the
//!   remote store confirmed.
//! - No distinction is made between transport, status and decode failures
//!   beyond the diagnostic `detail` string.
//!
//! # See also
//! - `http` for the REST implementation, `memory` for the in-process fake.

use crate::model::note::{CreateNoteBody, Note, NoteId, UpdateNoteBody};
use async_trait::async_trait;
use std::fmt::{Display, Formatter};
use thiserror::Error;

pub mod http;
pub mod memory;

pub use http::HttpNotesApi;
pub use memory::InMemoryNotesApi;

/// Remote operation that can fail with a `FetchError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Load,
    Create,
    Update,
    Delete,
}

impl Operation {
    /// Message shown by the full-screen error state.
    pub fn user_message(self) -> &'static str {
        match self {
            Self::Load => "Failed to load notes. Please check if backend is running.",
            Self::Create => "Failed to create note",
            Self::Update => "Failed to update note",
            Self::Delete => "Failed to delete note",
        }
    }

    /// Stable token used in log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Load => f.write_str("load notes"),
            Self::Create => f.write_str("create note"),
            Self::Update => f.write_str("update note"),
            Self::Delete => f.write_str("delete note"),
        }
    }
}

/// Failure of one remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed")]
pub struct FetchError {
    operation: Operation,
    detail: String,
}

impl FetchError {
    pub fn new(operation: Operation, detail: impl Into<String>) -> Self {
        Self {
            operation,
            detail: detail.into(),
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Diagnostic text for logs and CLI output; the UI shows `user_message`.
    pub fn detail(&self) -> &str {
        self.detail.as_str()
    }

    pub fn user_message(&self) -> &'static str {
        self.operation.user_message()
    }
}

pub type FetchResult<T> = Result<T, FetchError>;

/// REST contract of the remote note store.
#[async_trait]
pub trait NotesApi: Send + Sync {
    /// `GET /api/notes`
    async fn list_notes(&self) -> FetchResult<Vec<Note>>;
    /// `POST /api/notes`
    async fn create_note(&self, body: &CreateNoteBody) -> FetchResult<Note>;
    /// `PUT /api/notes/{id}`
    async fn update_note(&self, id: &NoteId, body: &UpdateNoteBody) -> FetchResult<Note>;
    /// `DELETE /api/notes/{id}`
    async fn delete_note(&self, id: &NoteId) -> FetchResult<()>;
}
