//! Parent composition of store, editor session and share dialog.
//!
//! # Responsibility
//! - Translate user intents into store/session transitions and remote
//!   requests.
//! - Fold request completions back into the store first, then flow the
//!   resulting note down into the editor session.
//! - Publish `AppEvent`s for the view layer.
//!
//! # Invariants
//! - The session buffer is reset on every selection change, including
//!   selection changes caused by create and delete.
//! - The session never learns about a note the store did not confirm.
//! - `Saved` is published only for update responses the store applied.
//! - Only one load request is in flight at a time.
//!
//! # See also
//! - `event_loop` for the single-threaded driver.

use crate::config::{ClientConfig, ConfigError};
use crate::editor::session::{EditSession, Field, SaveIntent};
use crate::model::note::{Note, NoteDraft, NoteId};
use crate::remote::{FetchError, NotesApi, Operation};
use crate::share::ShareDialog;
use crate::store::note_store::{NoteStore, UpdateOutcome};
use log::debug;
use std::mem;
use tokio::time::Instant;

pub mod event_loop;

pub use event_loop::{run_event_loop, Completion, Request};

/// User action reported by the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Load,
    Retry,
    Create(NoteDraft),
    Select(Option<NoteId>),
    Edit(Field, String),
    /// Appends one line to the content buffer.
    AppendLine(String),
    Save,
    Delete(NoteId),
    OpenShare,
    CloseShare,
    CopyShareLink,
    Shutdown,
}

/// State change worth rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Loaded { count: usize },
    Created(Note),
    Selected(Option<NoteId>),
    SaveIssued { note_id: NoteId, revision: u64 },
    Saved(Note),
    Deleted(NoteId),
    ShareOpened(String),
    ShareCopied(String),
    ShareCopyReset,
    Failed { operation: Operation, message: String },
}

pub struct NotesApp<A: NotesApi> {
    store: NoteStore<A>,
    session: EditSession,
    share: ShareDialog,
    outbox: Vec<AppEvent>,
}

impl<A: NotesApi> NotesApp<A> {
    pub fn new(api: A, config: &ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            store: NoteStore::new(api),
            session: EditSession::new(config.autosave_delay()),
            share: ShareDialog::new(config.share_origin()?),
            outbox: Vec::new(),
        })
    }

    pub fn store(&self) -> &NoteStore<A> {
        &self.store
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn share(&self) -> &ShareDialog {
        &self.share
    }

    /// Drains events produced since the last call.
    pub fn take_events(&mut self) -> Vec<AppEvent> {
        mem::take(&mut self.outbox)
    }

    /// Earliest pending timer across the session and the share dialog.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.session.next_deadline(), self.share.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Applies one intent; returns the remote request it requires, if any.
    pub fn handle(&mut self, intent: Intent, now: Instant) -> Option<Request> {
        match intent {
            Intent::Load => self.start_load(),
            Intent::Retry => {
                self.store.clear_error();
                self.start_load()
            }
            Intent::Create(draft) => Some(Request::Create(self.store.prepare_create(draft))),
            Intent::Select(id) => {
                self.select(id.as_ref());
                None
            }
            Intent::Edit(field, value) => {
                self.session.on_field_change(field, value, now);
                None
            }
            Intent::AppendLine(line) => {
                let content = if self.session.content().is_empty() {
                    line
                } else {
                    format!("{}\n{}", self.session.content(), line)
                };
                self.session.on_field_change(Field::Content, content, now);
                None
            }
            Intent::Save => self
                .session
                .on_explicit_save()
                .map(|intent| self.update_request(intent)),
            Intent::Delete(id) => Some(Request::Delete(id)),
            Intent::OpenShare => {
                let id = self.store.selected_id()?.clone();
                let url = self.share.open(&id).to_string();
                self.outbox.push(AppEvent::ShareOpened(url));
                None
            }
            Intent::CloseShare => {
                self.share.close();
                None
            }
            Intent::CopyShareLink => {
                if let Some(url) = self.share.mark_copied(now) {
                    let url = url.to_string();
                    self.outbox.push(AppEvent::ShareCopied(url));
                }
                None
            }
            Intent::Shutdown => {
                self.shutdown();
                None
            }
        }
    }

    /// Fires due timers; returns the autosave request, if one fired.
    pub fn on_timer(&mut self, now: Instant) -> Option<Request> {
        if self.share.poll(now) {
            self.outbox.push(AppEvent::ShareCopyReset);
        }
        self.session
            .poll(now)
            .map(|intent| self.update_request(intent))
    }

    /// Folds one finished request into the store, then the session.
    pub fn complete(&mut self, completion: Completion) {
        match completion {
            Completion::Loaded(result) => match self.store.finish_load(result) {
                Ok(notes) => {
                    let same_note = self.session.note_id() == self.store.selected_id();
                    if !same_note || !self.session.is_dirty() {
                        self.session.load(self.store.selected());
                    }
                    self.outbox.push(AppEvent::Loaded { count: notes.len() });
                }
                Err(err) => self.push_failure(&err),
            },
            Completion::Created(result) => match self.store.finish_create(result) {
                Ok(note) => {
                    self.session.load(self.store.selected());
                    let id = note.id.clone();
                    self.outbox.push(AppEvent::Created(note));
                    self.outbox.push(AppEvent::Selected(Some(id)));
                }
                Err(err) => self.push_failure(&err),
            },
            Completion::Updated {
                pending,
                revision,
                result,
            } => match self.store.finish_update(&pending, result) {
                Ok(UpdateOutcome::Applied(note)) => {
                    self.session.confirm(&note, revision);
                    self.outbox.push(AppEvent::Saved(note));
                }
                Ok(UpdateOutcome::Stale(_) | UpdateOutcome::Orphaned(_)) => {
                    self.session.release(&pending.id, revision);
                }
                Err(err) => {
                    self.session.fail(&pending.id, revision);
                    self.push_failure(&err);
                }
            },
            Completion::Deleted { id, result } => match self.store.finish_remove(&id, result) {
                Ok(()) => {
                    if self.session.note_id() == Some(&id) {
                        self.session.load(None);
                        self.outbox.push(AppEvent::Selected(None));
                    }
                    self.outbox.push(AppEvent::Deleted(id));
                }
                Err(err) => self.push_failure(&err),
            },
        }
    }

    /// Cancels timers and closes the share dialog.
    pub fn shutdown(&mut self) {
        self.session.close();
        self.share.close();
    }

    /// At most one load is in flight; a repeated request joins it.
    fn start_load(&mut self) -> Option<Request> {
        if self.store.is_loading() {
            debug!("event=notes_load module=app status=skipped reason=in_flight");
            return None;
        }
        self.store.begin_load();
        Some(Request::Load)
    }

    fn select(&mut self, id: Option<&NoteId>) {
        self.store.select(id);
        self.session.load(self.store.selected());
        self.outbox
            .push(AppEvent::Selected(self.store.selected_id().cloned()));
    }

    fn update_request(&mut self, intent: SaveIntent) -> Request {
        let pending = self.store.prepare_update(&intent.note_id, intent.patch);
        self.outbox.push(AppEvent::SaveIssued {
            note_id: intent.note_id,
            revision: intent.revision,
        });
        Request::Update {
            pending,
            revision: intent.revision,
        }
    }

    fn push_failure(&mut self, err: &FetchError) {
        self.outbox.push(AppEvent::Failed {
            operation: err.operation(),
            message: err.user_message().to_string(),
        });
    }
}
