//! Core of the notes client.
//! This crate owns the client-side note collection, the editor session and
//! the remote API boundary; presentation layers only report intents.

pub mod app;
pub mod config;
pub mod editor;
pub mod logging;
pub mod model;
pub mod remote;
pub mod share;
pub mod store;
pub mod view;

pub use app::{run_event_loop, AppEvent, Completion, Intent, NotesApp, Request};
pub use config::{ClientConfig, ConfigError};
pub use editor::session::{EditSession, EditState, Field, SaveIntent};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget, LoggingError};
pub use model::note::{
    normalize_title, CreateNoteBody, Note, NoteDraft, NoteId, NotePatch, UpdateNoteBody,
    NEW_NOTE_TITLE, UNTITLED,
};
pub use remote::memory::RecordedCall;
pub use remote::{FetchError, FetchResult, HttpNotesApi, InMemoryNotesApi, NotesApi, Operation};
pub use share::{share_url, ShareDialog};
pub use store::note_store::{NoteStore, PendingUpdate, UpdateOutcome};
pub use view::{format_editor_date, format_list_date, preview, EditorStats};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
