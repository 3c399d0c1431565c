//! Editor-side state.
//!
//! # Responsibility
//! - Own transient edit state for the selected note.
//! - Derive save intents from edits via a trailing-edge debounce.
//!
//! # See also
//! - `store::note_store` for where save intents are persisted.

pub mod debounce;
pub mod session;
