//! Client-side note collection.
//!
//! # Responsibility
//! - Own the canonical note list and the current selection.
//! - Fold remote confirmations and failures back into local state.
//!
//! # See also
//! - `remote` for the API contract this layer drives.

pub mod note_store;
