//! Domain model shared by the store, the editor session and the wire layer.
//!
//! # Responsibility
//! - Define the canonical `Note` record as returned by the remote store.
//! - Define the request payloads sent for create/update writes.
//!
//! # Invariants
//! - `NoteId` is assigned remotely and never minted by client code paths
//!   that talk to a real backend.
//! - Timestamps travel as ISO-8601 strings in camelCase fields.

pub mod note;
