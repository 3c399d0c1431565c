//! Share links and share dialog state.
//!
//! # Responsibility
//! - Derive public share URLs from note ids.
//! - Track the share dialog and its transient "copied" indicator.
//!
//! # Invariants
//! - Share URLs are purely derived; no share id is issued remotely.
//! - The "copied" indicator resets once its timer elapses.

use crate::editor::debounce::Debouncer;
use crate::model::note::NoteId;
use std::time::Duration;
use tokio::time::Instant;

/// How long the "copied" indicator stays visible.
pub const COPIED_RESET_DELAY: Duration = Duration::from_millis(2000);

/// `origin + "/shared/" + id`
pub fn share_url(origin: &str, id: &NoteId) -> String {
    format!("{}/shared/{}", origin.trim_end_matches('/'), id)
}

/// Open/closed share dialog with its copy indicator.
#[derive(Debug, Clone)]
pub struct ShareDialog {
    origin: String,
    url: Option<String>,
    copied: bool,
    copied_timer: Debouncer,
}

impl ShareDialog {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            url: None,
            copied: false,
            copied_timer: Debouncer::new(COPIED_RESET_DELAY),
        }
    }

    /// Opens the dialog for `id` and returns its link.
    pub fn open(&mut self, id: &NoteId) -> &str {
        self.copied = false;
        self.copied_timer.cancel();
        self.url.insert(share_url(&self.origin, id))
    }

    pub fn close(&mut self) {
        self.url = None;
        self.copied = false;
        self.copied_timer.cancel();
    }

    pub fn is_open(&self) -> bool {
        self.url.is_some()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn is_copied(&self) -> bool {
        self.copied
    }

    /// Marks the link as copied. Returns the link when the dialog is open.
    pub fn mark_copied(&mut self, now: Instant) -> Option<&str> {
        let url = self.url.as_deref()?;
        self.copied = true;
        self.copied_timer.arm(now);
        Some(url)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.copied_timer.deadline()
    }

    /// Clears the indicator once due. Returns `true` when it was cleared.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.copied_timer.fire_if_due(now) {
            self.copied = false;
            return true;
        }
        false
    }
}
