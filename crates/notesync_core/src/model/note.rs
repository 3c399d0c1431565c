//! Note domain model and write payloads.
//!
//! # Responsibility
//! - Define the persisted `Note` shape and its JSON mapping.
//! - Provide the draft/patch inputs used by create and update intents.
//! - Own the empty-title normalization rule.
//!
//! # Invariants
//! - `id` is opaque; numeric ids from the backend are kept as their decimal
//!   string form.
//! - A blank title is stored as `"Untitled"`; any other title is stored
//!   exactly as typed.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};

/// Title stored in place of an empty or whitespace-only title.
pub const UNTITLED: &str = "Untitled";

/// Title used for notes created from the "new note" action.
pub const NEW_NOTE_TITLE: &str = "New Note";

/// Opaque identifier assigned by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for NoteId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // The backend keys notes by a database `Long`.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(value) => Self(value),
            RawId::Signed(value) => Self(value.to_string()),
            RawId::Unsigned(value) => Self(value.to_string()),
        })
    }
}

/// One persisted document as confirmed by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// User input for a create intent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Draft produced by the sidebar "new note" action.
    pub fn untitled_new() -> Self {
        Self::new(NEW_NOTE_TITLE, "")
    }
}

/// Full replacement of the editable fields of one note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub title: String,
    pub content: String,
}

impl NotePatch {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// POST body for note creation. Timestamps are stamped at intent time; the
/// server response stays authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteBody {
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CreateNoteBody {
    pub fn from_draft(draft: NoteDraft, now: DateTime<Utc>) -> Self {
        Self {
            title: normalize_title(draft.title),
            content: draft.content,
            created_at: now,
            updated_at: now,
        }
    }
}

/// PUT body for note updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteBody {
    pub title: String,
    pub content: String,
    pub updated_at: DateTime<Utc>,
}

impl UpdateNoteBody {
    pub fn from_patch(patch: NotePatch, now: DateTime<Utc>) -> Self {
        Self {
            title: normalize_title(patch.title),
            content: patch.content,
            updated_at: now,
        }
    }
}

/// Replaces a blank title with `"Untitled"`.
///
/// Non-blank titles are returned untouched, surrounding whitespace included.
pub fn normalize_title(title: impl Into<String>) -> String {
    let title = title.into();
    if title.trim().is_empty() {
        UNTITLED.to_string()
    } else {
        title
    }
}

/// Accepts RFC 3339 timestamps and offset-less ISO-8601 local date-times,
/// the latter read as UTC.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|err| serde::de::Error::custom(format!("invalid timestamp `{raw}`: {err}")))
}
