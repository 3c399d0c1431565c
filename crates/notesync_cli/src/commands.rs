//! One-shot subcommands driven directly through `NoteStore`.

use anyhow::{anyhow, Result};
use chrono::Local;
use notesync_core::{
    format_editor_date, format_list_date, preview, share_url, ClientConfig, EditorStats,
    FetchError, HttpNotesApi, Note, NoteDraft, NoteId, NoteStore, NEW_NOTE_TITLE,
};

const ID_WIDTH: usize = 8;
const TITLE_WIDTH: usize = 28;

pub async fn list(api: HttpNotesApi) -> Result<()> {
    let mut store = NoteStore::new(api);
    let notes = store.load_all().await.map_err(fetch_failed)?;
    if notes.is_empty() {
        println!("No notes yet");
        return Ok(());
    }

    let now = Local::now();
    for note in &notes {
        println!(
            "{:<id_width$} {:<title_width$} {:>10}  {}",
            note.id.as_str(),
            clip(&note.title, TITLE_WIDTH),
            format_list_date(&note.updated_at.with_timezone(&Local), &now),
            preview(&note.content),
            id_width = ID_WIDTH,
            title_width = TITLE_WIDTH,
        );
    }
    Ok(())
}

pub async fn create(api: HttpNotesApi, title: Option<String>, content: Option<String>) -> Result<()> {
    let mut store = NoteStore::new(api);
    let draft = NoteDraft::new(
        title.unwrap_or_else(|| NEW_NOTE_TITLE.to_string()),
        content.unwrap_or_default(),
    );
    let note = store.create(draft).await.map_err(fetch_failed)?;
    println!("created {} \"{}\"", note.id, note.title);
    Ok(())
}

pub async fn show(api: HttpNotesApi, id: &NoteId) -> Result<()> {
    let mut store = NoteStore::new(api);
    let note = find(&mut store, id).await?;
    print_note(&note);
    Ok(())
}

pub async fn delete(api: HttpNotesApi, id: &NoteId) -> Result<()> {
    let mut store = NoteStore::new(api);
    store.remove(id).await.map_err(fetch_failed)?;
    println!("deleted {id}");
    Ok(())
}

pub async fn share(api: HttpNotesApi, config: &ClientConfig, id: &NoteId) -> Result<()> {
    let origin = config.share_origin()?;
    let mut store = NoteStore::new(api);
    let note = find(&mut store, id).await?;
    println!("{}", share_url(&origin, &note.id));
    Ok(())
}

pub fn print_note(note: &Note) {
    println!("{}", note.title);
    println!(
        "Last edited {}",
        format_editor_date(&note.updated_at.with_timezone(&Local))
    );
    println!();
    if !note.content.is_empty() {
        println!("{}", note.content);
        println!();
    }
    println!("{}", EditorStats::of(&note.content));
}

/// Keeps the detail next to the user message; the CLI has no separate log
/// view.
pub fn fetch_failed(err: FetchError) -> anyhow::Error {
    anyhow!("{} ({})", err.user_message(), err.detail())
}

async fn find(store: &mut NoteStore<HttpNotesApi>, id: &NoteId) -> Result<Note> {
    store.load_all().await.map_err(fetch_failed)?;
    store
        .select(Some(id))
        .cloned()
        .ok_or_else(|| anyhow!("note {id} not found"))
}

fn clip(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let mut clipped: String = value.chars().take(max_chars.saturating_sub(1)).collect();
    clipped.push('~');
    clipped
}

#[cfg(test)]
mod tests {
    use super::{clip, fetch_failed};
    use notesync_core::{FetchError, Operation};

    #[test]
    fn clip_keeps_short_values() {
        assert_eq!(clip("Groceries", 28), "Groceries");
    }

    #[test]
    fn clip_marks_truncated_values() {
        let clipped = clip("abcdefghij", 5);
        assert_eq!(clipped, "abcd~");
        assert_eq!(clipped.chars().count(), 5);
    }

    #[test]
    fn fetch_failure_message_carries_user_text_and_detail() {
        let err = fetch_failed(FetchError::new(Operation::Delete, "HTTP 404 Not Found"));
        assert_eq!(
            err.to_string(),
            "Failed to delete note (HTTP 404 Not Found)"
        );
    }
}
