//! Line-based editor over the core event loop.
//!
//! Plain lines append to the note content; lines starting with `:` are
//! commands. Typing pauses are picked up by the autosave debounce.

use crate::commands::print_note;
use anyhow::{bail, Result};
use chrono::Local;
use log::debug;
use notesync_core::app::event_loop::execute;
use notesync_core::{
    format_editor_date, run_event_loop, AppEvent, ClientConfig, EditorStats, Field, HttpNotesApi,
    Intent, NoteId, NotesApp,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::Instant;

const HELP: &str = "plain lines append to the note | :title <text> | :w save | :share | \
:copy | :q save and quit | :q! quit without saving | ::text appends \":text\"";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Append(String),
    Title(String),
    Save,
    Share,
    Copy,
    Quit,
    Discard,
    Help,
}

fn parse_line(line: &str) -> Command {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(rest) = line.strip_prefix(':') else {
        return Command::Append(line.to_string());
    };
    if rest.starts_with(':') {
        return Command::Append(rest.to_string());
    }
    let (name, arg) = rest.split_once(' ').unwrap_or((rest, ""));
    match name {
        "title" => Command::Title(arg.to_string()),
        "w" => Command::Save,
        "share" => Command::Share,
        "copy" => Command::Copy,
        "q" => Command::Quit,
        "q!" => Command::Discard,
        _ => Command::Help,
    }
}

pub async fn edit(api: HttpNotesApi, config: &ClientConfig, id: NoteId) -> Result<()> {
    let mut app = NotesApp::new(api, config)?;

    // Initial load runs before the loop so the note can be printed first.
    if let Some(request) = app.handle(Intent::Load, Instant::now()) {
        let completion = execute(app.store().api(), request).await;
        app.complete(completion);
    }
    if let Some(message) = app.store().error() {
        bail!("{message}");
    }
    app.handle(Intent::Select(Some(id.clone())), Instant::now());
    let Some(note) = app.store().selected() else {
        bail!("note {id} not found");
    };
    print_note(note);
    println!("{HELP}");
    app.take_events();

    let (intent_tx, intent_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (app, input, ()) = tokio::join!(
        run_event_loop(app, intent_rx, event_tx),
        read_input(intent_tx),
        render(event_rx),
    );
    input?;

    if app.session().is_dirty() {
        eprintln!("unsaved changes were discarded");
    }
    Ok(())
}

/// Returning drops the sender, which stops the event loop after it drains
/// in-flight saves.
async fn read_input(intents: UnboundedSender<Intent>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let intent = match parse_line(&line) {
            Command::Append(text) => Intent::AppendLine(text),
            Command::Title(title) => Intent::Edit(Field::Title, title),
            Command::Save => Intent::Save,
            Command::Share => Intent::OpenShare,
            Command::Copy => {
                let _ = intents.send(Intent::OpenShare);
                Intent::CopyShareLink
            }
            Command::Quit => break,
            Command::Discard => return Ok(()),
            Command::Help => {
                println!("{HELP}");
                continue;
            }
        };
        if intents.send(intent).is_err() {
            return Ok(());
        }
    }
    // `:q` and end of input both flush the buffer.
    let _ = intents.send(Intent::Save);
    Ok(())
}

async fn render(mut events: UnboundedReceiver<AppEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            AppEvent::SaveIssued { note_id, revision } => {
                debug!("event=save_issued module=cli status=ok note_id={note_id} revision={revision}");
            }
            AppEvent::Saved(note) => println!(
                "saved {} ({})",
                format_editor_date(&note.updated_at.with_timezone(&Local)),
                EditorStats::of(&note.content)
            ),
            AppEvent::ShareOpened(url) => println!("share link: {url}"),
            AppEvent::ShareCopied(url) => println!("copy this link: {url}"),
            AppEvent::Failed { message, .. } => eprintln!("error: {message}"),
            AppEvent::Selected(None) => println!("note is no longer available"),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_line, Command};

    #[test]
    fn plain_lines_append() {
        assert_eq!(parse_line("milk\n"), Command::Append("milk".to_string()));
        assert_eq!(parse_line(""), Command::Append(String::new()));
    }

    #[test]
    fn double_colon_appends_literal_colon() {
        assert_eq!(parse_line("::w"), Command::Append(":w".to_string()));
    }

    #[test]
    fn commands_parse_with_arguments() {
        assert_eq!(
            parse_line(":title  My Note  "),
            Command::Title(" My Note  ".to_string())
        );
        assert_eq!(parse_line(":title"), Command::Title(String::new()));
        assert_eq!(parse_line(":w"), Command::Save);
        assert_eq!(parse_line(":q!"), Command::Discard);
        assert_eq!(parse_line(":share"), Command::Share);
        assert_eq!(parse_line(":nope"), Command::Help);
    }
}
