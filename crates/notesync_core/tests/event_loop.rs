use chrono::Utc;
use notesync_core::{
    run_event_loop, AppEvent, ClientConfig, EditState, Field, InMemoryNotesApi, Intent, Note,
    NoteId, NotesApp, Operation,
};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;

fn stored(id: &str, title: &str, content: &str) -> Note {
    Note {
        id: NoteId::from(id),
        title: title.to_string(),
        content: content.to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn new_app(api: &InMemoryNotesApi) -> NotesApp<InMemoryNotesApi> {
    NotesApp::new(api.clone(), &ClientConfig::default()).unwrap()
}

fn edit(value: &str) -> Intent {
    Intent::Edit(Field::Content, value.to_string())
}

#[tokio::test(start_paused = true)]
async fn rapid_edits_produce_exactly_one_save_after_quiet_period() {
    let api = InMemoryNotesApi::with_notes(vec![stored("a", "A", "")]);
    let (intent_tx, intent_rx) = mpsc::unbounded_channel();
    let (event_tx, _event_rx) = mpsc::unbounded_channel();

    let driver = async {
        intent_tx.send(Intent::Load).unwrap();
        sleep(ms(1)).await;
        intent_tx
            .send(Intent::Select(Some(NoteId::from("a"))))
            .unwrap();
        intent_tx.send(edit("h")).unwrap();
        sleep(ms(500)).await;
        intent_tx.send(edit("he")).unwrap();

        sleep(ms(1998)).await;
        assert!(api.update_calls().is_empty(), "saved before quiet period");

        sleep(ms(10)).await;
        let calls = api.update_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.content, "he");

        sleep(ms(5000)).await;
        assert_eq!(api.update_calls().len(), 1);
        intent_tx.send(Intent::Shutdown).unwrap();
    };

    let (app, ()) = tokio::join!(run_event_loop(new_app(&api), intent_rx, event_tx), driver);
    assert_eq!(app.session().state(), EditState::Clean);
    assert_eq!(app.store().selected().unwrap().content, "he");
}

#[tokio::test(start_paused = true)]
async fn edits_during_in_flight_save_are_not_overwritten_by_its_response() {
    let api = InMemoryNotesApi::with_notes(vec![stored("a", "A", "")]);
    let (intent_tx, intent_rx) = mpsc::unbounded_channel();
    let (event_tx, _event_rx) = mpsc::unbounded_channel();

    let driver = async {
        intent_tx.send(Intent::Load).unwrap();
        sleep(ms(1)).await;
        api.set_latency(ms(1000));
        intent_tx
            .send(Intent::Select(Some(NoteId::from("a"))))
            .unwrap();
        intent_tx.send(edit("first")).unwrap();
        intent_tx.send(Intent::Save).unwrap();
        sleep(ms(100)).await;
        intent_tx.send(edit("first second")).unwrap();
        // First response lands at ~1000ms; the second save fires at ~2100ms.
        sleep(ms(1500)).await;
        assert_eq!(api.update_calls().len(), 1);
        intent_tx.send(Intent::Shutdown).unwrap();
    };

    let (app, ()) = tokio::join!(run_event_loop(new_app(&api), intent_rx, event_tx), driver);

    // Shutdown cancels the pending autosave; the newer edit stays in memory.
    assert_eq!(app.session().content(), "first second");
    assert_eq!(app.session().state(), EditState::Dirty);
    assert_eq!(app.store().selected().unwrap().content, "first");
}

#[tokio::test(start_paused = true)]
async fn shutdown_drains_issued_requests() {
    let api = InMemoryNotesApi::with_notes(vec![stored("a", "A", "")]);
    api.set_latency(ms(300));
    let (intent_tx, intent_rx) = mpsc::unbounded_channel();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    intent_tx.send(Intent::Load).unwrap();
    intent_tx
        .send(Intent::Select(Some(NoteId::from("a"))))
        .unwrap();
    intent_tx.send(Intent::Shutdown).unwrap();

    let app = run_event_loop(new_app(&api), intent_rx, event_tx).await;

    assert_eq!(app.store().len(), 1);
    let mut saw_loaded = false;
    while let Ok(event) = event_rx.try_recv() {
        if event == (AppEvent::Loaded { count: 1 }) {
            saw_loaded = true;
        }
    }
    assert!(saw_loaded);
}

#[tokio::test(start_paused = true)]
async fn load_failure_reports_error_and_retry_recovers() {
    let api = InMemoryNotesApi::new();
    api.set_unavailable(true);
    let (intent_tx, intent_rx) = mpsc::unbounded_channel();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    let driver = async {
        intent_tx.send(Intent::Load).unwrap();
        let failed = event_rx.recv().await.unwrap();
        assert_eq!(
            failed,
            AppEvent::Failed {
                operation: Operation::Load,
                message: "Failed to load notes. Please check if backend is running.".to_string(),
            }
        );

        api.set_unavailable(false);
        intent_tx.send(Intent::Retry).unwrap();
        assert_eq!(event_rx.recv().await.unwrap(), AppEvent::Loaded { count: 0 });
        drop(intent_tx);
    };

    let (app, ()) = tokio::join!(run_event_loop(new_app(&api), intent_rx, event_tx), driver);
    assert!(app.store().error().is_none());
    assert!(!app.store().is_loading());
}
