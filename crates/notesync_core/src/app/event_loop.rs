//! Single-threaded cooperative driver for `NotesApp`.
//!
//! # Responsibility
//! - Multiplex user intents, the nearest timer deadline and completions of
//!   in-flight requests on one task.
//! - Keep remote calls concurrent without ever sharing the store.
//!
//! # Invariants
//! - Only this loop mutates the app; request futures own just an API handle
//!   and their request payload.
//! - Requests already issued are drained on shutdown; pending timers are
//!   cancelled.

use crate::app::{AppEvent, Intent, NotesApp};
use crate::model::note::{CreateNoteBody, Note, NoteId};
use crate::remote::{FetchResult, NotesApi};
use crate::store::note_store::PendingUpdate;
use futures_util::future::{FutureExt, LocalBoxFuture};
use futures_util::stream::{FuturesUnordered, StreamExt};
use log::{debug, info};
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::time::Instant;

/// Remote work requested by an intent or a timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Load,
    Create(CreateNoteBody),
    Update { pending: PendingUpdate, revision: u64 },
    Delete(NoteId),
}

/// Outcome of one `Request`, carrying what the app needs to fold it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Loaded(FetchResult<Vec<Note>>),
    Created(FetchResult<Note>),
    Updated {
        pending: PendingUpdate,
        revision: u64,
        result: FetchResult<Note>,
    },
    Deleted {
        id: NoteId,
        result: FetchResult<()>,
    },
}

/// Performs `request` against `api`.
pub async fn execute<A: NotesApi + ?Sized>(api: &A, request: Request) -> Completion {
    match request {
        Request::Load => Completion::Loaded(api.list_notes().await),
        Request::Create(body) => Completion::Created(api.create_note(&body).await),
        Request::Update { pending, revision } => {
            let result = api.update_note(&pending.id, &pending.body).await;
            Completion::Updated {
                pending,
                revision,
                result,
            }
        }
        Request::Delete(id) => {
            let result = api.delete_note(&id).await;
            Completion::Deleted { id, result }
        }
    }
}

fn spawn_request<A: NotesApi + 'static>(
    api: &Arc<A>,
    request: Request,
) -> LocalBoxFuture<'static, Completion> {
    let api = Arc::clone(api);
    async move { execute(api.as_ref(), request).await }.boxed_local()
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}

fn publish<A: NotesApi>(app: &mut NotesApp<A>, events: &UnboundedSender<AppEvent>) {
    for event in app.take_events() {
        // A closed receiver only means nobody renders anymore.
        let _ = events.send(event);
    }
}

/// Runs until `Intent::Shutdown` arrives or every intent sender is dropped,
/// then returns the app for inspection.
pub async fn run_event_loop<A: NotesApi + 'static>(
    mut app: NotesApp<A>,
    mut intents: UnboundedReceiver<Intent>,
    events: UnboundedSender<AppEvent>,
) -> NotesApp<A> {
    let api = app.store().api_handle();
    let mut in_flight: FuturesUnordered<LocalBoxFuture<'static, Completion>> =
        FuturesUnordered::new();
    info!("event=event_loop module=app status=start");

    loop {
        let deadline = app.next_deadline();
        tokio::select! {
            Some(completion) = in_flight.next(), if !in_flight.is_empty() => {
                app.complete(completion);
            }
            _ = sleep_until(deadline) => {
                if let Some(request) = app.on_timer(Instant::now()) {
                    in_flight.push(spawn_request(&api, request));
                }
            }
            intent = intents.recv() => match intent {
                Some(Intent::Shutdown) | None => break,
                Some(intent) => {
                    if let Some(request) = app.handle(intent, Instant::now()) {
                        in_flight.push(spawn_request(&api, request));
                    }
                }
            },
        }
        publish(&mut app, &events);
    }

    app.shutdown();
    debug!(
        "event=event_loop module=app status=draining in_flight={}",
        in_flight.len()
    );
    while let Some(completion) = in_flight.next().await {
        app.complete(completion);
    }
    publish(&mut app, &events);
    info!("event=event_loop module=app status=stopped");
    app
}
