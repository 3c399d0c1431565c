use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use notesync_core::{
    ClientConfig, HttpNotesApi, NoteDraft, NoteId, NotePatch, NoteStore, NotesApi, Operation,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

const SERVER_STAMP: &str = "2024-05-01T10:00:00.000123";

/// Mimics the Spring backend: numeric ids, offset-less timestamps and an
/// extra `shareId` field.
#[derive(Clone, Default)]
struct StubServer {
    notes: Arc<Mutex<Vec<Value>>>,
    bodies: Arc<Mutex<Vec<Value>>>,
    next_id: Arc<AtomicU64>,
    failing: Arc<AtomicBool>,
}

impl StubServer {
    fn check(&self) -> Result<(), StatusCode> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        } else {
            Ok(())
        }
    }

    fn record(&self, body: &Value) {
        self.bodies.lock().unwrap().push(body.clone());
    }
}

async fn list(State(server): State<StubServer>) -> Result<Json<Vec<Value>>, StatusCode> {
    server.check()?;
    Ok(Json(server.notes.lock().unwrap().clone()))
}

async fn create(
    State(server): State<StubServer>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    server.check()?;
    server.record(&body);
    let id = server.next_id.fetch_add(1, Ordering::SeqCst) + 1;
    let note = json!({
        "id": id,
        "title": body["title"],
        "content": body["content"],
        "createdAt": SERVER_STAMP,
        "updatedAt": SERVER_STAMP,
        "shareId": format!("share-{id}"),
    });
    server.notes.lock().unwrap().push(note.clone());
    Ok(Json(note))
}

async fn update(
    State(server): State<StubServer>,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    server.check()?;
    server.record(&body);
    let mut notes = server.notes.lock().unwrap();
    let note = notes
        .iter_mut()
        .find(|note| note["id"] == json!(id))
        .ok_or(StatusCode::NOT_FOUND)?;
    note["title"] = body["title"].clone();
    note["content"] = body["content"].clone();
    note["updatedAt"] = json!("2024-05-01T11:00:00");
    Ok(Json(note.clone()))
}

async fn delete(State(server): State<StubServer>, Path(id): Path<u64>) -> StatusCode {
    if server.check().is_err() {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    let mut notes = server.notes.lock().unwrap();
    let before = notes.len();
    notes.retain(|note| note["id"] != json!(id));
    if notes.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    }
}

async fn spawn_server() -> (StubServer, HttpNotesApi) {
    let server = StubServer::default();
    let router = Router::new()
        .route("/api/notes", get(list).post(create))
        .route("/api/notes/:id", put(update).delete(delete))
        .with_state(server.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let config = ClientConfig {
        api_base_url: format!("http://{addr}"),
        ..ClientConfig::default()
    };
    (server, HttpNotesApi::new(&config).unwrap())
}

#[tokio::test]
async fn store_round_trips_through_rest_contract() {
    let (server, api) = spawn_server().await;
    let mut store = NoteStore::new(api);

    assert!(store.load_all().await.unwrap().is_empty());

    let created = store.create(NoteDraft::new("", "hello")).await.unwrap();
    assert_eq!(created.id, NoteId::from("1"));
    assert_eq!(created.title, "Untitled");
    let create_body = server.bodies.lock().unwrap()[0].clone();
    assert!(create_body.get("createdAt").is_some());
    assert!(create_body.get("updatedAt").is_some());

    let updated = store
        .update(&created.id, NotePatch::new("Groceries", "milk"))
        .await
        .unwrap();
    assert_eq!(updated.title, "Groceries");
    assert!(updated.updated_at > created.updated_at);
    let update_body = server.bodies.lock().unwrap()[1].clone();
    assert!(update_body.get("createdAt").is_none());
    assert_eq!(update_body["content"], "milk");

    let reloaded = store.load_all().await.unwrap();
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded[0].content, "milk");

    store.remove(&created.id).await.unwrap();
    assert!(store.is_empty());
    assert!(server.notes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn non_success_statuses_become_fetch_errors() {
    let (server, api) = spawn_server().await;

    let missing = api
        .update_note(
            &NoteId::from("99"),
            &notesync_core::UpdateNoteBody::from_patch(NotePatch::new("t", "c"), chrono::Utc::now()),
        )
        .await
        .unwrap_err();
    assert_eq!(missing.operation(), Operation::Update);
    assert!(missing.detail().contains("404"));

    server.failing.store(true, Ordering::SeqCst);
    let mut store = NoteStore::new(api);
    let err = store.load_all().await.unwrap_err();
    assert_eq!(err.operation(), Operation::Load);
    assert!(store.is_empty());
    assert!(store.error().is_some());
}

#[tokio::test]
async fn unreachable_backend_is_a_fetch_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ClientConfig {
        api_base_url: format!("http://{addr}"),
        ..ClientConfig::default()
    };
    let api = HttpNotesApi::new(&config).unwrap();

    let err = api.list_notes().await.unwrap_err();
    assert_eq!(err.operation(), Operation::Load);
    assert!(err.detail().starts_with("request failed"));
}
