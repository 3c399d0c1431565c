//! REST implementation of `NotesApi` over reqwest.

use crate::config::{ClientConfig, ConfigError};
use crate::model::note::{CreateNoteBody, Note, NoteId, UpdateNoteBody};
use crate::remote::{FetchError, FetchResult, NotesApi, Operation};
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

/// Typed client for the `/api/notes` resource.
#[derive(Debug, Clone)]
pub struct HttpNotesApi {
    endpoint: String,
    client: Client,
}

impl HttpNotesApi {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let endpoint = config.notes_endpoint()?;
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|err| ConfigError::HttpClient(err.to_string()))?;
        Ok(Self { endpoint, client })
    }

    /// Collection URL, `{origin}/api/notes`.
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    fn note_url(&self, id: &NoteId) -> String {
        format!("{}/{}", self.endpoint, id)
    }
}

#[async_trait]
impl NotesApi for HttpNotesApi {
    async fn list_notes(&self) -> FetchResult<Vec<Note>> {
        let resp = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|err| transport_error(Operation::Load, err))?;
        decode_json(Operation::Load, resp).await
    }

    async fn create_note(&self, body: &CreateNoteBody) -> FetchResult<Note> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(body)
            .send()
            .await
            .map_err(|err| transport_error(Operation::Create, err))?;
        decode_json(Operation::Create, resp).await
    }

    async fn update_note(&self, id: &NoteId, body: &UpdateNoteBody) -> FetchResult<Note> {
        let resp = self
            .client
            .put(self.note_url(id))
            .json(body)
            .send()
            .await
            .map_err(|err| transport_error(Operation::Update, err))?;
        decode_json(Operation::Update, resp).await
    }

    async fn delete_note(&self, id: &NoteId) -> FetchResult<()> {
        let resp = self
            .client
            .delete(self.note_url(id))
            .send()
            .await
            .map_err(|err| transport_error(Operation::Delete, err))?;
        // Response body is ignored on success.
        ensure_success(Operation::Delete, resp).await.map(|_| ())
    }
}

fn transport_error(operation: Operation, err: reqwest::Error) -> FetchError {
    FetchError::new(operation, format!("request failed: {err}"))
}

async fn ensure_success(operation: Operation, resp: Response) -> FetchResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    debug!(
        "event=http_status module=remote status=error op={} http_status={} body_len={}",
        operation.as_str(),
        status.as_u16(),
        body.len()
    );
    Err(FetchError::new(operation, format!("HTTP {status}")))
}

async fn decode_json<T: DeserializeOwned>(operation: Operation, resp: Response) -> FetchResult<T> {
    ensure_success(operation, resp)
        .await?
        .json::<T>()
        .await
        .map_err(|err| FetchError::new(operation, format!("invalid response body: {err}")))
}
