//! HTTP client for the quill API.

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{redirect, Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quill_core::{Error, Note, Result, TagsResponse};

use crate::session::{error_message, SummarySession};

/// Bound on establishing a connection to the server, in seconds.
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Serialize)]
struct NoteBody<'a> {
    title: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct NoteEnvelope {
    note: Note,
}

#[derive(Deserialize)]
struct NoteList {
    notes: Vec<Note>,
}

/// Authenticated client for one user session.
#[derive(Clone)]
pub struct QuillClient {
    http: Client,
    base_url: String,
    token: String,
}

impl QuillClient {
    /// Create a client for `base_url` using a bearer session token.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        // Redirects are the server's way of saying "log in"; surface them.
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = error_message(status, response).await;
        Err(match status {
            StatusCode::SEE_OTHER | StatusCode::FOUND | StatusCode::UNAUTHORIZED => {
                Error::Unauthorized(message)
            }
            StatusCode::FORBIDDEN => Error::Forbidden(message),
            StatusCode::NOT_FOUND => Error::NotFound(message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                Error::InvalidInput(message)
            }
            other => Error::Upstream {
                status: other.as_u16(),
                message,
            },
        })
    }

    /// Notes owned by the session user, newest first.
    pub async fn list_notes(&self) -> Result<Vec<Note>> {
        let response = self
            .http
            .get(self.url("/notes"))
            .bearer_auth(&self.token)
            .send()
            .await?;
        let list: NoteList = Self::check(response).await?.json().await?;
        Ok(list.notes)
    }

    pub async fn create_note(&self, title: &str, content: &str) -> Result<Note> {
        let response = self
            .http
            .post(self.url("/notes"))
            .bearer_auth(&self.token)
            .json(&NoteBody { title, content })
            .send()
            .await?;
        let envelope: NoteEnvelope = Self::check(response).await?.json().await?;
        Ok(envelope.note)
    }

    pub async fn get_note(&self, id: Uuid) -> Result<Note> {
        let response = self
            .http
            .get(self.url(&format!("/notes/{}", id)))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn update_note(&self, id: Uuid, title: &str, content: &str) -> Result<Note> {
        let response = self
            .http
            .put(self.url(&format!("/notes/{}", id)))
            .bearer_auth(&self.token)
            .json(&NoteBody { title, content })
            .send()
            .await?;
        let envelope: NoteEnvelope = Self::check(response).await?.json().await?;
        Ok(envelope.note)
    }

    pub async fn delete_note(&self, id: Uuid) -> Result<()> {
        let response = self
            .http
            .delete(self.url(&format!("/notes/{}", id)))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Keyword tags for `content`.
    pub async fn generate_tags(&self, content: &str) -> Result<Vec<String>> {
        let response = self
            .http
            .post(self.url("/tags"))
            .bearer_auth(&self.token)
            .form(&[("content", content)])
            .send()
            .await?;
        let tags: TagsResponse = Self::check(response).await?.json().await?;
        Ok(tags.tags)
    }

    /// Start streaming a summary of a saved note.
    ///
    /// A note without an id has never been saved; summarizing it is refused
    /// rather than creating the note implicitly.
    pub fn summarize(&self, note_id: Option<Uuid>) -> Result<SummarySession> {
        let note_id = note_id.ok_or_else(|| {
            Error::InvalidInput("Save the note before generating a summary".to_string())
        })?;

        let request = self
            .http
            .get(self.url(&format!("/notes/{}/summarize", note_id)))
            .bearer_auth(&self.token)
            .header(ACCEPT, "text/event-stream");
        Ok(SummarySession::spawn(note_id, request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let client = QuillClient::new("http://localhost:3000/", "t").unwrap();
        assert_eq!(client.url("/notes"), "http://localhost:3000/notes");
    }

    #[tokio::test]
    async fn test_summarize_without_id_is_refused() {
        let client = QuillClient::new("http://localhost:3000", "t").unwrap();
        let err = client.summarize(None).err().unwrap();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
