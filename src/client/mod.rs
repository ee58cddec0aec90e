//! HTTP client for the task API.
//!
//! One method per endpoint, all funneled through a single request path
//! that injects the bearer token and peels the response envelope. A 401
//! from any endpoint drops the cached token and surfaces
//! `Unauthenticated`; the account endpoints themselves live on a separate
//! service that shares the envelope contract.

pub mod store;

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::model::Priority;
use crate::stats::TodoStats;
use crate::wire::{Envelope, TodoWire};

// ── Errors ─────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ClientError {
    /// Transport failure before a response body arrived.
    Http(String),
    /// The server answered with a failure envelope.
    Api { status: u16, message: String },
    /// The session token was missing or rejected.
    Unauthenticated,
    /// The response body did not match the wire contract.
    Decode(String),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Http(e) => write!(f, "http: {e}"),
            ClientError::Api { status, message } => write!(f, "api ({status}): {message}"),
            ClientError::Unauthenticated => write!(f, "unauthenticated"),
            ClientError::Decode(e) => write!(f, "decode: {e}"),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Http(e.to_string())
    }
}

// ── Request/response types ─────────────────────────────────────

/// Query parameters for the list endpoint, mirroring the server's filter
/// vocabulary. Empty strings mean "no filter" and are sent as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub search: String,
    pub category: String,
    pub completed: String,
    pub priority: String,
    pub sort_by: String,
    pub sort_order: String,
}

impl Default for ListQuery {
    fn default() -> ListQuery {
        ListQuery {
            search: String::new(),
            category: String::new(),
            completed: String::new(),
            priority: String::new(),
            sort_by: "created_at".to_string(),
            sort_order: "desc".to_string(),
        }
    }
}

impl ListQuery {
    fn to_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("search", self.search.clone()),
            ("category", self.category.clone()),
            ("completed", self.completed.clone()),
            ("priority", self.priority.clone()),
            ("sort_by", self.sort_by.clone()),
            ("sort_order", self.sort_order.clone()),
        ]
    }
}

/// Body for create and update calls. `None` fields are left out of the
/// JSON entirely, so an update only touches what it names.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TodoDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl TodoDraft {
    pub fn titled(title: impl Into<String>) -> TodoDraft {
        TodoDraft {
            title: Some(title.into()),
            ..TodoDraft::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserWire {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionWire {
    pub token: String,
    pub user: UserWire,
}

// ── Client ─────────────────────────────────────────────────────

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Mutex<Option<String>>,
    token_file: Option<PathBuf>,
}

impl ApiClient {
    /// `base_url` runs up to and including `/api`, no trailing slash.
    pub fn new(base_url: impl Into<String>) -> ApiClient {
        ApiClient {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token: Mutex::new(None),
            token_file: None,
        }
    }

    /// Like `new`, but the session token persists in `path` across runs.
    pub fn with_token_file(base_url: impl Into<String>, path: impl Into<PathBuf>) -> ApiClient {
        let path = path.into();
        let token = match std::fs::read_to_string(&path) {
            Ok(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Err(_) => None,
        };
        ApiClient {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token: Mutex::new(token),
            token_file: Some(path),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }

    fn set_token(&self, token: &str) {
        *self.token.lock().unwrap() = Some(token.to_string());
        if let Some(path) = &self.token_file {
            if let Err(e) = std::fs::write(path, token) {
                tracing::warn!("could not persist session token: {e}");
            }
        }
    }

    fn clear_token(&self) {
        *self.token.lock().unwrap() = None;
        if let Some(path) = &self.token_file {
            let _ = std::fs::remove_file(path);
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a request and peels the envelope. Any 401 clears the cached
    /// token before surfacing `Unauthenticated`.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Envelope<T>, ClientError> {
        let request = match self.token() {
            Some(token) => request.header("Authorization", format!("Bearer {token}")),
            None => request,
        };
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            self.clear_token();
            return Err(ClientError::Unauthenticated);
        }
        if !status.is_success() {
            let message = response
                .json::<Envelope<serde_json::Value>>()
                .await
                .map(|envelope| envelope.message)
                .unwrap_or_else(|_| format!("request failed with status {status}"));
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        response
            .json::<Envelope<T>>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    fn data<T>(envelope: Envelope<T>) -> Result<T, ClientError> {
        envelope
            .data
            .ok_or_else(|| ClientError::Decode("envelope carried no data".to_string()))
    }

    // ── Task endpoints ─────────────────────────────────────────

    pub async fn get_todos(&self, query: &ListQuery) -> Result<Vec<TodoWire>, ClientError> {
        let request = self.http.get(self.url("/todos")).query(&query.to_params());
        Self::data(self.send(request).await?)
    }

    pub async fn get_todo(&self, id: i64) -> Result<TodoWire, ClientError> {
        let request = self.http.get(self.url(&format!("/todos/{id}")));
        Self::data(self.send(request).await?)
    }

    pub async fn create_todo(&self, draft: &TodoDraft) -> Result<TodoWire, ClientError> {
        let request = self.http.post(self.url("/todos")).json(draft);
        Self::data(self.send(request).await?)
    }

    pub async fn update_todo(&self, id: i64, draft: &TodoDraft) -> Result<TodoWire, ClientError> {
        let request = self.http.put(self.url(&format!("/todos/{id}"))).json(draft);
        Self::data(self.send(request).await?)
    }

    pub async fn toggle_todo(&self, id: i64) -> Result<TodoWire, ClientError> {
        let request = self.http.patch(self.url(&format!("/todos/{id}/toggle")));
        Self::data(self.send(request).await?)
    }

    pub async fn delete_todo(&self, id: i64) -> Result<(), ClientError> {
        let request = self.http.delete(self.url(&format!("/todos/{id}")));
        self.send::<serde_json::Value>(request).await?;
        Ok(())
    }

    pub async fn get_stats(&self) -> Result<TodoStats, ClientError> {
        let request = self.http.get(self.url("/todos/stats"));
        Self::data(self.send(request).await?)
    }

    pub async fn get_categories(&self) -> Result<Vec<String>, ClientError> {
        let request = self.http.get(self.url("/todos/categories"));
        Self::data(self.send(request).await?)
    }

    // ── Account endpoints ──────────────────────────────────────

    pub async fn login(&self, credentials: &Credentials) -> Result<SessionWire, ClientError> {
        let request = self.http.post(self.url("/login")).json(credentials);
        let session: SessionWire = Self::data(self.send(request).await?)?;
        self.set_token(&session.token);
        Ok(session)
    }

    pub async fn register(&self, registration: &Registration) -> Result<SessionWire, ClientError> {
        let request = self.http.post(self.url("/register")).json(registration);
        let session: SessionWire = Self::data(self.send(request).await?)?;
        self.set_token(&session.token);
        Ok(session)
    }

    /// Ends the session server-side. The local token goes away no matter
    /// what the server thought of the request.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let request = self.http.post(self.url("/logout"));
        let result = self.send::<serde_json::Value>(request).await;
        self.clear_token();
        result.map(|_| ())
    }

    pub async fn get_user(&self) -> Result<UserWire, ClientError> {
        let request = self.http.get(self.url("/user"));
        Self::data(self.send(request).await?)
    }
}

// ── Tests ──────────────────────────────────────────────────────
