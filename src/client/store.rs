//! Client-side task state.
//!
//! Holds the last fetched list plus the active filters, a loading flag
//! and the most recent error message. Mutations patch the local list from
//! the server's response and then refresh the derived data (stats, and
//! categories where they can change) in the background; those refreshes
//! never fail the action that triggered them.

use chrono::{NaiveDate, Utc};

use crate::client::{ApiClient, ClientError, ListQuery, TodoDraft};
use crate::stats::TodoStats;
use crate::wire::TodoWire;

/// Prefer the server's own words, fall back to a per-action default.
fn surface(error: &ClientError, fallback: &str) -> String {
    match error {
        ClientError::Api { message, .. } if !message.is_empty() => message.clone(),
        _ => fallback.to_string(),
    }
}

pub struct TodoStore {
    client: ApiClient,
    pub todos: Vec<TodoWire>,
    pub categories: Vec<String>,
    pub stats: Option<TodoStats>,
    pub filters: ListQuery,
    pub loading: bool,
    pub error: Option<String>,
}

impl TodoStore {
    pub fn new(client: ApiClient) -> TodoStore {
        TodoStore {
            client,
            todos: Vec::new(),
            categories: Vec::new(),
            stats: None,
            filters: ListQuery::default(),
            loading: false,
            error: None,
        }
    }

    // ── Derived views ──────────────────────────────────────────

    pub fn pending(&self) -> Vec<&TodoWire> {
        self.todos.iter().filter(|t| !t.completed).collect()
    }

    pub fn completed(&self) -> Vec<&TodoWire> {
        self.todos.iter().filter(|t| t.completed).collect()
    }

    /// Pending tasks whose due date already passed. Date-only, so a task
    /// due today is not overdue.
    pub fn overdue_on(&self, today: NaiveDate) -> Vec<&TodoWire> {
        self.todos
            .iter()
            .filter(|t| !t.completed && t.due_date.map_or(false, |d| d < today))
            .collect()
    }

    pub fn overdue(&self) -> Vec<&TodoWire> {
        self.overdue_on(Utc::now().date_naive())
    }

    // ── Filters ────────────────────────────────────────────────

    /// Back to the defaults; the next fetch returns the full list
    /// newest-first.
    pub fn clear_filters(&mut self) {
        self.filters = ListQuery::default();
    }

    // ── Actions ────────────────────────────────────────────────

    pub async fn fetch_todos(&mut self) -> Result<(), ClientError> {
        self.loading = true;
        self.error = None;
        match self.client.get_todos(&self.filters).await {
            Ok(todos) => {
                self.todos = todos;
                self.loading = false;
                Ok(())
            }
            Err(e) => {
                self.error = Some(surface(&e, "Failed to fetch todos"));
                self.loading = false;
                Err(e)
            }
        }
    }

    /// Refreshes the dashboard numbers. Failures are logged and swallowed;
    /// the numbers just go stale.
    pub async fn fetch_stats(&mut self) {
        match self.client.get_stats().await {
            Ok(stats) => self.stats = Some(stats),
            Err(e) => tracing::warn!("stats refresh failed: {e}"),
        }
    }

    pub async fn fetch_categories(&mut self) {
        match self.client.get_categories().await {
            Ok(categories) => self.categories = categories,
            Err(e) => tracing::warn!("category refresh failed: {e}"),
        }
    }

    /// Creates a task and prepends it to the local list.
    pub async fn add_todo(&mut self, draft: &TodoDraft) -> Result<TodoWire, ClientError> {
        self.loading = true;
        self.error = None;
        match self.client.create_todo(draft).await {
            Ok(todo) => {
                self.todos.insert(0, todo.clone());
                self.fetch_stats().await;
                self.fetch_categories().await;
                self.loading = false;
                Ok(todo)
            }
            Err(e) => {
                self.error = Some(surface(&e, "Failed to create todo"));
                self.loading = false;
                Err(e)
            }
        }
    }

    pub async fn update_todo(
        &mut self,
        id: i64,
        draft: &TodoDraft,
    ) -> Result<TodoWire, ClientError> {
        self.loading = true;
        self.error = None;
        match self.client.update_todo(id, draft).await {
            Ok(todo) => {
                if let Some(slot) = self.todos.iter_mut().find(|t| t.id == id) {
                    *slot = todo.clone();
                }
                self.fetch_stats().await;
                self.fetch_categories().await;
                self.loading = false;
                Ok(todo)
            }
            Err(e) => {
                self.error = Some(surface(&e, "Failed to update todo"));
                self.loading = false;
                Err(e)
            }
        }
    }

    /// Quick completion flip. Skips the loading flag so list rows don't
    /// flicker, and categories cannot change here.
    pub async fn toggle_todo(&mut self, id: i64) -> Result<TodoWire, ClientError> {
        match self.client.toggle_todo(id).await {
            Ok(todo) => {
                if let Some(slot) = self.todos.iter_mut().find(|t| t.id == id) {
                    *slot = todo.clone();
                }
                self.fetch_stats().await;
                Ok(todo)
            }
            Err(e) => {
                self.error = Some(surface(&e, "Failed to toggle todo"));
                Err(e)
            }
        }
    }

    pub async fn delete_todo(&mut self, id: i64) -> Result<(), ClientError> {
        match self.client.delete_todo(id).await {
            Ok(()) => {
                self.todos.retain(|t| t.id != id);
                self.fetch_stats().await;
                self.fetch_categories().await;
                Ok(())
            }
            Err(e) => {
                self.error = Some(surface(&e, "Failed to delete todo"));
                Err(e)
            }
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
