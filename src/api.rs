//! HTTP surface.
//!
//! Handlers stay thin: parse, validate, hit the store, wrap the result in
//! the response envelope. Task rules live in the other modules.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use chrono::Utc;
use serde_json::Value;

use crate::filter::{self, Sort, TodoFilter};
use crate::stats::{self, TodoStats};
use crate::store::{Store, StoreError};
use crate::validate::{self, FieldErrors};
use crate::wire::{Envelope, TodoWire};

// ── Shared state ───────────────────────────────────────────────

pub struct AppState {
    pub store: Store,
}

pub type SharedState = Arc<AppState>;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/todos", get(list_todos).post(create_todo))
        .route("/api/todos/stats", get(todo_stats))
        .route("/api/todos/categories", get(todo_categories))
        .route(
            "/api/todos/:id",
            get(show_todo).put(update_todo).delete(delete_todo),
        )
        .route("/api/todos/:id/toggle", patch(toggle_todo))
        .with_state(state)
}

// ── Errors ─────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ApiError {
    NotFound,
    Validation(FieldErrors),
    Store(StoreError),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Store(e)
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(Envelope::<()>::err("Todo not found")),
            )
                .into_response(),
            ApiError::Validation(errors) => {
                let message = validate::summary(&errors);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(Envelope {
                        success: false,
                        data: Some(errors),
                        message,
                    }),
                )
                    .into_response()
            }
            ApiError::Store(e) => {
                tracing::error!("store failure: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(Envelope::<()>::err("Internal server error")),
                )
                    .into_response()
            }
        }
    }
}

/// Ids are numeric; anything else on the path behaves like a missing task.
fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| ApiError::NotFound)
}

fn json_body(body: Option<Json<Value>>) -> Value {
    body.map(|Json(value)| value).unwrap_or(Value::Null)
}

// ── Handlers ───────────────────────────────────────────────────

// GET /api/todos
pub async fn list_todos(
    State(state): State<SharedState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Envelope<Vec<TodoWire>>>, ApiError> {
    let todos = filter::apply(
        state.store.list()?,
        &TodoFilter::from_params(&params),
        &Sort::from_params(&params),
    );
    let wired: Vec<TodoWire> = todos.into_iter().map(TodoWire::from).collect();
    Ok(Json(Envelope::ok(wired, "Todos retrieved successfully")))
}

// POST /api/todos
pub async fn create_todo(
    State(state): State<SharedState>,
    body: Option<Json<Value>>,
) -> Result<(StatusCode, Json<Envelope<TodoWire>>), ApiError> {
    let new = validate::validate_create(&json_body(body))?;
    let todo = state.store.insert(new)?;
    tracing::info!(id = todo.id, "todo created");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(
            TodoWire::from(todo),
            "Todo created successfully",
        )),
    ))
}

// GET /api/todos/:id
pub async fn show_todo(
    State(state): State<SharedState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Envelope<TodoWire>>, ApiError> {
    let id = parse_id(&raw_id)?;
    let todo = state.store.get(id)?.ok_or(ApiError::NotFound)?;
    Ok(Json(Envelope::ok(
        TodoWire::from(todo),
        "Todo retrieved successfully",
    )))
}

// PUT /api/todos/:id
pub async fn update_todo(
    State(state): State<SharedState>,
    Path(raw_id): Path<String>,
    body: Option<Json<Value>>,
) -> Result<Json<Envelope<TodoWire>>, ApiError> {
    let id = parse_id(&raw_id)?;
    let mut todo = state.store.get(id)?.ok_or(ApiError::NotFound)?;

    let patch = validate::validate_update(&json_body(body))?;
    if !patch.is_empty() {
        todo.apply(patch, Utc::now());
        if !state.store.update(&todo)? {
            return Err(ApiError::NotFound);
        }
    }
    Ok(Json(Envelope::ok(
        TodoWire::from(todo),
        "Todo updated successfully",
    )))
}

// PATCH /api/todos/:id/toggle
pub async fn toggle_todo(
    State(state): State<SharedState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Envelope<TodoWire>>, ApiError> {
    let id = parse_id(&raw_id)?;
    let mut todo = state.store.get(id)?.ok_or(ApiError::NotFound)?;
    todo.toggle(Utc::now());
    if !state.store.update(&todo)? {
        return Err(ApiError::NotFound);
    }
    Ok(Json(Envelope::ok(
        TodoWire::from(todo),
        "Todo status toggled successfully",
    )))
}

// DELETE /api/todos/:id
pub async fn delete_todo(
    State(state): State<SharedState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let id = parse_id(&raw_id)?;
    if !state.store.delete(id)? {
        return Err(ApiError::NotFound);
    }
    tracing::info!(id, "todo deleted");
    Ok(Json(Envelope {
        success: true,
        data: None,
        message: "Todo deleted successfully".to_string(),
    }))
}

// GET /api/todos/stats
pub async fn todo_stats(
    State(state): State<SharedState>,
) -> Result<Json<Envelope<TodoStats>>, ApiError> {
    let todos = state.store.list()?;
    let stats = stats::compute(&todos, Utc::now().date_naive());
    Ok(Json(Envelope::ok(stats, "Stats retrieved successfully")))
}

// GET /api/todos/categories
pub async fn todo_categories(
    State(state): State<SharedState>,
) -> Result<Json<Envelope<Vec<String>>>, ApiError> {
    let mut categories = BTreeSet::new();
    for todo in state.store.list()? {
        match todo.category {
            Some(category) if !category.is_empty() => {
                categories.insert(category);
            }
            _ => {}
        }
    }
    let sorted: Vec<String> = categories.into_iter().collect();
    Ok(Json(Envelope::ok(
        sorted,
        "Categories retrieved successfully",
    )))
}
