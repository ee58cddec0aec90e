//! JSON wire format.
//!
//! Every HTTP response uses one envelope shape:
//!
//! ```text
//! {
//!   "success": bool,
//!   "data":    payload or null,
//!   "message": human-readable string
//! }
//! ```
//!
//! Task payloads always carry all ten fields. Nullable fields are sent as
//! explicit `null`, never omitted, so clients can bind them statically.
//! Dates are plain `YYYY-MM-DD`, timestamps RFC 3339 in UTC.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Priority, Todo};

// ── Envelope ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
}

impl<T> Envelope<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Envelope<T> {
        Envelope {
            success: true,
            data: Some(data),
            message: message.into(),
        }
    }

    /// Failure with no payload; `data` serializes as `null`.
    pub fn err(message: impl Into<String>) -> Envelope<T> {
        Envelope {
            success: false,
            data: None,
            message: message.into(),
        }
    }
}

// ── Task payload ───────────────────────────────────────────

/// A task as it travels over the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoWire {
    pub id: i64,
    pub user_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub category: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub priority: Option<Priority>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Todo> for TodoWire {
    fn from(todo: Todo) -> TodoWire {
        TodoWire {
            id: todo.id,
            user_id: todo.user_id,
            title: todo.title,
            description: todo.description,
            completed: todo.completed,
            category: todo.category,
            due_date: todo.due_date,
            priority: todo.priority,
            created_at: todo.created_at,
            updated_at: todo.updated_at,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────
