//! Core task model.
//!
//! A `Todo` owns its server-assigned id and timestamps. Mutations go
//! through `apply` and `toggle` so `updated_at` stays honest.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ── Priority ───────────────────────────────────────────────

/// Task priority. Ordering follows urgency: `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Parses the wire name. Anything else is `None`.
    pub fn parse(s: &str) -> Option<Priority> {
        match s {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

// ── Entities ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    /// Assigned once by the store, never reused.
    pub id: i64,
    /// Owner, when an account service is attached. Never set through the task API.
    pub user_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub category: Option<String>,
    /// Date-only deadline. Time of day never enters the comparison.
    pub due_date: Option<NaiveDate>,
    pub priority: Option<Priority>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a task. Ids and timestamps are the
/// store's business.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTodo {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub category: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub priority: Option<Priority>,
}

/// Validated input for a partial update.
///
/// Outer `None` means the field was not supplied and stays as it is.
/// For nullable fields the inner `None` means "clear it".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
    pub category: Option<Option<String>>,
    pub due_date: Option<Option<NaiveDate>>,
    pub priority: Option<Option<Priority>>,
}

impl TodoPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.completed.is_none()
            && self.category.is_none()
            && self.due_date.is_none()
            && self.priority.is_none()
    }
}

impl Todo {
    pub fn new(id: i64, new: NewTodo, now: DateTime<Utc>) -> Todo {
        Todo {
            id,
            user_id: None,
            title: new.title,
            description: new.description,
            completed: new.completed,
            category: new.category,
            due_date: new.due_date,
            priority: new.priority,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a partial update. An empty patch leaves the task alone,
    /// timestamps included.
    pub fn apply(&mut self, patch: TodoPatch, now: DateTime<Utc>) {
        if patch.is_empty() {
            return;
        }
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        self.updated_at = now;
    }

    /// Flips completion. Touches nothing else besides `updated_at`.
    pub fn toggle(&mut self, now: DateTime<Utc>) {
        self.completed = !self.completed;
        self.updated_at = now;
    }
}

// ── Tests ──────────────────────────────────────────────────
