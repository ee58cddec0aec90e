//! List filtering and ordering.
//!
//! Filters are explicit predicates applied to the full task list after it
//! leaves the store, so every rule is visible here rather than buried in a
//! query builder. Absent and empty query parameters mean "no filtering".

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::model::{Priority, Todo};

// ── Filter ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TodoFilter {
    /// Case-insensitive substring over title and description.
    pub search: Option<String>,
    /// Exact category match.
    pub category: Option<String>,
    pub completed: Option<bool>,
    /// Exact wire name (`low`/`medium`/`high`). Unknown names match nothing.
    pub priority: Option<String>,
}

/// Loose boolean coercion for the `completed` query parameter.
///
/// Recognized spellings (any case): `1/true/yes/on` and `0/false/no/off`.
/// Anything else disables the completion filter entirely.
pub fn parse_completed(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn param<'a>(params: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    match params.get(key) {
        Some(value) if !value.is_empty() => Some(value.as_str()),
        _ => None,
    }
}

impl TodoFilter {
    pub fn from_params(params: &HashMap<String, String>) -> TodoFilter {
        TodoFilter {
            search: param(params, "search").map(str::to_string),
            category: param(params, "category").map(str::to_string),
            completed: param(params, "completed").and_then(parse_completed),
            priority: param(params, "priority").map(str::to_string),
        }
    }

    /// All active predicates must hold.
    pub fn matches(&self, todo: &Todo) -> bool {
        if let Some(needle) = &self.search {
            let needle = needle.to_lowercase();
            let in_title = todo.title.to_lowercase().contains(&needle);
            let in_description = todo
                .description
                .as_deref()
                .map_or(false, |d| d.to_lowercase().contains(&needle));
            if !in_title && !in_description {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if todo.category.as_deref() != Some(category.as_str()) {
                return false;
            }
        }
        if let Some(completed) = self.completed {
            if todo.completed != completed {
                return false;
            }
        }
        if let Some(priority) = &self.priority {
            if todo.priority.map(Priority::as_str) != Some(priority.as_str()) {
                return false;
            }
        }
        true
    }
}

// ── Sort ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    CreatedAt,
    DueDate,
    Title,
    Priority,
    Completed,
}

impl SortKey {
    pub fn parse(s: &str) -> Option<SortKey> {
        match s {
            "created_at" => Some(SortKey::CreatedAt),
            "due_date" => Some(SortKey::DueDate),
            "title" => Some(SortKey::Title),
            "priority" => Some(SortKey::Priority),
            "completed" => Some(SortKey::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Requested ordering. `key: None` means the request named an unrecognized
/// column and the list keeps storage order (ascending id).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub key: Option<SortKey>,
    pub order: SortOrder,
}

impl Default for Sort {
    /// Newest first.
    fn default() -> Sort {
        Sort {
            key: Some(SortKey::CreatedAt),
            order: SortOrder::Desc,
        }
    }
}

impl Sort {
    pub fn from_params(params: &HashMap<String, String>) -> Sort {
        let key = match param(params, "sort_by") {
            None => Some(SortKey::CreatedAt),
            Some(raw) => SortKey::parse(raw),
        };
        // Only the exact spelling `asc` flips the direction.
        let order = match param(params, "sort_order") {
            Some("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        };
        Sort { key, order }
    }
}

fn compare(key: SortKey, a: &Todo, b: &Todo) -> Ordering {
    match key {
        SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
        // `None` sorts before any date.
        SortKey::DueDate => a.due_date.cmp(&b.due_date),
        SortKey::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        // `None` sorts below `low`.
        SortKey::Priority => a.priority.cmp(&b.priority),
        SortKey::Completed => a.completed.cmp(&b.completed),
    }
}

/// Filters then orders a task list. The input arrives in storage order and
/// the sort is stable, so ties keep ascending ids.
pub fn apply(mut todos: Vec<Todo>, filter: &TodoFilter, sort: &Sort) -> Vec<Todo> {
    todos.retain(|t| filter.matches(t));
    if let Some(key) = sort.key {
        todos.sort_by(|a, b| {
            let ord = compare(key, a, b);
            match sort.order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });
    }
    todos
}

// ── Tests ──────────────────────────────────────────────────
