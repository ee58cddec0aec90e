//! Collection statistics.
//!
//! Computed in one pass over the full list. "Today" comes in as an argument
//! so the overdue rule stays testable.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{Priority, Todo};

/// Pending tasks broken down by priority. Tasks without a priority are
/// not counted anywhere in here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityCounts {
    pub high: u64,
    pub medium: u64,
    pub low: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoStats {
    pub total: u64,
    pub completed: u64,
    pub pending: u64,
    /// Pending tasks whose due date lies strictly before today. The
    /// comparison is date-only; a task due today is never overdue.
    pub overdue: u64,
    pub by_priority: PriorityCounts,
}

pub fn compute(todos: &[Todo], today: NaiveDate) -> TodoStats {
    let mut stats = TodoStats::default();
    for todo in todos {
        stats.total += 1;
        if todo.completed {
            stats.completed += 1;
            continue;
        }
        stats.pending += 1;
        if todo.due_date.map_or(false, |d| d < today) {
            stats.overdue += 1;
        }
        match todo.priority {
            Some(Priority::High) => stats.by_priority.high += 1,
            Some(Priority::Medium) => stats.by_priority.medium += 1,
            Some(Priority::Low) => stats.by_priority.low += 1,
            None => {}
        }
    }
    stats
}

// ── Tests ──────────────────────────────────────────────────
