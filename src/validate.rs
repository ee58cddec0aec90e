//! Request body validation.
//!
//! Bodies arrive as raw JSON and are checked field by field so that a bad
//! request reports every problem at once instead of failing on the first.
//! String inputs are trimmed; a trimmed-empty string counts as null for
//! nullable fields and as missing for `title`.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::Value;

use crate::model::{NewTodo, Priority, TodoPatch};

/// Messages keyed by field name, sorted for stable output.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Field names in rule order; `summary` leads with the first of these
/// that failed.
const FIELD_ORDER: [&str; 6] = [
    "title",
    "description",
    "completed",
    "category",
    "due_date",
    "priority",
];

/// Folds per-field errors into the one line clients display: the first
/// failing field's message, plus a count of whatever else went wrong.
pub fn summary(errors: &FieldErrors) -> String {
    let first = FIELD_ORDER
        .iter()
        .find_map(|key| errors.get(*key).and_then(|messages| messages.first()))
        .or_else(|| errors.values().find_map(|messages| messages.first()));
    let first = match first {
        Some(message) => message,
        None => return "The given data was invalid.".to_string(),
    };
    let rest = errors.values().map(Vec::len).sum::<usize>() - 1;
    match rest {
        0 => first.clone(),
        1 => format!("{first} (and 1 more error)"),
        n => format!("{first} (and {n} more errors)"),
    }
}

enum Field<'a> {
    Absent,
    Null,
    Value(&'a Value),
}

/// A non-object body has no fields at all.
fn field<'a>(body: &'a Value, key: &str) -> Field<'a> {
    match body.as_object().and_then(|map| map.get(key)) {
        None => Field::Absent,
        Some(Value::Null) => Field::Null,
        Some(value) => Field::Value(value),
    }
}

fn push(errors: &mut FieldErrors, key: &str, message: impl Into<String>) {
    errors.entry(key.to_string()).or_default().push(message.into());
}

// ── Field rules ────────────────────────────────────────────

fn title_field(body: &Value, required: bool, errors: &mut FieldErrors) -> Option<String> {
    match field(body, "title") {
        Field::Absent => {
            if required {
                push(errors, "title", "The title field is required.");
            }
            None
        }
        Field::Null => {
            push(errors, "title", "The title field is required.");
            None
        }
        Field::Value(Value::String(raw)) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                push(errors, "title", "The title field is required.");
                None
            } else if trimmed.chars().count() > 255 {
                push(
                    errors,
                    "title",
                    "The title may not be greater than 255 characters.",
                );
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Field::Value(_) => {
            push(errors, "title", "The title must be a string.");
            None
        }
    }
}

/// Nullable string rule. Outer `None` = not supplied, `Some(None)` = clear.
fn string_field(
    body: &Value,
    key: &str,
    max: usize,
    errors: &mut FieldErrors,
) -> Option<Option<String>> {
    match field(body, key) {
        Field::Absent => None,
        Field::Null => Some(None),
        Field::Value(Value::String(raw)) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                Some(None)
            } else if trimmed.chars().count() > max {
                push(
                    errors,
                    key,
                    format!("The {key} may not be greater than {max} characters."),
                );
                None
            } else {
                Some(Some(trimmed.to_string()))
            }
        }
        Field::Value(_) => {
            push(errors, key, format!("The {key} must be a string."));
            None
        }
    }
}

fn completed_field(body: &Value, errors: &mut FieldErrors) -> Option<bool> {
    match field(body, "completed") {
        Field::Absent => None,
        Field::Value(Value::Bool(flag)) => Some(*flag),
        Field::Null | Field::Value(_) => {
            push(errors, "completed", "The completed field must be true or false.");
            None
        }
    }
}

fn due_date_field(body: &Value, errors: &mut FieldErrors) -> Option<Option<NaiveDate>> {
    match field(body, "due_date") {
        Field::Absent => None,
        Field::Null => Some(None),
        Field::Value(Value::String(raw)) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Some(None);
            }
            match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
                Ok(date) => Some(Some(date)),
                Err(_) => {
                    push(errors, "due_date", "The due date is not a valid date.");
                    None
                }
            }
        }
        Field::Value(_) => {
            push(errors, "due_date", "The due date is not a valid date.");
            None
        }
    }
}

fn priority_field(body: &Value, errors: &mut FieldErrors) -> Option<Option<Priority>> {
    match field(body, "priority") {
        Field::Absent => None,
        Field::Null => Some(None),
        Field::Value(Value::String(raw)) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Some(None);
            }
            match Priority::parse(trimmed) {
                Some(priority) => Some(Some(priority)),
                None => {
                    push(errors, "priority", "The selected priority is invalid.");
                    None
                }
            }
        }
        Field::Value(_) => {
            push(errors, "priority", "The selected priority is invalid.");
            None
        }
    }
}

// ── Entry points ───────────────────────────────────────────

/// Checks a create body. Unknown keys are ignored; `user_id` in particular
/// can never be set through the API.
pub fn validate_create(body: &Value) -> Result<NewTodo, FieldErrors> {
    let mut errors = FieldErrors::new();

    let title = title_field(body, true, &mut errors);
    let description = string_field(body, "description", 1000, &mut errors);
    let completed = completed_field(body, &mut errors);
    let category = string_field(body, "category", 50, &mut errors);
    let due_date = due_date_field(body, &mut errors);
    let priority = priority_field(body, &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(NewTodo {
        title: title.unwrap_or_default(),
        description: description.flatten(),
        completed: completed.unwrap_or(false),
        category: category.flatten(),
        due_date: due_date.flatten(),
        priority: priority.flatten(),
    })
}

/// Checks an update body. Every field is optional, but a supplied title
/// must still be non-empty.
pub fn validate_update(body: &Value) -> Result<TodoPatch, FieldErrors> {
    let mut errors = FieldErrors::new();

    let patch = TodoPatch {
        title: title_field(body, false, &mut errors),
        description: string_field(body, "description", 1000, &mut errors),
        completed: completed_field(body, &mut errors),
        category: string_field(body, "category", 50, &mut errors),
        due_date: due_date_field(body, &mut errors),
        priority: priority_field(body, &mut errors),
    };

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(patch)
}

// ── Tests ──────────────────────────────────────────────────
