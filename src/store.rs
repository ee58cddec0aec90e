//! Task ↔ redb persistence.
//!
//! One record per task, keyed by id. A meta table carries the id counter,
//! so ids count up from 1 across restarts and are never reused, deletions
//! included.
//!
//! Records are postcard-encoded behind a one-byte format version, leaving
//! room to migrate old files in place.

use std::sync::Arc;

use chrono::Utc;
use redb::{Database, ReadableTable, TableDefinition};

use crate::model::{NewTodo, Todo};

const TODOS: TableDefinition<u64, &[u8]> = TableDefinition::new("todos");
const META: TableDefinition<&str, u64> = TableDefinition::new("meta");

const NEXT_ID: &str = "next_id";
const FORMAT_VERSION: u8 = 1;

fn encode(todo: &Todo) -> Result<Vec<u8>, StoreError> {
    let mut bytes = vec![FORMAT_VERSION];
    let body = postcard::to_allocvec(todo).map_err(|e| StoreError::Encode(e.to_string()))?;
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

fn decode(bytes: &[u8]) -> Result<Todo, StoreError> {
    match bytes.split_first() {
        Some((&FORMAT_VERSION, body)) => {
            postcard::from_bytes(body).map_err(|e| StoreError::Decode(e.to_string()))
        }
        Some((version, _)) => Err(StoreError::Decode(format!(
            "unsupported record version {version}"
        ))),
        None => Err(StoreError::Decode("empty record".into())),
    }
}

/// Thin handle to the redb file. Cloneable (Arc inside).
#[derive(Clone)]
pub struct Store {
    db: Arc<Database>,
}

impl Store {
    /// Open (or create) the task file at the given path.
    /// Creates tables if they don't exist.
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let db = Database::create(path)?;

        let txn = db.begin_write()?;
        {
            let _ = txn.open_table(TODOS)?;
            let _ = txn.open_table(META)?;
        }
        txn.commit()?;

        Ok(Store { db: Arc::new(db) })
    }

    /// Creates a task under the next id. The counter bump and the record
    /// land in one transaction.
    pub fn insert(&self, new: NewTodo) -> Result<Todo, StoreError> {
        let txn = self.db.begin_write()?;
        let todo = {
            let mut meta = txn.open_table(META)?;
            let id = match meta.get(NEXT_ID)? {
                Some(guard) => guard.value(),
                None => 1,
            };
            meta.insert(NEXT_ID, id + 1)?;

            let todo = Todo::new(id as i64, new, Utc::now());
            let mut todos = txn.open_table(TODOS)?;
            todos.insert(id, encode(&todo)?.as_slice())?;
            todo
        };
        txn.commit()?;
        Ok(todo)
    }

    pub fn get(&self, id: i64) -> Result<Option<Todo>, StoreError> {
        if id < 1 {
            return Ok(None);
        }
        let txn = self.db.begin_read()?;
        let todos = txn.open_table(TODOS)?;
        match todos.get(id as u64)? {
            Some(guard) => Ok(Some(decode(guard.value())?)),
            None => Ok(None),
        }
    }

    /// All tasks in storage order (ascending id).
    pub fn list(&self) -> Result<Vec<Todo>, StoreError> {
        let txn = self.db.begin_read()?;
        let todos = txn.open_table(TODOS)?;
        let mut out = Vec::new();
        for entry in todos.iter()? {
            let (_, value) = entry?;
            out.push(decode(value.value())?);
        }
        Ok(out)
    }

    /// Writes a task back under its existing id. Reports whether the id
    /// was still present; a row deleted in the meantime stays deleted.
    pub fn update(&self, todo: &Todo) -> Result<bool, StoreError> {
        if todo.id < 1 {
            return Ok(false);
        }
        let txn = self.db.begin_write()?;
        let existed = {
            let mut todos = txn.open_table(TODOS)?;
            let present = todos.get(todo.id as u64)?.is_some();
            if present {
                todos.insert(todo.id as u64, encode(todo)?.as_slice())?;
            }
            present
        };
        txn.commit()?;
        Ok(existed)
    }

    /// Removes a task. Returns whether it existed. The id counter is
    /// deliberately left alone.
    pub fn delete(&self, id: i64) -> Result<bool, StoreError> {
        if id < 1 {
            return Ok(false);
        }
        let txn = self.db.begin_write()?;
        let existed = {
            let mut todos = txn.open_table(TODOS)?;
            // Bound here so the access guard drops before the table does.
            let removed = todos.remove(id as u64)?.is_some();
            removed
        };
        txn.commit()?;
        Ok(existed)
    }
}

// ── Errors ─────────────────────────────────────────────────────

#[derive(Debug)]
pub enum StoreError {
    Redb(String),
    Decode(String),
    Encode(String),
}

// redb 2.x has many error types. Blanket them all into StoreError::Redb.
macro_rules! from_redb {
    ($($t:ty),*) => {
        $(impl From<$t> for StoreError {
            fn from(e: $t) -> Self { StoreError::Redb(e.to_string()) }
        })*
    };
}

from_redb!(
    redb::Error,
    redb::DatabaseError,
    redb::TableError,
    redb::TransactionError,
    redb::StorageError,
    redb::CommitError
);

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Redb(e) => write!(f, "redb: {e}"),
            StoreError::Decode(e) => write!(f, "decode: {e}"),
            StoreError::Encode(e) => write!(f, "encode: {e}"),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
