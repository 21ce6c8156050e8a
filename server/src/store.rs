//! SQLite-backed todo store.
//!
//! One `todos` table keyed by id; `completed` is stored as 0/1 and
//! `createdAt` as integer epoch millis. The store owns the durable records;
//! callers get plain `Todo` values back.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Sql(rusqlite::Error),
    InvalidInput(&'static str),
    NotFound,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io: {err}"),
            Self::Sql(err) => write!(f, "sqlite: {err}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::NotFound => write!(f, "todo not found"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sql(value)
    }
}

/// A stored todo record. Wire shape: `{id, text, completed, createdAt}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: String,
    pub text: String,
    pub completed: bool,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

/// Partial update; `None` fields leave the stored value unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTodo {
    pub text: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug)]
pub struct TodoStore {
    conn: Connection,
}

impl TodoStore {
    /// Open (creating if needed) a file-backed store, including the parent
    /// directory of `db_path`.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(db_path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open a throwaway in-memory store. Used by tests and by the server
    /// when no database path is configured.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS todos (
              id        TEXT PRIMARY KEY,
              text      TEXT NOT NULL,
              completed INTEGER NOT NULL DEFAULT 0,
              createdAt INTEGER NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// All todos, newest first. `createdAt` is the sort key; insertion order
    /// breaks ties within the same millisecond.
    pub fn list(&self) -> Result<Vec<Todo>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, text, completed, createdAt FROM todos \
             ORDER BY createdAt DESC, rowid DESC",
        )?;
        let rows = stmt.query_map([], row_to_todo)?;
        let mut todos = Vec::new();
        for row in rows {
            todos.push(row?);
        }
        Ok(todos)
    }

    pub fn get(&self, id: &str) -> Result<Option<Todo>, StoreError> {
        let todo = self
            .conn
            .query_row(
                "SELECT id, text, completed, createdAt FROM todos WHERE id = ?1",
                params![id],
                row_to_todo,
            )
            .optional()?;
        Ok(todo)
    }

    /// Create a todo from `text`, trimming it first. The store assigns the
    /// id and the creation timestamp.
    pub fn insert(&self, text: &str) -> Result<Todo, StoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StoreError::InvalidInput("text must be a non-empty string"));
        }
        let todo = Todo {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            completed: false,
            created_at: now_ms(),
        };
        self.conn.execute(
            "INSERT INTO todos (id, text, completed, createdAt) VALUES (?1, ?2, ?3, ?4)",
            params![todo.id, todo.text, todo.completed, todo.created_at],
        )?;
        Ok(todo)
    }

    /// Apply the provided fields over the stored record and persist the
    /// merged result. `createdAt` never changes.
    pub fn update(&self, id: &str, changes: UpdateTodo) -> Result<Todo, StoreError> {
        if let Some(text) = changes.text.as_deref() {
            if text.trim().is_empty() {
                return Err(StoreError::InvalidInput("text must be a non-empty string"));
            }
        }
        let Some(mut todo) = self.get(id)? else {
            return Err(StoreError::NotFound);
        };
        if let Some(text) = changes.text {
            todo.text = text.trim().to_string();
        }
        if let Some(completed) = changes.completed {
            todo.completed = completed;
        }
        self.conn.execute(
            "UPDATE todos SET text = ?1, completed = ?2 WHERE id = ?3",
            params![todo.text, todo.completed, id],
        )?;
        Ok(todo)
    }

    /// Remove the record for `id`. Returns whether a row was actually
    /// removed; an absent id is not an error here.
    pub fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let changed = self
            .conn
            .execute("DELETE FROM todos WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }
}

fn row_to_todo(row: &rusqlite::Row<'_>) -> rusqlite::Result<Todo> {
    Ok(Todo {
        id: row.get(0)?,
        text: row.get(1)?,
        completed: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
