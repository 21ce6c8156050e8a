//! Optimistic session over the todo API.
//!
//! # Overview
//! `TodoSession` owns the client-visible todo list. Every mutation is applied
//! to that view immediately, before the server has confirmed it, and carries
//! an explicit undo: when the call fails, the view returns to its exact
//! pre-mutation state and the failure is recorded for display.
//!
//! # Design
//! Like `TodoClient`, the session never touches the network. Each operation
//! is split into a `begin_*` method that mutates the view synchronously and
//! returns the `HttpRequest` to execute together with a pending token holding
//! the rollback data, and a `complete_*` method that consumes the
//! `HttpResponse` and either reconciles the view with the server's answer or
//! rolls the optimistic change back. The host executes the round trip in
//! between, so the view never waits on network latency.
//!
//! Any number of operations may be in flight at once and completes may arrive
//! in any order: pending tokens correlate with view entries by id, never by
//! position, and distinct ids touch disjoint slices of the view. Two in-flight
//! operations on the *same* id are not coordinated — the later-resolving
//! response wins.
//!
//! Failures surface twice on purpose: the message is stored in session state
//! for rendering, and the `ApiError` is returned so the caller can react
//! (e.g. raise a notification). A request that is never completed leaves its
//! optimistic change in place indefinitely.

use uuid::Uuid;

use crate::client::TodoClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{CreateTodo, Todo, UpdateTodo};

/// Prefix for provisional ids, disjoint from server-assigned UUIDs.
const TEMP_ID_PREFIX: &str = "temp-";

/// Client-side view of the todo list with optimistic mutations.
#[derive(Debug)]
pub struct TodoSession {
    client: TodoClient,
    todos: Vec<Todo>,
    loading: bool,
    error: Option<String>,
}

/// Rollback data for an in-flight create: the provisional id to reconcile.
#[derive(Debug)]
pub struct PendingAdd {
    temp_id: String,
}

impl PendingAdd {
    /// The provisional id currently occupying the view entry.
    pub fn temp_id(&self) -> &str {
        &self.temp_id
    }
}

/// Rollback data for an in-flight toggle: the pre-flip completion state.
#[derive(Debug)]
pub struct PendingToggle {
    id: String,
    previous: bool,
}

/// Rollback data for an in-flight delete: the removed entry and where it was.
#[derive(Debug)]
pub struct PendingDelete {
    todo: Todo,
    index: usize,
}

impl TodoSession {
    /// A fresh session: empty view, loading until the first refresh resolves.
    pub fn new(client: TodoClient) -> Self {
        Self {
            client,
            todos: Vec::new(),
            loading: true,
            error: None,
        }
    }

    /// The current view, newest first (except in-flight adds, which sit
    /// wherever they were optimistically prepended).
    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Message from the most recent failed operation, cleared by the next
    /// `begin_*` call.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Start (re)loading the list from the server.
    pub fn begin_refresh(&mut self) -> HttpRequest {
        self.loading = true;
        self.error = None;
        self.client.build_list_todos()
    }

    /// Finish a refresh: replace the view with server truth, or keep the
    /// current view and record the failure.
    pub fn complete_refresh(&mut self, response: HttpResponse) -> Result<(), ApiError> {
        self.loading = false;
        match self.client.parse_list_todos(response) {
            Ok(todos) => {
                self.todos = todos;
                Ok(())
            }
            Err(err) => {
                self.error = Some(format!("Failed to load todos: {err}"));
                Err(err)
            }
        }
    }

    /// Optimistically add a todo.
    ///
    /// Empty or whitespace-only text is a no-op (`Ok(None)`). Otherwise a
    /// provisional entry with a `temp-` id and `created_at = now_ms` is
    /// prepended to the view before the request is handed out. The caller
    /// supplies the timestamp so the session stays deterministic.
    pub fn begin_add(
        &mut self,
        text: &str,
        now_ms: i64,
    ) -> Result<Option<(PendingAdd, HttpRequest)>, ApiError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let input = CreateTodo {
            text: trimmed.to_string(),
        };
        // Build before mutating: a serialization failure must not leave a
        // provisional entry behind.
        let request = self.client.build_create_todo(&input)?;

        let temp_id = format!("{TEMP_ID_PREFIX}{}", Uuid::new_v4());
        self.todos.insert(
            0,
            Todo {
                id: temp_id.clone(),
                text: trimmed.to_string(),
                completed: false,
                created_at: now_ms,
            },
        );
        self.error = None;
        Ok(Some((PendingAdd { temp_id }, request)))
    }

    /// Finish an add: swap the provisional entry for the server's todo in
    /// place, or remove it entirely on failure.
    pub fn complete_add(
        &mut self,
        pending: PendingAdd,
        response: HttpResponse,
    ) -> Result<Todo, ApiError> {
        match self.client.parse_create_todo(response) {
            Ok(todo) => {
                // Replace in place so the entry keeps its optimistic position
                // rather than re-sorting by the server timestamp.
                if let Some(entry) = self.todos.iter_mut().find(|t| t.id == pending.temp_id) {
                    *entry = todo.clone();
                }
                Ok(todo)
            }
            Err(err) => {
                self.todos.retain(|t| t.id != pending.temp_id);
                self.error = Some(format!("Failed to add todo: {err}"));
                Err(err)
            }
        }
    }

    /// Optimistically flip the completion state of `id`.
    ///
    /// An unknown id is a no-op (`Ok(None)`).
    pub fn begin_toggle(
        &mut self,
        id: &str,
    ) -> Result<Option<(PendingToggle, HttpRequest)>, ApiError> {
        let Some(index) = self.todos.iter().position(|t| t.id == id) else {
            return Ok(None);
        };

        let previous = self.todos[index].completed;
        let input = UpdateTodo {
            text: None,
            completed: Some(!previous),
        };
        let request = self.client.build_update_todo(id, &input)?;

        self.todos[index].completed = !previous;
        self.error = None;
        Ok(Some((
            PendingToggle {
                id: id.to_string(),
                previous,
            },
            request,
        )))
    }

    /// Finish a toggle: adopt the server's authoritative record, or revert
    /// the completion flag to its pre-toggle value on failure.
    pub fn complete_toggle(
        &mut self,
        pending: PendingToggle,
        response: HttpResponse,
    ) -> Result<Todo, ApiError> {
        match self.client.parse_update_todo(response) {
            Ok(todo) => {
                if let Some(entry) = self.todos.iter_mut().find(|t| t.id == pending.id) {
                    *entry = todo.clone();
                }
                Ok(todo)
            }
            Err(err) => {
                // Only the flag is restored; other fields keep whatever the
                // view holds now.
                if let Some(entry) = self.todos.iter_mut().find(|t| t.id == pending.id) {
                    entry.completed = pending.previous;
                }
                self.error = Some(format!("Failed to update todo: {err}"));
                Err(err)
            }
        }
    }

    /// Optimistically remove the entry for `id`.
    ///
    /// An unknown id is a no-op (`None`). The removed entry and its index are
    /// kept so a failed delete can reinsert it where it was.
    pub fn begin_delete(&mut self, id: &str) -> Option<(PendingDelete, HttpRequest)> {
        let index = self.todos.iter().position(|t| t.id == id)?;
        let todo = self.todos.remove(index);
        self.error = None;
        let request = self.client.build_delete_todo(id);
        Some((PendingDelete { todo, index }, request))
    }

    /// Finish a delete: nothing further on success (the entry is already
    /// gone), reinsert the recorded entry at its recorded index on failure.
    ///
    /// The index was computed against the pre-delete view; if other
    /// operations resolved in between it may be stale, in which case it is
    /// clamped to the current view length.
    pub fn complete_delete(
        &mut self,
        pending: PendingDelete,
        response: HttpResponse,
    ) -> Result<(), ApiError> {
        match self.client.parse_delete_todo(response) {
            Ok(()) => Ok(()),
            Err(err) => {
                let index = pending.index.min(self.todos.len());
                self.todos.insert(index, pending.todo);
                self.error = Some(format!("Failed to delete todo: {err}"));
                Err(err)
            }
        }
    }
}
