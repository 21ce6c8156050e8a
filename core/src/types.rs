//! Domain DTOs for the todo API.
//!
//! # Design
//! These types mirror the server's wire schema but are defined independently
//! so the client library carries no dependency on the server crate.
//! Integration tests catch any schema drift between the two.

use serde::{Deserialize, Serialize};

/// A single todo item as returned by the API.
///
/// `id` is an opaque string. Server-assigned ids are UUIDs; the optimistic
/// session substitutes a `temp-` prefixed placeholder until the server
/// confirms a create, so callers must not assume any particular id format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: String,
    pub text: String,
    pub completed: bool,
    /// Creation time in epoch milliseconds. Immutable; the server orders
    /// listings by this field, newest first.
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

/// Request payload for creating a new todo. The server trims the text and
/// rejects it when nothing remains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodo {
    pub text: String,
}

/// Request payload for updating an existing todo. Only the fields present in
/// the JSON are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTodo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}
