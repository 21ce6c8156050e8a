//! Error types for the todo API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers routinely distinguish
//! "the todo does not exist" from "the server misbehaved." Every other
//! non-success status lands in `Http` with the raw status code and response
//! body for diagnosis.

use std::fmt;

/// Errors produced by `TodoClient` and surfaced through `TodoSession`.
#[derive(Debug)]
pub enum ApiError {
    /// The server returned 404 — the requested todo does not exist.
    NotFound,

    /// The server returned an unexpected non-2xx status other than 404.
    Http { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    Serialization(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound => write!(f, "todo not found"),
            ApiError::Http { status, body } => write!(f, "HTTP {status}: {body}"),
            ApiError::Deserialization(msg) => write!(f, "deserialization failed: {msg}"),
            ApiError::Serialization(msg) => write!(f, "serialization failed: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}
