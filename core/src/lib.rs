//! Client library for the todo service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern); the caller executes the
//! actual round trips. On top of the plain request/response layer,
//! `TodoSession` keeps an optimistic view of the todo list: mutations show
//! up in the view immediately and are rolled back if the server rejects
//! them.
//!
//! # Design
//! - `TodoClient` is stateless — it holds only `base_url`. Each endpoint is
//!   a `build_*`/`parse_*` pair, so the I/O boundary is explicit.
//! - `TodoSession` wraps a client and owns the view; each mutation is a
//!   `begin_*`/`complete_*` pair carrying its own rollback data.
//! - Types use owned `String` / `Vec` fields and are defined independently
//!   of the server crate; integration tests catch schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod session;
pub mod types;

pub use client::TodoClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use session::{PendingAdd, PendingDelete, PendingToggle, TodoSession};
pub use types::{CreateTodo, Todo, UpdateTodo};
