//! HTTP surface for the todo service.
//!
//! Routes map 1:1 onto store operations. Handlers hold no state of their
//! own: the shared [`TodoStore`] is the single owner of durable records.
//! Input constraints are checked here as well as in the store, so malformed
//! requests are rejected with a descriptive 400 before the store is touched,
//! and store failures never leak internal detail into a response body.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::Mutex};
use tracing::{error, info};

pub mod store;

pub use store::{StoreError, Todo, TodoStore, UpdateTodo};

/// Shared handler state. rusqlite connections are not `Sync`, so the store
/// sits behind an async mutex and requests take turns.
pub type Db = Arc<Mutex<TodoStore>>;

type ErrorResponse = (StatusCode, Json<Value>);

pub fn app(store: TodoStore) -> Router {
    let db: Db = Arc::new(Mutex::new(store));
    Router::new()
        .route("/api/todos", get(list_todos).post(create_todo))
        .route(
            "/api/todos/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .route("/health", get(health))
        .with_state(db)
}

pub async fn run(listener: TcpListener, store: TodoStore) -> Result<(), std::io::Error> {
    axum::serve(listener, app(store)).await
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn list_todos(State(db): State<Db>) -> Result<Json<Vec<Todo>>, ErrorResponse> {
    let store = db.lock().await;
    let todos = store.list().map_err(store_error)?;
    Ok(Json(todos))
}

async fn get_todo(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, ErrorResponse> {
    let store = db.lock().await;
    match store.get(&id).map_err(store_error)? {
        Some(todo) => Ok(Json(todo)),
        None => Err(not_found()),
    }
}

async fn create_todo(
    State(db): State<Db>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Todo>), ErrorResponse> {
    let text = match body.get("text").and_then(Value::as_str) {
        Some(text) if !text.trim().is_empty() => text,
        _ => {
            return Err(bad_request(
                "Text is required and must be a non-empty string",
            ))
        }
    };
    let store = db.lock().await;
    let todo = store.insert(text).map_err(store_error)?;
    info!(id = %todo.id, "todo created");
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn update_todo(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Todo>, ErrorResponse> {
    let mut changes = UpdateTodo::default();
    if let Some(text) = body.get("text") {
        match text.as_str() {
            Some(text) if !text.trim().is_empty() => changes.text = Some(text.to_string()),
            _ => return Err(bad_request("Text must be a non-empty string")),
        }
    }
    if let Some(completed) = body.get("completed") {
        match completed.as_bool() {
            Some(completed) => changes.completed = Some(completed),
            None => return Err(bad_request("Completed must be a boolean")),
        }
    }
    let store = db.lock().await;
    let todo = store.update(&id, changes).map_err(store_error)?;
    Ok(Json(todo))
}

async fn delete_todo(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<StatusCode, ErrorResponse> {
    let store = db.lock().await;
    if store.delete(&id).map_err(store_error)? {
        info!(%id, "todo deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found())
    }
}

fn bad_request(message: &str) -> ErrorResponse {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn not_found() -> ErrorResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Todo not found" })),
    )
}

fn store_error(err: StoreError) -> ErrorResponse {
    match err {
        StoreError::NotFound => not_found(),
        StoreError::InvalidInput(message) => bad_request(message),
        err => {
            error!("store failure: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
        }
    }
}
