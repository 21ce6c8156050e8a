//! End-to-end tests against a live server.
//!
//! # Design
//! Starts the real server (in-memory store) on a random port, then exercises
//! the client and the optimistic session over actual HTTP using ureq.
//! Validates that request building, response parsing, and the session's
//! reconcile/rollback steps work end-to-end.

use std::time::{SystemTime, UNIX_EPOCH};

use todo_core::{
    ApiError, CreateTodo, HttpMethod, HttpRequest, HttpResponse, TodoClient, TodoSession,
    UpdateTodo,
};

/// Start the server on an ephemeral port and return its base URL.
fn spawn_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            let store = todo_server::TodoStore::open_in_memory().unwrap();
            todo_server::run(listener, store).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses come back as data, letting the library handle status
/// interpretation.
fn execute(req: HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut response = match (req.method, req.body) {
        (HttpMethod::Get, _) => agent.get(&req.url).call(),
        (HttpMethod::Delete, _) => agent.delete(&req.url).call(),
        (HttpMethod::Post, Some(body)) => agent
            .post(&req.url)
            .content_type("application/json")
            .send(body.as_bytes()),
        (HttpMethod::Post, None) => agent.post(&req.url).send_empty(),
        (HttpMethod::Put, Some(body)) => agent
            .put(&req.url)
            .content_type("application/json")
            .send(body.as_bytes()),
        (HttpMethod::Put, None) => agent.put(&req.url).send_empty(),
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    HttpResponse {
        status,
        headers: Vec::new(),
        body,
    }
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64
}

#[test]
fn crud_lifecycle() {
    let client = TodoClient::new(&spawn_server());

    // list — should be empty.
    let req = client.build_list_todos();
    let todos = client.parse_list_todos(execute(req)).unwrap();
    assert!(todos.is_empty(), "expected empty list");

    // create a todo.
    let create_input = CreateTodo {
        text: "Integration test".to_string(),
    };
    let req = client.build_create_todo(&create_input).unwrap();
    let created = client.parse_create_todo(execute(req)).unwrap();
    assert_eq!(created.text, "Integration test");
    assert!(!created.completed);
    let id = created.id.clone();

    // get the created todo.
    let req = client.build_get_todo(&id);
    let fetched = client.parse_get_todo(execute(req)).unwrap();
    assert_eq!(fetched, created);

    // update text.
    let update_input = UpdateTodo {
        text: Some("Updated text".to_string()),
        completed: None,
    };
    let req = client.build_update_todo(&id, &update_input).unwrap();
    let updated = client.parse_update_todo(execute(req)).unwrap();
    assert_eq!(updated.text, "Updated text");
    assert!(!updated.completed);
    assert_eq!(updated.created_at, created.created_at);

    // update completed.
    let update_input = UpdateTodo {
        text: None,
        completed: Some(true),
    };
    let req = client.build_update_todo(&id, &update_input).unwrap();
    let updated = client.parse_update_todo(execute(req)).unwrap();
    assert_eq!(updated.text, "Updated text");
    assert!(updated.completed);

    // list — should have one item.
    let req = client.build_list_todos();
    let todos = client.parse_list_todos(execute(req)).unwrap();
    assert_eq!(todos.len(), 1);

    // delete.
    let req = client.build_delete_todo(&id);
    client.parse_delete_todo(execute(req)).unwrap();

    // get after delete — should be NotFound.
    let req = client.build_get_todo(&id);
    let err = client.parse_get_todo(execute(req)).unwrap_err();
    assert!(matches!(err, ApiError::NotFound));

    // delete again — should be NotFound.
    let req = client.build_delete_todo(&id);
    let err = client.parse_delete_todo(execute(req)).unwrap_err();
    assert!(matches!(err, ApiError::NotFound));

    // list — should be empty again.
    let req = client.build_list_todos();
    let todos = client.parse_list_todos(execute(req)).unwrap();
    assert!(todos.is_empty(), "expected empty list after delete");
}

#[test]
fn optimistic_session_round_trip() {
    let base_url = spawn_server();
    let mut session = TodoSession::new(TodoClient::new(&base_url));

    // initial load of an empty store.
    let req = session.begin_refresh();
    session.complete_refresh(execute(req)).unwrap();
    assert!(!session.loading());
    assert!(session.todos().is_empty());

    // add — provisional entry visible before the request resolves.
    let (pending, req) = session.begin_add("Buy milk", now_ms()).unwrap().unwrap();
    assert_eq!(session.todos().len(), 1);
    assert!(session.todos()[0].id.starts_with("temp-"));
    assert_eq!(session.todos()[0].text, "Buy milk");
    assert!(!session.todos()[0].completed);

    // server confirms — the entry adopts the real id.
    let confirmed = session.complete_add(pending, execute(req)).unwrap();
    assert_eq!(session.todos().len(), 1);
    assert_eq!(session.todos()[0].id, confirmed.id);
    assert!(!confirmed.id.starts_with("temp-"));

    // toggle to completed.
    let id = confirmed.id.clone();
    let (pending, req) = session.begin_toggle(&id).unwrap().unwrap();
    assert!(session.todos()[0].completed);
    session.complete_toggle(pending, execute(req)).unwrap();
    assert!(session.todos()[0].completed);

    // delete.
    let (pending, req) = session.begin_delete(&id).unwrap();
    assert!(session.todos().is_empty());
    session.complete_delete(pending, execute(req)).unwrap();
    assert!(session.todos().is_empty());
    assert!(session.error().is_none());

    // server agrees the store is empty.
    let client = TodoClient::new(&base_url);
    let todos = client.parse_list_todos(execute(client.build_list_todos())).unwrap();
    assert!(todos.is_empty());
}

#[test]
fn session_delete_rolls_back_when_server_rejects() {
    let base_url = spawn_server();
    let client = TodoClient::new(&base_url);
    let mut session = TodoSession::new(TodoClient::new(&base_url));

    // create through the session.
    let (pending, req) = session.begin_add("Doomed", now_ms()).unwrap().unwrap();
    let created = session.complete_add(pending, execute(req)).unwrap();

    // delete it behind the session's back, so the session's next delete
    // will hit a 404.
    client
        .parse_delete_todo(execute(client.build_delete_todo(&created.id)))
        .unwrap();

    let (pending, req) = session.begin_delete(&created.id).unwrap();
    assert!(session.todos().is_empty());

    let err = session.complete_delete(pending, execute(req)).unwrap_err();
    assert!(matches!(err, ApiError::NotFound));

    // rollback put the entry back where it was, and the failure is recorded.
    assert_eq!(session.todos().len(), 1);
    assert_eq!(session.todos()[0].id, created.id);
    assert!(session.error().unwrap().starts_with("Failed to delete todo"));
}
