use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use todo_server::store::StoreResult;
use todo_server::{
    app, DeleteAck, ErrorBody, MemoryStore, NewTodo, SqliteStore, StoreError, Todo, TodoPatch,
    TodoStore,
};
use tower::ServiceExt;
use uuid::Uuid;

fn memory_app() -> Router {
    app(Arc::new(MemoryStore::new()))
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

async fn send(app: &Router, request: Request<String>) -> axum::response::Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn create(app: &Router, text: &str) -> Todo {
    let body = serde_json::json!({ "text": text }).to_string();
    let resp = send(app, json_request("POST", "/api/todo", &body)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await
}

async fn list(app: &Router) -> Vec<Todo> {
    let resp = send(app, empty_request("GET", "/api/todo")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await
}

// --- list ---

#[tokio::test]
async fn list_todos_empty() {
    let app = memory_app();
    assert!(list(&app).await.is_empty());
}

#[tokio::test]
async fn list_is_creation_ordered() {
    let app = memory_app();
    for text in ["one", "two", "three"] {
        create(&app, text).await;
    }
    let texts: Vec<_> = list(&app).await.into_iter().map(|t| t.text).collect();
    assert_eq!(texts, ["one", "two", "three"]);
}

// --- create ---

#[tokio::test]
async fn create_todo_returns_201_with_store_fields() {
    let app = memory_app();
    let todo = create(&app, "Buy milk").await;
    assert_eq!(todo.text, "Buy milk");
    assert!(!todo.is_completed);
    assert!(!todo.id.is_nil());
}

#[tokio::test]
async fn create_todo_forces_incomplete() {
    let app = memory_app();
    let resp = send(
        &app,
        json_request("POST", "/api/todo", r#"{"text":"Already done","isCompleted":true}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let todo: Todo = body_json(resp).await;
    assert!(!todo.is_completed);
}

#[tokio::test]
async fn create_todo_ignores_client_identifier() {
    let app = memory_app();
    let resp = send(
        &app,
        json_request(
            "POST",
            "/api/todo",
            r#"{"id":"00000000-0000-0000-0000-000000000001","text":"Mine"}"#,
        ),
    )
    .await;
    let todo: Todo = body_json(resp).await;
    assert_ne!(todo.id.to_string(), "00000000-0000-0000-0000-000000000001");
}

#[tokio::test]
async fn create_todo_missing_text_returns_422() {
    let app = memory_app();
    let resp = send(&app, json_request("POST", "/api/todo", r#"{"todo":1}"#)).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn create_blank_todo_returns_400() {
    let app = memory_app();
    let resp = send(&app, json_request("POST", "/api/todo", r#"{"text":"   "}"#)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let err: ErrorBody = body_json(resp).await;
    assert_eq!(err.error, "todo text cannot be empty");
    assert!(list(&app).await.is_empty());
}

#[tokio::test]
async fn create_duplicate_todo_returns_409() {
    let app = memory_app();
    create(&app, "Buy milk").await;
    let resp = send(&app, json_request("POST", "/api/todo", r#"{"text":"buy MILK"}"#)).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let err: ErrorBody = body_json(resp).await;
    assert!(err.error.contains("buy MILK"));
    assert_eq!(list(&app).await.len(), 1);
}

// --- update ---

#[tokio::test]
async fn update_unknown_id_returns_null() {
    let app = memory_app();
    let resp = send(
        &app,
        json_request(
            "PUT",
            "/api/todo/00000000-0000-0000-0000-000000000000",
            r#"{"text":"Nope"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Option<Todo> = body_json(resp).await;
    assert!(updated.is_none());
}

#[tokio::test]
async fn update_to_blank_text_returns_400() {
    let app = memory_app();
    let todo = create(&app, "Walk dog").await;
    let resp = send(
        &app,
        json_request("PUT", &format!("/api/todo/{}", todo.id), r#"{"text":""}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(list(&app).await[0].text, "Walk dog");
}

#[tokio::test]
async fn update_bad_uuid_returns_400() {
    let app = memory_app();
    let resp = send(&app, json_request("PUT", "/api/todo/not-a-uuid", "{}")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- delete ---

#[tokio::test]
async fn delete_unknown_id_acknowledges_nothing_deleted() {
    let app = memory_app();
    let resp = send(
        &app,
        empty_request("DELETE", "/api/todo/00000000-0000-0000-0000-000000000000"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let ack: DeleteAck = body_json(resp).await;
    assert!(!ack.deleted);
}

// --- unsupported verbs ---

#[tokio::test]
async fn patch_on_collection_returns_405_with_allow() {
    let app = memory_app();
    let resp = send(&app, json_request("PATCH", "/api/todo", "{}")).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

    let allow = resp.headers()[http::header::ALLOW].to_str().unwrap().to_string();
    let mut verbs: Vec<_> = allow.split(',').map(str::trim).collect();
    verbs.sort_unstable();
    assert_eq!(verbs, ["DELETE", "GET", "POST", "PUT"]);

    let body = body_bytes(resp).await;
    assert_eq!(&body[..], b"Method PATCH Not Allowed");
}

#[tokio::test]
async fn head_on_collection_returns_405_with_allow() {
    let app = memory_app();
    let resp = send(&app, empty_request("HEAD", "/api/todo")).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(resp.headers()[http::header::ALLOW], "GET, POST, PUT, DELETE");
}

#[tokio::test]
async fn get_on_item_returns_405() {
    let app = memory_app();
    let resp = send(
        &app,
        empty_request("GET", "/api/todo/00000000-0000-0000-0000-000000000000"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(resp.headers()[http::header::ALLOW], "GET, POST, PUT, DELETE");
}

// --- store failures ---

/// Store whose every call fails the way a dead blocking pool would.
struct FailingStore;

fn worker_gone() -> StoreError {
    StoreError::Worker("connection pool closed".to_string())
}

#[async_trait]
impl TodoStore for FailingStore {
    async fn insert(&self, _input: NewTodo) -> StoreResult<Todo> {
        Err(worker_gone())
    }

    async fn list(&self) -> StoreResult<Vec<Todo>> {
        Err(worker_gone())
    }

    async fn update(&self, _id: Uuid, _patch: TodoPatch) -> StoreResult<Option<Todo>> {
        Err(worker_gone())
    }

    async fn delete(&self, _id: Uuid) -> StoreResult<bool> {
        Err(worker_gone())
    }
}

#[tokio::test]
async fn store_failures_return_500_with_message() {
    let app = app(Arc::new(FailingStore));
    let item = "/api/todo/00000000-0000-0000-0000-000000000001";
    let requests = [
        empty_request("GET", "/api/todo"),
        json_request("POST", "/api/todo", r#"{"text":"Buy milk"}"#),
        json_request("PUT", item, r#"{"isCompleted":true}"#),
        empty_request("DELETE", item),
    ];

    for request in requests {
        let label = format!("{} {}", request.method(), request.uri());
        let resp = send(&app, request).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR, "{label}");
        let err: ErrorBody = body_json(resp).await;
        assert_eq!(err.error, "store worker failed: connection pool closed", "{label}");
    }
}

// --- full lifecycle ---

async fn lifecycle(app: Router) {
    let milk = create(&app, "Buy milk").await;
    let dog = create(&app, "Walk dog").await;

    let todos = list(&app).await;
    assert_eq!(todos.len(), 2);
    assert_eq!(todos[1].id, dog.id);
    assert!(!todos[1].is_completed);

    // toggle milk
    let resp = send(
        &app,
        json_request("PUT", &format!("/api/todo/{}", milk.id), r#"{"isCompleted":true}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Option<Todo> = body_json(resp).await;
    let updated = updated.unwrap();
    assert_eq!(updated.text, "Buy milk");
    assert!(updated.is_completed);
    assert_eq!(updated.created_at, milk.created_at);

    let todos = list(&app).await;
    assert!(todos[0].is_completed);
    assert!(!todos[1].is_completed);

    // rename dog, completion untouched
    let resp = send(
        &app,
        json_request("PUT", &format!("/api/todo/{}", dog.id), r#"{"text":"Walk cat"}"#),
    )
    .await;
    let updated: Option<Todo> = body_json(resp).await;
    assert_eq!(updated.unwrap().text, "Walk cat");

    // delete dog
    let resp = send(&app, empty_request("DELETE", &format!("/api/todo/{}", dog.id))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let ack: DeleteAck = body_json(resp).await;
    assert!(ack.deleted);

    let todos = list(&app).await;
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].id, milk.id);

    // second delete matches nothing
    let resp = send(&app, empty_request("DELETE", &format!("/api/todo/{}", dog.id))).await;
    let ack: DeleteAck = body_json(resp).await;
    assert!(!ack.deleted);
}

#[tokio::test]
async fn crud_lifecycle_memory_store() {
    lifecycle(memory_app()).await;
}

#[tokio::test]
async fn crud_lifecycle_sqlite_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::open(dir.path().join("todos.db")).unwrap();
    lifecycle(app(Arc::new(store))).await;
}
