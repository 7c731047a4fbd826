//! HTTP endpoint for the todo collection.
//!
//! # Design
//! The router is stateless apart from the injected `SharedStore`; every
//! request is an independent store call with no locking across requests.
//! Concurrent writes to the same id resolve in the store's own write order.
//!
//! | Verb | Path | Result |
//! |---|---|---|
//! | GET | `/api/todo` | every todo, oldest first |
//! | POST | `/api/todo` | 201 + stored record |
//! | PUT | `/api/todo/{id}` | 200 + updated record, or `null` if nothing matched |
//! | DELETE | `/api/todo/{id}` | 200 + `{ "deleted": bool }` |
//! | anything else | either path | 405 + `Allow` |

pub mod config;
pub mod error;
pub mod model;
pub mod store;

use axum::{
    extract::{Path, State},
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub use config::{Config, StoreKind};
pub use error::ApiError;
pub use model::{DeleteAck, ErrorBody, NewTodo, Todo, TodoPatch};
pub use store::{MemoryStore, SharedStore, SqliteStore, StoreError, TodoStore};

pub const COLLECTION_PATH: &str = "/api/todo";

/// Verbs the todo resource answers, in `Allow` header order.
///
/// This is the whole resource's verb set, sent unchanged from both paths:
/// a 405 on `/api/todo/{id}` still lists GET and POST.
pub const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE";

pub fn app(store: SharedStore) -> Router {
    Router::new()
        .route(
            COLLECTION_PATH,
            get(list_todos)
                .post(create_todo)
                // `get` would otherwise answer HEAD too
                .head(method_not_allowed)
                .fallback(method_not_allowed),
        )
        .route(
            "/api/todo/{id}",
            put(update_todo).delete(delete_todo).fallback(method_not_allowed),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}

pub async fn serve(listener: TcpListener, store: SharedStore) -> Result<(), std::io::Error> {
    axum::serve(listener, app(store)).await
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

fn same_text(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

async fn list_todos(State(store): State<SharedStore>) -> Result<Json<Vec<Todo>>, ApiError> {
    Ok(Json(store.list().await?))
}

async fn create_todo(
    State(store): State<SharedStore>,
    Json(input): Json<NewTodo>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    if is_blank(&input.text) {
        tracing::debug!("rejecting empty todo");
        return Err(ApiError::EmptyText);
    }
    // list-then-insert: two concurrent creators can still race past this
    let existing = store.list().await?;
    if existing.iter().any(|t| same_text(&t.text, &input.text)) {
        tracing::info!(text = %input.text, "rejecting duplicate todo");
        return Err(ApiError::Duplicate(input.text));
    }

    let todo = store.insert(input).await?;
    tracing::info!(id = %todo.id, "created todo");
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn update_todo(
    State(store): State<SharedStore>,
    Path(id): Path<Uuid>,
    Json(patch): Json<TodoPatch>,
) -> Result<Json<Option<Todo>>, ApiError> {
    if patch.text.as_deref().is_some_and(is_blank) {
        return Err(ApiError::EmptyText);
    }
    let updated = store.update(id, patch).await?;
    if updated.is_none() {
        tracing::debug!(%id, "update matched no todo");
    }
    Ok(Json(updated))
}

async fn delete_todo(
    State(store): State<SharedStore>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteAck>, ApiError> {
    let deleted = store.delete(id).await?;
    tracing::debug!(%id, deleted, "delete");
    Ok(Json(DeleteAck { deleted }))
}

async fn method_not_allowed(method: Method) -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, ALLOWED_METHODS)],
        format!("Method {method} Not Allowed"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_whitespace_only() {
        assert!(is_blank(""));
        assert!(is_blank("  \t\n"));
        assert!(!is_blank(" x "));
    }

    #[test]
    fn duplicate_match_ignores_case_and_padding() {
        assert!(same_text("Buy milk", "buy MILK"));
        assert!(same_text("Buy milk", "  Buy milk "));
        assert!(!same_text("Buy milk", "Buy milks"));
    }
}
