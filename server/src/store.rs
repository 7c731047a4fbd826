//! Persistence behind the todo endpoint.
//!
//! # Design
//! Handlers only see `dyn TodoStore`. The store owns identity and creation
//! time: `insert` assigns both and always starts the record incomplete.
//! `update` and `delete` report whether anything matched instead of failing,
//! leaving the no-op vs. error decision to the caller.

mod memory;
mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::model::{NewTodo, Todo, TodoPatch};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("stored record is corrupt: {0}")]
    Corrupt(String),
    #[error("store worker failed: {0}")]
    Worker(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub type SharedStore = Arc<dyn TodoStore>;

#[async_trait]
pub trait TodoStore: Send + Sync + 'static {
    /// Insert a new record and return it as stored.
    async fn insert(&self, input: NewTodo) -> StoreResult<Todo>;

    /// Every record, oldest first.
    async fn list(&self) -> StoreResult<Vec<Todo>>;

    /// Apply `patch` to the record with `id`. `None` when nothing matched.
    async fn update(&self, id: Uuid, patch: TodoPatch) -> StoreResult<Option<Todo>>;

    /// Remove the record with `id`. `false` when nothing matched.
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}
