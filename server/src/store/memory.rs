use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreResult, TodoStore};
use crate::model::{NewTodo, Todo, TodoPatch};

/// Ephemeral store for demos and tests. Nothing survives a restart.
///
/// Records are kept in insertion order, which is also creation order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    todos: RwLock<Vec<Todo>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn insert(&self, input: NewTodo) -> StoreResult<Todo> {
        let todo = Todo {
            id: Uuid::new_v4(),
            text: input.text,
            is_completed: false,
            created_at: Utc::now(),
        };
        self.todos.write().await.push(todo.clone());
        Ok(todo)
    }

    async fn list(&self) -> StoreResult<Vec<Todo>> {
        let mut todos = self.todos.read().await.clone();
        // stable: ties keep insertion order
        todos.sort_by_key(|t| t.created_at);
        Ok(todos)
    }

    async fn update(&self, id: Uuid, patch: TodoPatch) -> StoreResult<Option<Todo>> {
        let mut todos = self.todos.write().await;
        Ok(todos.iter_mut().find(|t| t.id == id).map(|todo| {
            patch.apply(todo);
            todo.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut todos = self.todos.write().await;
        let before = todos.len();
        todos.retain(|t| t.id != id);
        Ok(todos.len() != before)
    }
}
