//! Wire and storage types for the todo collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored todo. `id` and `created_at` are assigned by the store and never
/// change afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: Uuid,
    pub text: String,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Body of a create request. Only `text` is read; a client-supplied
/// completion flag or identifier is dropped on the floor.
#[derive(Debug, Deserialize)]
pub struct NewTodo {
    pub text: String,
}

/// Partial update. Absent fields keep their stored value.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoPatch {
    pub text: Option<String>,
    pub is_completed: Option<bool>,
}

impl TodoPatch {
    /// Merge the present fields into `todo`, one attribute at a time.
    pub fn apply(&self, todo: &mut Todo) {
        if let Some(text) = &self.text {
            todo.text.clone_from(text);
        }
        if let Some(is_completed) = self.is_completed {
            todo.is_completed = is_completed;
        }
    }
}

/// Acknowledgement returned by `DELETE /api/todo/{id}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteAck {
    pub deleted: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
