//! Client-held todo state: the list, the filter, and the input/edit form.
//!
//! # Design
//! The server is the source of truth; `TodoList` is a cache of it. Every
//! mutating operation validates locally, applies its change optimistically,
//! and hands back exactly one `PendingCall` for the host to execute. When the
//! response arrives the host passes it to `reconcile`.
//!
//! A created todo carries a provisional id until its create call is
//! reconciled. The server cannot address it by that id, so update and delete
//! refuse it with `ValidationError::Unconfirmed` until then.
//!
//! Nothing is rolled back. A failed call leaves local state diverged from the
//! server until the next `load`, and a late response is applied even if a
//! newer local change has happened since.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::client::TodoClient;
use crate::error::{ApiError, ListError, ValidationError};
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{CreateTodo, Todo, UpdateTodo};

/// Which local change a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingKind {
    /// `provisional_id` is the client-generated id until the server answers.
    Create { provisional_id: Uuid },
    Update { id: Uuid },
    Delete { id: Uuid },
}

/// A request the host must execute, tagged with what to reconcile it against.
#[derive(Debug, Clone)]
pub struct PendingCall {
    pub kind: PendingKind,
    pub request: HttpRequest,
}

/// Todos whose text contains `needle`, ignoring case, in list order.
///
/// An empty needle matches everything.
pub fn filter_todos<'a>(todos: &'a [Todo], needle: &str) -> Vec<&'a Todo> {
    let needle = needle.to_lowercase();
    todos
        .iter()
        .filter(|t| t.text.to_lowercase().contains(&needle))
        .collect()
}

#[derive(Debug, Clone)]
pub struct TodoList {
    client: TodoClient,
    todos: Vec<Todo>,
    filter: String,
    draft: String,
    editing: Option<Uuid>,
    /// Provisional ids whose create call has not succeeded.
    unconfirmed: HashSet<Uuid>,
}

impl TodoList {
    pub fn new(client: TodoClient) -> Self {
        Self {
            client,
            todos: Vec::new(),
            filter: String::new(),
            draft: String::new(),
            editing: None,
            unconfirmed: HashSet::new(),
        }
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn get(&self, id: Uuid) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    fn position(&self, id: Uuid) -> Result<usize, ValidationError> {
        self.todos
            .iter()
            .position(|t| t.id == id)
            .ok_or(ValidationError::UnknownTodo(id))
    }

    /// Position of a todo the server already knows by `id`.
    fn confirmed_position(&self, id: Uuid) -> Result<usize, ValidationError> {
        let idx = self.position(id)?;
        if self.unconfirmed.contains(&id) {
            return Err(ValidationError::Unconfirmed(id));
        }
        Ok(idx)
    }

    /// Whether `id` is still waiting on its create call.
    pub fn is_unconfirmed(&self, id: Uuid) -> bool {
        self.unconfirmed.contains(&id)
    }

    /// Trimmed, non-empty and not already present (ignoring case). `except`
    /// excludes the todo being edited from the duplicate check.
    fn validate_text(&self, text: &str, except: Option<Uuid>) -> Result<String, ValidationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::Empty);
        }
        let lowered = text.to_lowercase();
        let clash = self
            .todos
            .iter()
            .filter(|t| Some(t.id) != except)
            .any(|t| t.text.trim().to_lowercase() == lowered);
        if clash {
            return Err(ValidationError::Duplicate(text.to_string()));
        }
        Ok(text.to_string())
    }

    // --- load ---

    pub fn load_request(&self) -> HttpRequest {
        self.client.build_list_todos()
    }

    /// Replace local state with the server's collection.
    pub fn apply_load(&mut self, response: HttpResponse) -> Result<(), ApiError> {
        self.todos = self.client.parse_list_todos(response)?;
        self.unconfirmed.clear();
        if let Some(id) = self.editing {
            if self.get(id).is_none() {
                self.cancel_edit();
            }
        }
        tracing::debug!(count = self.todos.len(), "loaded todos");
        Ok(())
    }

    // --- mutations ---

    /// Append a new todo with a provisional id and `now` as its timestamp.
    pub fn create(&mut self, text: &str, now: DateTime<Utc>) -> Result<PendingCall, ListError> {
        let text = self.validate_text(text, None).inspect_err(|e| {
            tracing::debug!(error = %e, "create rejected");
        })?;
        let request = self.client.build_create_todo(&CreateTodo { text: text.clone() })?;

        let provisional_id = Uuid::new_v4();
        self.unconfirmed.insert(provisional_id);
        self.todos.push(Todo {
            id: provisional_id,
            text,
            is_completed: false,
            created_at: now,
        });
        Ok(PendingCall {
            kind: PendingKind::Create { provisional_id },
            request,
        })
    }

    pub fn update(&mut self, id: Uuid, mut patch: UpdateTodo) -> Result<PendingCall, ListError> {
        let idx = self.confirmed_position(id)?;
        if let Some(text) = patch.text.take() {
            patch.text = Some(self.validate_text(&text, Some(id))?);
        }
        let request = self.client.build_update_todo(id, &patch)?;
        patch.apply_to(&mut self.todos[idx]);
        Ok(PendingCall {
            kind: PendingKind::Update { id },
            request,
        })
    }

    /// Flip the completion flag.
    pub fn toggle(&mut self, id: Uuid) -> Result<PendingCall, ListError> {
        let current = self.get(id).ok_or(ValidationError::UnknownTodo(id))?;
        let patch = UpdateTodo::completed(!current.is_completed);
        self.update(id, patch)
    }

    pub fn delete(&mut self, id: Uuid) -> Result<PendingCall, ListError> {
        let idx = self.confirmed_position(id)?;
        let request = self.client.build_delete_todo(id);
        self.todos.remove(idx);
        if self.editing == Some(id) {
            self.cancel_edit();
        }
        Ok(PendingCall {
            kind: PendingKind::Delete { id },
            request,
        })
    }

    /// Apply the server's answer to a previously issued call.
    ///
    /// On error the optimistic change stays in place.
    pub fn reconcile(&mut self, pending: &PendingCall, response: HttpResponse) -> Result<(), ApiError> {
        let result = self.reconcile_inner(pending.kind, response);
        if let Err(err) = &result {
            tracing::warn!(kind = ?pending.kind, error = %err, "call failed; local state diverged");
        }
        result
    }

    fn reconcile_inner(&mut self, kind: PendingKind, response: HttpResponse) -> Result<(), ApiError> {
        match kind {
            PendingKind::Create { provisional_id } => {
                let stored = self.client.parse_create_todo(response)?;
                self.unconfirmed.remove(&provisional_id);
                match self.todos.iter_mut().find(|t| t.id == provisional_id) {
                    Some(local) => {
                        if self.editing == Some(provisional_id) {
                            self.editing = Some(stored.id);
                        }
                        *local = stored;
                    }
                    None => {
                        tracing::debug!(%provisional_id, "created todo no longer held locally");
                    }
                }
            }
            PendingKind::Update { id } => match self.client.parse_update_todo(response)? {
                Some(stored) => {
                    if let Some(local) = self.todos.iter_mut().find(|t| t.id == id) {
                        *local = stored;
                    }
                }
                None => tracing::warn!(%id, "server has no todo for update"),
            },
            PendingKind::Delete { id } => {
                if !self.client.parse_delete_todo(response)? {
                    tracing::debug!(%id, "server had nothing to delete");
                }
            }
        }
        Ok(())
    }

    // --- filter ---

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// The list as the user sees it under the current filter.
    pub fn visible(&self) -> Vec<&Todo> {
        filter_todos(&self.todos, &self.filter)
    }

    // --- input form ---

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn editing(&self) -> Option<Uuid> {
        self.editing
    }

    /// Enter edit mode for `id`, pre-filling the draft with its text.
    pub fn begin_edit(&mut self, id: Uuid) -> Result<(), ValidationError> {
        let text = self
            .get(id)
            .map(|t| t.text.clone())
            .ok_or(ValidationError::UnknownTodo(id))?;
        self.editing = Some(id);
        self.draft = text;
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.draft.clear();
    }

    /// Submit the draft: an update in edit mode, a create otherwise. The
    /// draft and edit mode are cleared only when the call was issued.
    pub fn submit(&mut self, now: DateTime<Utc>) -> Result<PendingCall, ListError> {
        let draft = self.draft.clone();
        let pending = match self.editing {
            Some(id) => self.update(id, UpdateTodo::text(draft))?,
            None => self.create(&draft, now)?,
        };
        self.cancel_edit();
        Ok(pending)
    }
}
