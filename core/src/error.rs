//! Error types for the todo client and its state store.
//!
//! # Design
//! `NotFound` means the request hit no route at all, usually a wrong base
//! URL: the todo endpoint itself never answers 404, it reports a missing
//! record as `null` or `deleted: false`.
//! Other non-2xx responses land in `Http` with the server's `error` message
//! when it sent one, or the raw body otherwise.
//!
//! `ValidationError` never reaches the network: it is raised before a
//! request is built.

use thiserror::Error;
use uuid::Uuid;

/// Errors returned by `TodoClient` build/parse methods.
#[derive(Error, Debug)]
pub enum ApiError {
    /// No route at the requested URL.
    #[error("no todo endpoint at this URL")]
    NotFound,

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),
}

/// Local precondition failures, reported to the user as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Todo cannot be empty")]
    Empty,

    #[error("Todo already exists: {0}")]
    Duplicate(String),

    #[error("no todo with id {0}")]
    UnknownTodo(Uuid),

    /// The todo's create call has not been confirmed, so the server does
    /// not know it by this id yet.
    #[error("todo {0} is still being saved")]
    Unconfirmed(Uuid),
}

/// Errors from `TodoList` operations.
#[derive(Error, Debug)]
pub enum ListError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),
}
