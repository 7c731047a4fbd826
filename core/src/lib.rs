//! Client core for the todo service.
//!
//! # Overview
//! Two layers, neither of which touches the network:
//! - `TodoClient` builds `HttpRequest` values and parses `HttpResponse`
//!   values for the four todo operations.
//! - `TodoList` holds the client's copy of the collection plus filter and
//!   edit state, validates input, applies optimistic changes, and reconciles
//!   them with the server's answers.
//!
//! The host (a terminal UI, a test, anything with an HTTP stack) executes
//! the requests in between.

pub mod client;
pub mod error;
pub mod http;
pub mod list;
pub mod types;

pub use client::TodoClient;
pub use error::{ApiError, ListError, ValidationError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use list::{filter_todos, PendingCall, PendingKind, TodoList};
pub use types::{CreateTodo, DeleteAck, Todo, UpdateTodo};
