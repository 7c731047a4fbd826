//! Handler errors and their HTTP mapping.
//!
//! Every failure leaves the endpoint as `{ "error": message }`. Store
//! failures are 500 with the underlying message and are never retried.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::model::ErrorBody;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("todo text cannot be empty")]
    EmptyText,

    #[error("todo already exists: {0}")]
    Duplicate(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::EmptyText => StatusCode::BAD_REQUEST,
            ApiError::Duplicate(_) => StatusCode::CONFLICT,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ApiError::Store(err) = &self {
            tracing::error!(error = %err, "store operation failed");
        }
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
