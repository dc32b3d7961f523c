//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// A merge precondition failed; the request was well-formed but the
  /// store's current state refuses it.
  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

impl From<matchbook_pipeline::Error> for ApiError {
  fn from(e: matchbook_pipeline::Error) -> Self {
    use matchbook_core::Error as DomainError;
    match e {
      matchbook_pipeline::Error::Domain(DomainError::MatchNotFound(id)) => {
        ApiError::NotFound(format!("match {id} not found"))
      }
      matchbook_pipeline::Error::Domain(domain) => {
        ApiError::Conflict(domain.to_string())
      }
      matchbook_pipeline::Error::Store(inner) => ApiError::Store(inner),
    }
  }
}
