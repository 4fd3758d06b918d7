//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use jagratha_core::Error as CoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),
}

impl From<CoreError> for ApiError {
  fn from(e: CoreError) -> Self {
    match e {
      CoreError::AssetNotFound(_) | CoreError::AlertNotFound(_) => {
        ApiError::NotFound(e.to_string())
      }
      CoreError::DuplicateAssetId(_) | CoreError::DuplicateAlertId(_) => {
        ApiError::Conflict(e.to_string())
      }
      CoreError::InvalidStatus(_)
      | CoreError::InvalidAlertKind(_)
      | CoreError::InvalidAlertState(_)
      | CoreError::EmptyDescription => ApiError::BadRequest(e.to_string()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
