//! Handler for `POST /reports` — operator-submitted issue reports.
//!
//! Body: `{"asset_id":"2-1","description":"Wire hanging low","kind":"physical_damage"}`.
//! `kind` is optional and defaults to `other`. Responds `201` with the new
//! alert.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jagratha_core::monitor::{AssetMonitor, ManualReport};

use crate::error::ApiError;

pub async fn create<S: AssetMonitor>(
  State(monitor): State<Arc<S>>,
  Json(report): Json<ManualReport>,
) -> Result<impl IntoResponse, ApiError> {
  let alert = monitor.submit_report(report).await?;
  Ok((StatusCode::CREATED, Json(alert)))
}
