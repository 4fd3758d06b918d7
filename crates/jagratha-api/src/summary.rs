//! Handler for `GET /summary` — status counts plus system totals.

use std::sync::Arc;

use axum::{Json, extract::State};
use jagratha_core::{aggregate::AggregateView, monitor::AssetMonitor};

use crate::error::ApiError;

pub async fn handler<S: AssetMonitor>(
  State(monitor): State<Arc<S>>,
) -> Result<Json<AggregateView>, ApiError> {
  Ok(Json(monitor.aggregate().await?))
}
