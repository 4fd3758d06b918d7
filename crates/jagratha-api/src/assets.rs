//! Handlers for the asset hierarchy.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/tree` | Optional `?filter=<text>`, case-insensitive on name and location |
//! | `GET`  | `/assets/:id` | 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use jagratha_core::{
  asset::{Asset, AssetId},
  monitor::AssetMonitor,
  tree::AssetTree,
};
use serde::Deserialize;

use crate::error::ApiError;

// ─── Tree ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TreeParams {
  pub filter: Option<String>,
}

/// `GET /tree[?filter=<text>]`
pub async fn tree<S: AssetMonitor>(
  State(monitor): State<Arc<S>>,
  Query(params): Query<TreeParams>,
) -> Result<Json<AssetTree>, ApiError> {
  Ok(Json(monitor.get_tree(params.filter).await?))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /assets/:id`
pub async fn get_one<S: AssetMonitor>(
  State(monitor): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<Json<Asset>, ApiError> {
  Ok(Json(monitor.get_asset(AssetId::new(id)).await?))
}
