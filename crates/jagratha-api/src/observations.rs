//! Handler for `POST /observations` — telemetry ingestion over HTTP.
//!
//! Body: a JSON array of raw observations,
//! `[{"asset_id":"1-1","status":"warning","signal":"maintenance_due"}]`.
//! Every status is validated before anything is applied, so one malformed
//! entry rejects the whole batch with `400`. Once validated the batch is
//! applied in order and each entry reports its own outcome.

use std::sync::Arc;

use axum::{Json, extract::State};
use chrono::Utc;
use jagratha_core::{
  asset::AssetId,
  monitor::{AssetMonitor, Transition},
  observation::{Observation, RawObservation},
};
use serde::Serialize;

use crate::error::ApiError;

/// Per-observation result in the response array.
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ObservationOutcome {
  Applied(Transition),
  Rejected { asset_id: AssetId, error: String },
}

pub async fn apply<S: AssetMonitor>(
  State(monitor): State<Arc<S>>,
  Json(raw): Json<Vec<RawObservation>>,
) -> Result<Json<Vec<ObservationOutcome>>, ApiError> {
  let now = Utc::now();
  let batch = raw
    .into_iter()
    .map(|r| r.validate(now))
    .collect::<Result<Vec<Observation>, _>>()?;

  let ids: Vec<AssetId> = batch.iter().map(|o| o.asset_id.clone()).collect();
  let outcomes = monitor
    .apply_observations(batch)
    .await
    .into_iter()
    .zip(ids)
    .map(|(result, asset_id)| match result {
      Ok(transition) => ObservationOutcome::Applied(transition),
      Err(e) => ObservationOutcome::Rejected { asset_id, error: e.to_string() },
    })
    .collect();
  Ok(Json(outcomes))
}
