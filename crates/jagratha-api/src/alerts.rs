//! Handlers for `/alerts` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/alerts` | Optional `?state=active\|resolved&limit=<n>&offset=<n>`; most recent first |
//! | `POST` | `/alerts/:id/resolve` | Idempotent; 404 if not found |
//! | `GET`  | `/alerts/stream` | Server-Sent Events, one `alert` event per new alert |

use std::{convert::Infallible, sync::Arc};

use axum::{
  Json,
  extract::{Path, Query, State},
  response::sse::{Event, KeepAlive, Sse},
};
use jagratha_core::{
  alert::{Alert, AlertId, AlertState},
  alert_store::Page,
  monitor::AssetMonitor,
};
use serde::Deserialize;
use tokio_stream::{Stream, StreamExt as _, wrappers::UnboundedReceiverStream};
use tracing::{debug, warn};

use crate::error::ApiError;

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Parsed strictly; anything but `active` or `resolved` is a 400.
  pub state:  Option<String>,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

/// `GET /alerts[?state=<state>&limit=<n>&offset=<n>]`
pub async fn list<S: AssetMonitor>(
  State(monitor): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Alert>>, ApiError> {
  let state = params.state.as_deref().map(AlertState::parse).transpose()?;
  let page = Page { limit: params.limit, offset: params.offset.unwrap_or(0) };
  Ok(Json(monitor.list_alerts(state, page).await?))
}

// ─── Resolve ─────────────────────────────────────────────────────────────────

/// `POST /alerts/:id/resolve`
pub async fn resolve_one<S: AssetMonitor>(
  State(monitor): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<Json<Alert>, ApiError> {
  Ok(Json(monitor.resolve_alert(AlertId::new(id)).await?))
}

// ─── Stream ──────────────────────────────────────────────────────────────────

/// `GET /alerts/stream`
///
/// Each connection gets its own subscription; alerts raised before the
/// connection opened are not replayed.
pub async fn stream<S: AssetMonitor>(
  State(monitor): State<Arc<S>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
  debug!("Alert stream opened");
  let feed = monitor.subscribe_alerts();
  let events = UnboundedReceiverStream::new(feed.into_inner()).filter_map(|alert| {
    match Event::default().event("alert").id(alert.id.as_str()).json_data(&alert) {
      Ok(event) => Some(Ok(event)),
      Err(e) => {
        warn!(alert_id = %alert.id, error = %e, "Failed to encode alert event");
        None
      }
    }
  });
  Sse::new(events).keep_alive(KeepAlive::default())
}
