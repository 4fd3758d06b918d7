//! Alert archival — periodically moving old resolved alerts out of the
//! engine.
//!
//! The engine never discards alerts on its own. When a retention period is
//! configured, [`run_retention`] hands resolved alerts older than that period
//! to an [`AlertArchive`] sink on a fixed interval.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use jagratha_core::{alert::Alert, alert_store::AlertArchive};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::Engine;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
  /// Resolved alerts older than this are archived. Archival is off when
  /// unset.
  pub retention_hours: Option<u64>,
  pub interval_secs:   u64,
}

impl Default for ArchiveConfig {
  fn default() -> Self { Self { retention_hours: None, interval_secs: 3600 } }
}

/// Writes one structured log record per archived alert.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingArchive;

impl AlertArchive for TracingArchive {
  fn archive(&self, alerts: Vec<Alert>) {
    for alert in alerts {
      info!(
        target: "jagratha::archive",
        alert_id = %alert.id,
        asset_id = %alert.asset_id,
        asset_name = %alert.asset_name,
        kind = %alert.kind,
        created_at = %alert.created_at,
        resolved_at = ?alert.resolved_at,
        description = %alert.description,
        "Archived alert"
      );
    }
  }
}

/// Archive on every tick until `cancel` fires. Returns immediately when no
/// retention period is configured.
pub async fn run_retention(
  engine: Engine,
  config: ArchiveConfig,
  sink: Arc<dyn AlertArchive>,
  cancel: CancellationToken,
) {
  let Some(hours) = config.retention_hours else {
    return;
  };
  let retention = chrono::Duration::hours(hours as i64);
  let mut interval =
    tokio::time::interval(Duration::from_secs(config.interval_secs.max(1)));
  interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

  info!(retention_hours = hours, "Alert retention started");
  loop {
    tokio::select! {
      biased;
      _ = cancel.cancelled() => break,
      _ = interval.tick() => {
        engine.archive_resolved(Utc::now() - retention, sink.as_ref()).await;
      }
    }
  }
}
