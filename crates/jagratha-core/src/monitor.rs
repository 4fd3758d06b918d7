//! The `AssetMonitor` trait — the boundary the presentation layer calls.
//!
//! The trait is implemented by `jagratha-engine`. Transport adapters
//! (`jagratha-api`) depend on this abstraction, not on the engine.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Result,
  aggregate::AggregateView,
  alert::{Alert, AlertId, AlertKind, AlertState},
  alert_store::Page,
  asset::{Asset, AssetId, AssetStatus},
  feed::AlertFeed,
  observation::Observation,
  tree::AssetTree,
};

// ─── Inputs and outcomes ─────────────────────────────────────────────────────

/// An operator-submitted issue report.
#[derive(Debug, Clone, Deserialize)]
pub struct ManualReport {
  pub asset_id:    AssetId,
  pub description: String,
  /// Defaults to [`AlertKind::Other`].
  #[serde(default)]
  pub kind:        Option<AlertKind>,
}

impl ManualReport {
  pub fn new(asset_id: impl Into<AssetId>, description: impl Into<String>) -> Self {
    Self { asset_id: asset_id.into(), description: description.into(), kind: None }
  }

  pub fn with_kind(mut self, kind: AlertKind) -> Self {
    self.kind = Some(kind);
    self
  }
}

/// The effect of one applied observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transition {
  pub asset_id:    AssetId,
  pub previous:    AssetStatus,
  pub current:     AssetStatus,
  pub observed_at: DateTime<Utc>,
  /// The alert raised by this transition, if any.
  pub alert:       Option<Alert>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Operations the monitoring engine exposes.
///
/// Writes are totally ordered: each completes (status update, then alert
/// append) before the next begins. Reads see the result of the most recently
/// completed write.
pub trait AssetMonitor: Send + Sync {
  /// The asset tree, pruned to matches of `filter` and their ancestors when a
  /// filter is given.
  fn get_tree(
    &self,
    filter: Option<String>,
  ) -> impl Future<Output = Result<AssetTree>> + Send + '_;

  fn get_asset(
    &self,
    id: AssetId,
  ) -> impl Future<Output = Result<Asset>> + Send + '_;

  /// Status counts and system summary computed from one consistent snapshot.
  fn aggregate(&self) -> impl Future<Output = Result<AggregateView>> + Send + '_;

  /// Alerts most-recent-first, optionally restricted to one lifecycle state.
  fn list_alerts(
    &self,
    state: Option<AlertState>,
    page: Page,
  ) -> impl Future<Output = Result<Vec<Alert>>> + Send + '_;

  /// Resolve an alert. Resolving twice succeeds with unchanged state.
  fn resolve_alert(
    &self,
    id: AlertId,
  ) -> impl Future<Output = Result<Alert>> + Send + '_;

  /// Record an operator report as a new active alert, bypassing the
  /// evaluator.
  fn submit_report(
    &self,
    report: ManualReport,
  ) -> impl Future<Output = Result<Alert>> + Send + '_;

  /// Apply a batch of observations in order inside one write section. Each
  /// observation succeeds or fails on its own.
  fn apply_observations(
    &self,
    batch: Vec<Observation>,
  ) -> impl Future<Output = Vec<Result<Transition>>> + Send + '_;

  /// A new, independent feed of alerts created from now on.
  fn subscribe_alerts(&self) -> AlertFeed;
}
