//! [`Engine`] — the in-memory implementation of [`AssetMonitor`].
//!
//! All state lives behind one read-write lock. Every mutation takes the write
//! half and runs to completion (tree update, then alert append, then
//! publish) before the next one starts, which gives alerts a total order.
//! Readers share the read half and always see a whole mutation or none of it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use jagratha_core::{
  Error, Result,
  aggregate::{self, AggregateView, StatusCounts, SystemSummary},
  alert::{Alert, AlertDraft, AlertId, AlertKind, AlertOrigin, AlertState},
  alert_store::{AlertArchive, AlertStore, Page},
  asset::{Asset, AssetId},
  evaluator::{self, Verdict},
  feed::AlertFeed,
  monitor::{AssetMonitor, ManualReport, Transition},
  observation::Observation,
  tree::AssetTree,
};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::fanout::AlertFanout;

// ─── State ───────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct MonitorState {
  tree:          AssetTree,
  alerts:        AlertStore,
  /// Sequence number for the next generated alert id.
  next_sequence: u64,
}

impl MonitorState {
  fn next_alert_id(&mut self, at: DateTime<Utc>) -> AlertId {
    let id = AlertId::generated(at, self.next_sequence);
    self.next_sequence += 1;
    id
  }

  /// Evaluate and apply one observation. Either the status update and any
  /// resulting alert both land, or nothing changes.
  fn apply(&mut self, observation: Observation) -> Result<(Transition, Verdict)> {
    let asset = self.tree.get(&observation.asset_id)?;
    let previous = asset.status;
    let verdict = evaluator::evaluate(previous, &observation, asset);

    let pending = match &verdict {
      Verdict::Raise(draft) => {
        let now = Utc::now();
        let id = self.next_alert_id(now);
        if self.alerts.contains(&id) {
          return Err(Error::DuplicateAlertId(id));
        }
        Some(draft.clone().into_alert(id, now))
      }
      _ => None,
    };

    self.tree.set_status(
      &observation.asset_id,
      observation.status,
      observation.observed_at,
    )?;
    let alert = match pending {
      Some(alert) => Some(self.alerts.append(alert)?.clone()),
      None => None,
    };

    let transition = Transition {
      asset_id: observation.asset_id,
      previous,
      current: observation.status,
      observed_at: observation.observed_at,
      alert,
    };
    Ok((transition, verdict))
  }

  fn record(&mut self, draft: AlertDraft) -> Result<Alert> {
    let now = Utc::now();
    let id = self.next_alert_id(now);
    Ok(self.alerts.append(draft.into_alert(id, now))?.clone())
  }
}

// ─── Engine ──────────────────────────────────────────────────────────────────

struct Inner {
  state:  RwLock<MonitorState>,
  fanout: AlertFanout,
}

/// The monitoring engine.
///
/// Cloning is cheap — clones share the same state and subscriber list.
#[derive(Clone)]
pub struct Engine {
  inner: Arc<Inner>,
}

impl Engine {
  /// An engine over `tree` with an empty alert log.
  pub fn new(tree: AssetTree) -> Self {
    Self::from_parts(tree, AlertStore::new())
  }

  /// An engine over `tree` pre-loaded with historical alerts, appended in the
  /// order given (oldest first). Every alert must reference an asset in the
  /// tree.
  pub fn with_alerts(tree: AssetTree, alerts: Vec<Alert>) -> Result<Self> {
    let mut store = AlertStore::new();
    for alert in alerts {
      if !tree.contains(&alert.asset_id) {
        return Err(Error::AssetNotFound(alert.asset_id));
      }
      store.append(alert)?;
    }
    Ok(Self::from_parts(tree, store))
  }

  fn from_parts(tree: AssetTree, alerts: AlertStore) -> Self {
    info!(
      assets = tree.len(),
      alerts = alerts.len(),
      "Engine initialised"
    );
    Self {
      inner: Arc::new(Inner {
        state:  RwLock::new(MonitorState { tree, alerts, next_sequence: 1 }),
        fanout: AlertFanout::new(),
      }),
    }
  }

  // ── Writes ─────────────────────────────────────────────────────────────────

  /// Apply a single observation.
  pub async fn apply(&self, observation: Observation) -> Result<Transition> {
    let mut state = self.inner.state.write().await;
    self.apply_locked(&mut state, observation)
  }

  /// Apply observations in submission order under one write section. The
  /// last status for an asset wins; every transition that warrants an alert
  /// raises one.
  pub async fn apply_batch(
    &self,
    batch: Vec<Observation>,
  ) -> Vec<Result<Transition>> {
    let mut state = self.inner.state.write().await;
    batch
      .into_iter()
      .map(|observation| self.apply_locked(&mut state, observation))
      .collect()
  }

  fn apply_locked(
    &self,
    state: &mut MonitorState,
    observation: Observation,
  ) -> Result<Transition> {
    let asset_id = observation.asset_id.clone();
    match state.apply(observation) {
      Ok((transition, verdict)) => {
        self.report(&transition, &verdict);
        Ok(transition)
      }
      Err(e @ Error::DuplicateAlertId(_)) => {
        error!(
          asset_id = %asset_id,
          error = %e,
          "Alert id collision, observation dropped"
        );
        Err(e)
      }
      Err(e) => {
        warn!(asset_id = %asset_id, error = %e, "Observation rejected");
        Err(e)
      }
    }
  }

  fn report(&self, transition: &Transition, verdict: &Verdict) {
    match verdict {
      Verdict::Raise(_) => {
        if let Some(alert) = &transition.alert {
          info!(
            alert_id = %alert.id,
            asset_id = %alert.asset_id,
            kind = %alert.kind,
            from = %transition.previous,
            to = %transition.current,
            "Alert raised"
          );
          self.inner.fanout.publish(alert);
        }
      }
      Verdict::Recovered { from, to } => {
        info!(asset_id = %transition.asset_id, %from, %to, "Asset recovered");
      }
      Verdict::Quiet | Verdict::Unchanged => {
        debug!(
          asset_id = %transition.asset_id,
          from = %transition.previous,
          to = %transition.current,
          "Status observed"
        );
      }
    }
  }

  /// Record an operator report as an active alert.
  pub async fn submit_report(&self, report: ManualReport) -> Result<Alert> {
    let description = report.description.trim();
    if description.is_empty() {
      return Err(Error::EmptyDescription);
    }

    let mut state = self.inner.state.write().await;
    let asset = state.tree.get(&report.asset_id)?;
    let draft = AlertDraft::for_asset(
      asset,
      report.kind.unwrap_or(AlertKind::Other),
      description,
      AlertOrigin::Manual,
    );
    let alert = state.record(draft).inspect_err(|e| {
      error!(asset_id = %report.asset_id, error = %e, "Failed to record report");
    })?;

    info!(
      alert_id = %alert.id,
      asset_id = %alert.asset_id,
      kind = %alert.kind,
      "Manual report recorded"
    );
    self.inner.fanout.publish(&alert);
    Ok(alert)
  }

  /// Resolve an alert; already-resolved alerts are returned unchanged.
  pub async fn resolve_alert(&self, id: &AlertId) -> Result<Alert> {
    let mut state = self.inner.state.write().await;
    let was_active = state.alerts.get(id)?.is_active();
    let alert = state.alerts.resolve(id, Utc::now())?;
    if was_active {
      info!(alert_id = %id, "Alert resolved");
    } else {
      debug!(alert_id = %id, "Alert already resolved");
    }
    Ok(alert)
  }

  /// Move resolved alerts created before `before` into `sink`.
  pub async fn archive_resolved(
    &self,
    before: DateTime<Utc>,
    sink: &dyn AlertArchive,
  ) -> usize {
    let moved = self.inner.state.write().await.alerts.archive_resolved(before, sink);
    if moved > 0 {
      info!(count = moved, %before, "Archived resolved alerts");
    }
    moved
  }

  // ── Reads ──────────────────────────────────────────────────────────────────

  /// Current asset ids in depth-first order.
  pub async fn asset_ids(&self) -> Vec<AssetId> {
    self.inner.state.read().await.tree.ids()
  }

  pub async fn tree(&self, filter: Option<&str>) -> AssetTree {
    let state = self.inner.state.read().await;
    match filter {
      Some(q) => state.tree.filter(q),
      None => state.tree.clone(),
    }
  }

  pub async fn asset(&self, id: &AssetId) -> Result<Asset> {
    self.inner.state.read().await.tree.get(id).cloned()
  }

  pub async fn status_counts(&self) -> StatusCounts {
    aggregate::status_counts(&self.inner.state.read().await.tree)
  }

  pub async fn system_summary(&self) -> SystemSummary {
    let state = self.inner.state.read().await;
    aggregate::system_summary(&state.tree, &state.alerts)
  }

  pub async fn aggregate(&self) -> AggregateView {
    let state = self.inner.state.read().await;
    aggregate::aggregate(&state.tree, &state.alerts)
  }

  pub async fn alerts(&self, state: Option<AlertState>, page: Page) -> Vec<Alert> {
    self.inner.state.read().await.alerts.list(state, page)
  }

  pub async fn alert(&self, id: &AlertId) -> Result<Alert> {
    self.inner.state.read().await.alerts.get(id).cloned()
  }

  pub fn subscribe(&self) -> AlertFeed { self.inner.fanout.subscribe() }
}

// ─── AssetMonitor impl ───────────────────────────────────────────────────────

impl AssetMonitor for Engine {
  async fn get_tree(&self, filter: Option<String>) -> Result<AssetTree> {
    Ok(self.tree(filter.as_deref()).await)
  }

  async fn get_asset(&self, id: AssetId) -> Result<Asset> {
    self.asset(&id).await
  }

  async fn aggregate(&self) -> Result<AggregateView> {
    Ok(Engine::aggregate(self).await)
  }

  async fn list_alerts(
    &self,
    state: Option<AlertState>,
    page: Page,
  ) -> Result<Vec<Alert>> {
    Ok(self.alerts(state, page).await)
  }

  async fn resolve_alert(&self, id: AlertId) -> Result<Alert> {
    Engine::resolve_alert(self, &id).await
  }

  async fn submit_report(&self, report: ManualReport) -> Result<Alert> {
    Engine::submit_report(self, report).await
  }

  async fn apply_observations(
    &self,
    batch: Vec<Observation>,
  ) -> Vec<Result<Transition>> {
    self.apply_batch(batch).await
  }

  fn subscribe_alerts(&self) -> AlertFeed { self.subscribe() }
}
