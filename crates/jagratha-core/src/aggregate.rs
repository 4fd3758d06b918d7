//! Derived rollups over the asset tree and alert store.
//!
//! Nothing here is stored. Every view is recomputed from the current tree and
//! store on each call, so it can never be stale relative to them.

use serde::{Deserialize, Serialize};

use crate::{alert_store::AlertStore, asset::AssetStatus, tree::AssetTree};

/// Per-status asset counts over every asset and descendant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
  pub online:   usize,
  pub warning:  usize,
  pub critical: usize,
  pub offline:  usize,
}

impl StatusCounts {
  pub fn get(&self, status: AssetStatus) -> usize {
    match status {
      AssetStatus::Online => self.online,
      AssetStatus::Warning => self.warning,
      AssetStatus::Critical => self.critical,
      AssetStatus::Offline => self.offline,
    }
  }

  fn bump(&mut self, status: AssetStatus) {
    let slot = match status {
      AssetStatus::Online => &mut self.online,
      AssetStatus::Warning => &mut self.warning,
      AssetStatus::Critical => &mut self.critical,
      AssetStatus::Offline => &mut self.offline,
    };
    *slot += 1;
  }

  pub fn total(&self) -> usize {
    AssetStatus::all().map(|s| self.get(s)).sum()
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemSummary {
  pub total_poles:        usize,
  pub total_sub_poles:    usize,
  pub active_alert_count: usize,
}

/// Everything an operator dashboard shows at a glance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateView {
  pub status_counts: StatusCounts,
  #[serde(flatten)]
  pub summary:       SystemSummary,
}

pub fn status_counts(tree: &AssetTree) -> StatusCounts {
  tree.flatten().into_iter().fold(StatusCounts::default(), |mut acc, a| {
    acc.bump(a.status);
    acc
  })
}

pub fn system_summary(tree: &AssetTree, alerts: &AlertStore) -> SystemSummary {
  SystemSummary {
    total_poles:        tree.pole_count(),
    total_sub_poles:    tree.sub_pole_count(),
    active_alert_count: alerts.active_count(),
  }
}

pub fn aggregate(tree: &AssetTree, alerts: &AlertStore) -> AggregateView {
  AggregateView {
    status_counts: status_counts(tree),
    summary:       system_summary(tree, alerts),
  }
}
