//! Alert records and their lifecycle.
//!
//! An alert snapshots the asset it was raised for, so later changes to the
//! asset never rewrite history. The only lifecycle transition is
//! `active → resolved`; a recurring problem raises a fresh alert.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{
  Error, Result,
  asset::{Asset, AssetId},
};

// ─── Identity ────────────────────────────────────────────────────────────────

/// Unique alert identifier.
///
/// Ids minted by [`AlertId::generated`] embed the creation time and a
/// per-engine sequence number, so creation order is recoverable from the id
/// alone. Ids from seed data are treated as opaque.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AlertId(String);

impl AlertId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  /// `alert-<unix millis>-<sequence>`.
  pub fn generated(created_at: DateTime<Utc>, sequence: u64) -> Self {
    Self(format!("alert-{}-{sequence}", created_at.timestamp_millis()))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for AlertId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for AlertId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

impl From<String> for AlertId {
  fn from(s: String) -> Self { Self(s) }
}

// ─── Classification ──────────────────────────────────────────────────────────

/// What kind of problem an alert describes. Independent of asset status; the
/// evaluator maps status transitions onto a kind.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AlertKind {
  PowerOutage,
  PhysicalDamage,
  MaintenanceRequired,
  #[default]
  Other,
}

impl AlertKind {
  pub fn parse(raw: &str) -> Result<Self> {
    Self::from_str(raw).map_err(|_| Error::InvalidAlertKind(raw.to_owned()))
  }
}

/// Where an alert came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertOrigin {
  /// Raised automatically from a status transition.
  Evaluator,
  /// Submitted by an operator.
  Manual,
}

// ─── Lifecycle ───────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AlertState {
  Active,
  Resolved,
}

impl AlertState {
  pub fn parse(raw: &str) -> Result<Self> {
    Self::from_str(raw).map_err(|_| Error::InvalidAlertState(raw.to_owned()))
  }
}

// ─── Alert ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
  pub id:          AlertId,
  pub asset_id:    AssetId,
  /// Asset name at creation time.
  pub asset_name:  String,
  pub kind:        AlertKind,
  pub description: String,
  pub created_at:  DateTime<Utc>,
  pub origin:      AlertOrigin,
  pub state:       AlertState,
  /// Set once, on the `active → resolved` transition.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub resolved_at: Option<DateTime<Utc>>,
}

impl Alert {
  pub fn is_active(&self) -> bool { self.state == AlertState::Active }

  /// Mark resolved. Returns `false` without touching anything when the alert
  /// was already resolved.
  pub(crate) fn resolve(&mut self, at: DateTime<Utc>) -> bool {
    if self.state == AlertState::Resolved {
      return false;
    }
    self.state = AlertState::Resolved;
    self.resolved_at = Some(at);
    true
  }
}

// ─── Draft ───────────────────────────────────────────────────────────────────

/// An alert that has been decided on but not yet given an id or timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertDraft {
  pub asset_id:    AssetId,
  pub asset_name:  String,
  pub kind:        AlertKind,
  pub description: String,
  pub origin:      AlertOrigin,
}

impl AlertDraft {
  /// A draft whose asset fields are snapshotted from `asset`.
  pub fn for_asset(
    asset: &Asset,
    kind: AlertKind,
    description: impl Into<String>,
    origin: AlertOrigin,
  ) -> Self {
    Self {
      asset_id: asset.id.clone(),
      asset_name: asset.name.clone(),
      kind,
      description: description.into(),
      origin,
    }
  }

  /// Finalise into an active [`Alert`].
  pub fn into_alert(self, id: AlertId, created_at: DateTime<Utc>) -> Alert {
    Alert {
      id,
      asset_id: self.asset_id,
      asset_name: self.asset_name,
      kind: self.kind,
      description: self.description,
      created_at,
      origin: self.origin,
      state: AlertState::Active,
      resolved_at: None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn generated_ids_embed_time_and_sequence() {
    let at = DateTime::<Utc>::from_timestamp_millis(1_684_161_000_000).unwrap();
    assert_eq!(
      AlertId::generated(at, 7).as_str(),
      "alert-1684161000000-7"
    );
  }

  #[test]
  fn kind_round_trips_through_text() {
    assert_eq!(
      AlertKind::parse("maintenance_required").unwrap(),
      AlertKind::MaintenanceRequired
    );
    assert_eq!(AlertKind::PowerOutage.to_string(), "power_outage");
    assert_eq!(
      AlertKind::parse("critical"),
      Err(Error::InvalidAlertKind("critical".into()))
    );
  }

  #[test]
  fn resolve_is_one_way() {
    let asset = Asset::new(
      "2",
      "Main Distribution Pole B",
      "Uptown",
      crate::asset::AssetStatus::Critical,
      Utc::now(),
    );
    let mut alert = AlertDraft::for_asset(
      &asset,
      AlertKind::PowerOutage,
      "Complete power outage",
      AlertOrigin::Manual,
    )
    .into_alert("102".into(), Utc::now());
    assert!(alert.is_active());

    let first = Utc::now();
    assert!(alert.resolve(first));
    assert!(!alert.resolve(first + chrono::Duration::seconds(5)));
    assert_eq!(alert.state, AlertState::Resolved);
    assert_eq!(alert.resolved_at, Some(first));
  }

  #[test]
  fn state_serialises_lowercase() {
    let v = serde_json::to_value(AlertState::Resolved).unwrap();
    assert_eq!(v, "resolved");
    assert_eq!(AlertState::parse("active").unwrap(), AlertState::Active);
    assert!(AlertState::parse("open").is_err());
  }
}
