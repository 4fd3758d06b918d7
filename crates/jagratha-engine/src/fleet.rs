//! Fleet seed — the initial asset tree and alert history an engine starts
//! from.
//!
//! Seeds are read from a JSON file shaped as
//! `{"assets": [<Asset>...], "alerts": [<Alert>...]}`. Without a file the
//! built-in demo fleet is used: three distribution poles with two sub-poles
//! each and three open alerts.

use std::path::Path;

use chrono::{DateTime, Utc};
use jagratha_core::{
  alert::{Alert, AlertKind, AlertOrigin, AlertState},
  asset::{Asset, AssetStatus},
  tree::AssetTree,
};
use serde::Deserialize;

use crate::{Engine, Error, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct FleetSeed {
  pub assets: AssetTree,
  #[serde(default)]
  pub alerts: Vec<Alert>,
}

impl FleetSeed {
  /// Read a seed from a JSON file.
  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
      .map_err(|source| Error::Io { path: path.to_path_buf(), source })?;
    Self::from_json(&raw)
  }

  pub fn from_json(raw: &str) -> Result<Self> { Ok(serde_json::from_str(raw)?) }

  /// Build an engine. Alerts are loaded oldest first regardless of their
  /// order in the seed.
  pub fn into_engine(mut self) -> Result<Engine> {
    self.alerts.sort_by_key(|a| a.created_at);
    Ok(Engine::with_alerts(self.assets, self.alerts)?)
  }

  /// The built-in demonstration fleet.
  pub fn demo() -> Self {
    use AssetStatus::{Critical, Offline, Online, Warning};

    let assets = vec![
      pole("1", "Main Distribution Pole A", "Downtown", Online, "14:30")
        .with_children(vec![
          pole("1-1", "Sub Pole A1", "Street 1", Warning, "14:25"),
          pole("1-2", "Sub Pole A2", "Street 2", Online, "14:30"),
        ]),
      pole("2", "Main Distribution Pole B", "Uptown", Critical, "13:45")
        .with_children(vec![
          pole("2-1", "Sub Pole B1", "Street 3", Offline, "13:40"),
          pole("2-2", "Sub Pole B2", "Street 4", Online, "14:00"),
        ]),
      pole("3", "Main Distribution Pole C", "Midtown", Online, "15:15")
        .with_children(vec![
          pole("3-1", "Sub Pole C1", "Street 5", Online, "15:10"),
          pole("3-2", "Sub Pole C2", "Street 6", Warning, "15:05"),
        ]),
    ];

    let alerts = vec![
      alert(
        ("101", "1-1", "Sub Pole A1"),
        AlertKind::Other,
        "Voltage fluctuation detected",
        "14:25",
        AlertOrigin::Evaluator,
      ),
      alert(
        ("102", "2", "Main Distribution Pole B"),
        AlertKind::PowerOutage,
        "Complete power outage",
        "13:45",
        AlertOrigin::Evaluator,
      ),
      alert(
        ("103", "3-2", "Sub Pole C2"),
        AlertKind::MaintenanceRequired,
        "Scheduled maintenance required",
        "15:05",
        AlertOrigin::Manual,
      ),
    ];

    Self {
      // Demo ids are unique by construction.
      assets: AssetTree::new(assets).unwrap_or_default(),
      alerts,
    }
  }
}

/// Demo timestamps are `HH:MM` on the day the fleet snapshot was taken.
fn ts(hh_mm: &str) -> DateTime<Utc> {
  DateTime::parse_from_rfc3339(&format!("2023-05-15T{hh_mm}:00Z"))
    .map(|dt| dt.with_timezone(&Utc))
    .unwrap_or_default()
}

fn pole(
  id: &str,
  name: &str,
  location: &str,
  status: AssetStatus,
  at: &str,
) -> Asset {
  Asset::new(id, name, location, status, ts(at))
}

fn alert(
  // (alert id, asset id, asset name)
  (id, asset_id, asset_name): (&str, &str, &str),
  kind: AlertKind,
  description: &str,
  at: &str,
  origin: AlertOrigin,
) -> Alert {
  Alert {
    id: id.into(),
    asset_id: asset_id.into(),
    asset_name: asset_name.into(),
    kind,
    description: description.into(),
    created_at: ts(at),
    origin,
    state: AlertState::Active,
    resolved_at: None,
  }
}
