//! Observations — the unit of input the evaluator consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Result,
  asset::{AssetId, AssetStatus},
};

/// A domain hint attached to an observation by the ingestion source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
  /// The source saw supply voltage drop to zero.
  PowerLoss,
  PhysicalDamage,
  MaintenanceDue,
}

/// A validated status reading for one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
  pub asset_id:    AssetId,
  pub status:      AssetStatus,
  pub observed_at: DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub signal:      Option<Signal>,
}

impl Observation {
  pub fn new(
    asset_id: impl Into<AssetId>,
    status: AssetStatus,
    observed_at: DateTime<Utc>,
  ) -> Self {
    Self { asset_id: asset_id.into(), status, observed_at, signal: None }
  }

  pub fn with_signal(mut self, signal: Signal) -> Self {
    self.signal = Some(signal);
    self
  }
}

/// An observation as it arrives from outside, with the status still
/// unvalidated text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
  pub asset_id:    AssetId,
  pub status:      String,
  /// Defaults to the time of validation when absent.
  #[serde(default)]
  pub observed_at: Option<DateTime<Utc>>,
  #[serde(default)]
  pub signal:      Option<Signal>,
}

impl RawObservation {
  /// Validate the status, failing with
  /// [`Error::InvalidStatus`](crate::Error::InvalidStatus) for anything
  /// outside the closed set.
  pub fn validate(self, now: DateTime<Utc>) -> Result<Observation> {
    Ok(Observation {
      status:      AssetStatus::parse(&self.status)?,
      asset_id:    self.asset_id,
      observed_at: self.observed_at.unwrap_or(now),
      signal:      self.signal,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Error;

  #[test]
  fn raw_observation_rejects_unknown_status() {
    let raw = RawObservation {
      asset_id:    "1".into(),
      status:      "melting".into(),
      observed_at: None,
      signal:      None,
    };
    assert_eq!(
      raw.validate(Utc::now()),
      Err(Error::InvalidStatus("melting".into()))
    );
  }

  #[test]
  fn raw_observation_defaults_timestamp() {
    let now = Utc::now();
    let raw: RawObservation = serde_json::from_str(
      r#"{"asset_id":"3-2","status":"warning","signal":"maintenance_due"}"#,
    )
    .unwrap();
    let obs = raw.validate(now).unwrap();
    assert_eq!(obs.status, AssetStatus::Warning);
    assert_eq!(obs.observed_at, now);
    assert_eq!(obs.signal, Some(Signal::MaintenanceDue));
  }
}
