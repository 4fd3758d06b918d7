//! Observation sources for the update scheduler.
//!
//! A source is asked once per tick for the observations it has for that
//! tick. The synthetic sources pick from the current asset list; the external
//! source drains whatever a telemetry adapter has queued. Swapping sources
//! never touches the evaluator or the alert store.

use chrono::{DateTime, Utc};
use jagratha_core::{
  Result,
  asset::{AssetId, AssetStatus},
  observation::{Observation, RawObservation},
};
use rand::{SeedableRng as _, rngs::StdRng, seq::IndexedRandom as _};
use tokio::sync::mpsc;

/// Produces the observations for one scheduler tick.
pub trait ObservationSource: Send {
  /// `assets` is the current asset id list in depth-first order. Malformed
  /// input is returned per item so the scheduler can skip it and carry on.
  fn poll(
    &mut self,
    assets: &[AssetId],
    now: DateTime<Utc>,
  ) -> Vec<Result<Observation>>;

  /// Short name used in logs.
  fn name(&self) -> &'static str;
}

// ─── Uniform random ──────────────────────────────────────────────────────────

/// One observation per tick: a uniformly chosen asset set to a uniformly
/// chosen status.
#[derive(Debug)]
pub struct UniformRandom {
  rng:      StdRng,
  statuses: Vec<AssetStatus>,
}

impl UniformRandom {
  pub fn new(seed: Option<u64>) -> Self {
    let rng = match seed {
      Some(seed) => StdRng::seed_from_u64(seed),
      None => StdRng::from_os_rng(),
    };
    Self { rng, statuses: AssetStatus::all().collect() }
  }
}

impl ObservationSource for UniformRandom {
  fn poll(
    &mut self,
    assets: &[AssetId],
    now: DateTime<Utc>,
  ) -> Vec<Result<Observation>> {
    let Some(asset_id) = assets.choose(&mut self.rng) else {
      return Vec::new();
    };
    let status = self
      .statuses
      .choose(&mut self.rng)
      .copied()
      .unwrap_or(AssetStatus::Online);
    vec![Ok(Observation::new(asset_id.clone(), status, now))]
  }

  fn name(&self) -> &'static str { "uniform-random" }
}

// ─── Round robin ─────────────────────────────────────────────────────────────

/// One observation per tick, visiting assets in order. Every asset in a pass
/// gets the same status; the status advances through
/// `online → warning → critical → offline` once per full pass.
#[derive(Debug, Default)]
pub struct RoundRobin {
  cursor: usize,
  pass:   usize,
}

impl RoundRobin {
  pub fn new() -> Self { Self::default() }
}

impl ObservationSource for RoundRobin {
  fn poll(
    &mut self,
    assets: &[AssetId],
    now: DateTime<Utc>,
  ) -> Vec<Result<Observation>> {
    if assets.is_empty() {
      return Vec::new();
    }
    if self.cursor >= assets.len() {
      self.cursor = 0;
      self.pass += 1;
    }

    let statuses: Vec<AssetStatus> = AssetStatus::all().collect();
    let status = statuses[self.pass % statuses.len()];
    let asset_id = assets[self.cursor].clone();
    self.cursor += 1;
    vec![Ok(Observation::new(asset_id, status, now))]
  }

  fn name(&self) -> &'static str { "round-robin" }
}

// ─── External feed ───────────────────────────────────────────────────────────

/// Drains raw observations pushed through an [`ExternalFeedHandle`].
#[derive(Debug)]
pub struct ExternalFeed {
  rx: mpsc::UnboundedReceiver<RawObservation>,
}

/// Sending half of an [`ExternalFeed`]. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ExternalFeedHandle {
  tx: mpsc::UnboundedSender<RawObservation>,
}

impl ExternalFeed {
  pub fn channel() -> (Self, ExternalFeedHandle) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Self { rx }, ExternalFeedHandle { tx })
  }
}

impl ExternalFeedHandle {
  /// Queue an observation for the next tick. Returns it back if the feed has
  /// been dropped.
  pub fn submit(&self, raw: RawObservation) -> Result<(), RawObservation> {
    self.tx.send(raw).map_err(|e| e.0)
  }
}

impl ObservationSource for ExternalFeed {
  fn poll(
    &mut self,
    _assets: &[AssetId],
    now: DateTime<Utc>,
  ) -> Vec<Result<Observation>> {
    let mut out = Vec::new();
    while let Ok(raw) = self.rx.try_recv() {
      out.push(raw.validate(now));
    }
    out
  }

  fn name(&self) -> &'static str { "external-feed" }
}

#[cfg(test)]
mod tests {
  use jagratha_core::Error;

  use super::*;

  fn ids(n: usize) -> Vec<AssetId> {
    (0..n).map(|i| AssetId::new(i.to_string())).collect()
  }

  #[test]
  fn uniform_random_is_reproducible_with_seed() {
    let assets = ids(6);
    let now = Utc::now();
    let mut a = UniformRandom::new(Some(42));
    let mut b = UniformRandom::new(Some(42));
    for _ in 0..20 {
      assert_eq!(a.poll(&assets, now), b.poll(&assets, now));
    }
  }

  #[test]
  fn uniform_random_picks_known_assets() {
    let assets = ids(3);
    let mut source = UniformRandom::new(Some(7));
    for _ in 0..50 {
      let batch = source.poll(&assets, Utc::now());
      assert_eq!(batch.len(), 1);
      let obs = batch[0].as_ref().unwrap();
      assert!(assets.contains(&obs.asset_id));
    }
    assert!(source.poll(&[], Utc::now()).is_empty());
  }

  #[test]
  fn round_robin_visits_in_order_and_advances_status_per_pass() {
    let assets = ids(2);
    let mut source = RoundRobin::new();
    let seen: Vec<(String, AssetStatus)> = (0..6)
      .map(|_| {
        let obs = source.poll(&assets, Utc::now()).pop().unwrap().unwrap();
        (obs.asset_id.to_string(), obs.status)
      })
      .collect();
    assert_eq!(
      seen,
      [
        ("0".to_string(), AssetStatus::Online),
        ("1".to_string(), AssetStatus::Online),
        ("0".to_string(), AssetStatus::Warning),
        ("1".to_string(), AssetStatus::Warning),
        ("0".to_string(), AssetStatus::Critical),
        ("1".to_string(), AssetStatus::Critical),
      ]
    );
  }

  #[test]
  fn external_feed_drains_queue_and_flags_bad_entries() {
    let (mut feed, handle) = ExternalFeed::channel();
    handle
      .submit(RawObservation {
        asset_id:    "1".into(),
        status:      "critical".into(),
        observed_at: None,
        signal:      None,
      })
      .unwrap();
    handle
      .submit(RawObservation {
        asset_id:    "1".into(),
        status:      "on fire".into(),
        observed_at: None,
        signal:      None,
      })
      .unwrap();

    let batch = feed.poll(&[], Utc::now());
    assert_eq!(batch.len(), 2);
    assert_eq!(batch[0].as_ref().unwrap().status, AssetStatus::Critical);
    assert_eq!(
      batch[1].as_ref().unwrap_err(),
      &Error::InvalidStatus("on fire".into())
    );
    assert!(feed.poll(&[], Utc::now()).is_empty());
  }
}
