//! The update scheduler — the periodic ingestion loop.
//!
//! [`UpdateScheduler`] runs as a background task. On every tick it asks its
//! [`ObservationSource`] for observations, applies them through the
//! [`Engine`] and lets the engine publish any alerts raised. A bad
//! observation is logged and skipped; the loop exits when its
//! [`CancellationToken`] is cancelled, after any in-flight tick completes.

use std::{str::FromStr, time::Duration};

use chrono::Utc;
use serde::Deserialize;
use strum::{Display, EnumString};
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
  Engine, Error,
  ingest::{
    ExternalFeed, ExternalFeedHandle, ObservationSource, RoundRobin,
    UniformRandom,
  },
};

/// Default tick period.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);

// ─── Configuration ───────────────────────────────────────────────────────────

/// How the scheduler picks what to observe.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Selector {
  #[default]
  UniformRandom,
  RoundRobin,
  ExternalFeed,
}

impl Selector {
  pub fn parse(raw: &str) -> Result<Self, Error> {
    Self::from_str(raw).map_err(|_| Error::InvalidSelector(raw.to_owned()))
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
  pub interval_secs: u64,
  pub selector:      Selector,
  /// Seed for the uniform-random selector; entropy from the OS when unset.
  pub seed:          Option<u64>,
}

impl Default for SchedulerConfig {
  fn default() -> Self {
    Self {
      interval_secs: DEFAULT_INTERVAL.as_secs(),
      selector:      Selector::default(),
      seed:          None,
    }
  }
}

impl SchedulerConfig {
  pub fn interval(&self) -> Duration {
    Duration::from_secs(self.interval_secs.max(1))
  }
}

// ─── Tick report ─────────────────────────────────────────────────────────────

/// What one tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
  pub applied: usize,
  pub raised:  usize,
  pub skipped: usize,
}

// ─── Scheduler ───────────────────────────────────────────────────────────────

pub struct UpdateScheduler {
  engine:   Engine,
  source:   Box<dyn ObservationSource>,
  interval: Duration,
}

impl UpdateScheduler {
  pub fn new(
    engine: Engine,
    source: Box<dyn ObservationSource>,
    interval: Duration,
  ) -> Self {
    Self { engine, source, interval }
  }

  /// Build a scheduler from configuration. The handle is returned only for
  /// the external-feed selector; it is how telemetry gets in.
  pub fn from_config(
    engine: Engine,
    config: &SchedulerConfig,
  ) -> (Self, Option<ExternalFeedHandle>) {
    let (source, handle): (Box<dyn ObservationSource>, _) = match config.selector {
      Selector::UniformRandom => (Box::new(UniformRandom::new(config.seed)), None),
      Selector::RoundRobin => (Box::new(RoundRobin::new()), None),
      Selector::ExternalFeed => {
        let (feed, handle) = ExternalFeed::channel();
        (Box::new(feed), Some(handle))
      }
    };
    (Self::new(engine, source, config.interval()), handle)
  }

  /// Run one tick: poll the source and apply what it produced.
  pub async fn tick(&mut self) -> TickReport {
    let assets = self.engine.asset_ids().await;
    let polled = self.source.poll(&assets, Utc::now());

    let mut report = TickReport::default();
    let mut batch = Vec::with_capacity(polled.len());
    for item in polled {
      match item {
        Ok(observation) => batch.push(observation),
        Err(e) => {
          warn!(
            source = self.source.name(),
            error = %e,
            "Skipping malformed observation"
          );
          report.skipped += 1;
        }
      }
    }

    for result in self.engine.apply_batch(batch).await {
      match result {
        Ok(transition) => {
          report.applied += 1;
          if transition.alert.is_some() {
            report.raised += 1;
          }
        }
        // Already logged by the engine.
        Err(_) => report.skipped += 1,
      }
    }
    report
  }

  /// Tick every `interval` until `cancel` fires. The first tick happens one
  /// interval after start.
  pub async fn run(mut self, cancel: CancellationToken) {
    let start = tokio::time::Instant::now() + self.interval;
    let mut interval = tokio::time::interval_at(start, self.interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
      source = self.source.name(),
      interval_secs = self.interval.as_secs(),
      "Update scheduler started"
    );

    loop {
      tokio::select! {
        biased;
        _ = cancel.cancelled() => {
          info!("Update scheduler stopped");
          break;
        }
        _ = interval.tick() => {
          let report = self.tick().await;
          debug!(
            applied = report.applied,
            raised = report.raised,
            skipped = report.skipped,
            "Scheduler tick"
          );
        }
      }
    }
  }

  pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(self.run(cancel))
  }
}

#[cfg(test)]
mod tests {
  use jagratha_core::{alert_store::Page, observation::RawObservation};

  use super::*;
  use crate::fleet::FleetSeed;

  fn engine() -> Engine { FleetSeed::demo().into_engine().unwrap() }

  fn raw(asset: &str, status: &str) -> RawObservation {
    RawObservation {
      asset_id:    asset.into(),
      status:      status.into(),
      observed_at: None,
      signal:      None,
    }
  }

  #[test]
  fn selector_parses_kebab_case() {
    assert_eq!(Selector::parse("round-robin").unwrap(), Selector::RoundRobin);
    assert_eq!(Selector::ExternalFeed.to_string(), "external-feed");
    assert!(matches!(
      Selector::parse("sequential"),
      Err(Error::InvalidSelector(_))
    ));
  }

  #[test]
  fn default_config_ticks_every_ten_seconds() {
    let config = SchedulerConfig::default();
    assert_eq!(config.interval(), Duration::from_secs(10));
    assert_eq!(config.selector, Selector::UniformRandom);
  }

  #[tokio::test]
  async fn bad_observations_are_skipped_and_good_ones_applied() {
    let engine = engine();
    let config = SchedulerConfig {
      selector: Selector::ExternalFeed,
      ..Default::default()
    };
    let (mut scheduler, handle) =
      UpdateScheduler::from_config(engine.clone(), &config);
    let handle = handle.unwrap();

    handle.submit(raw("1-2", "sparking")).unwrap();
    handle.submit(raw("no-such-pole", "critical")).unwrap();
    handle.submit(raw("1-2", "critical")).unwrap();

    let report = scheduler.tick().await;
    assert_eq!(report, TickReport { applied: 1, raised: 1, skipped: 2 });
    assert_eq!(
      engine.asset(&"1-2".into()).await.unwrap().status,
      jagratha_core::asset::AssetStatus::Critical
    );

    // The loop keeps going on the next tick.
    handle.submit(raw("1-2", "online")).unwrap();
    let report = scheduler.tick().await;
    assert_eq!(report, TickReport { applied: 1, raised: 0, skipped: 0 });
  }

  #[tokio::test(start_paused = true)]
  async fn run_publishes_alerts_and_stops_on_cancel() {
    let engine = engine();
    let mut feed = engine.subscribe();
    let config = SchedulerConfig {
      interval_secs: 10,
      selector:      Selector::ExternalFeed,
      seed:          None,
    };
    let (scheduler, handle) = UpdateScheduler::from_config(engine.clone(), &config);
    let handle = handle.unwrap();
    let cancel = CancellationToken::new();
    let task = scheduler.spawn(cancel.clone());

    handle.submit(raw("3-1", "warning")).unwrap();
    let alert = feed.recv().await.unwrap();
    assert_eq!(alert.asset_id.as_str(), "3-1");

    cancel.cancel();
    task.await.unwrap();
    assert_eq!(
      engine.alerts(None, Page::default()).await[0].id,
      alert.id
    );
  }

  #[tokio::test]
  async fn round_robin_scheduler_touches_first_asset() {
    let engine = engine();
    let config = SchedulerConfig {
      selector: Selector::RoundRobin,
      ..Default::default()
    };
    let (mut scheduler, handle) =
      UpdateScheduler::from_config(engine.clone(), &config);
    assert!(handle.is_none());

    let before = engine.asset(&"1".into()).await.unwrap().last_updated;
    let report = scheduler.tick().await;
    assert_eq!(report.applied, 1);
    assert!(engine.asset(&"1".into()).await.unwrap().last_updated > before);
  }
}
