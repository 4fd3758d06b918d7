//! Status evaluator — decides what a status transition means.
//!
//! Evaluation is a pure function over the previous status, the incoming
//! observation and the asset it targets. Which transitions raise alerts, and
//! with which kind, is decided by [`RULES`]: the first row whose target status
//! and context both match wins. Adding a status/kind combination means adding
//! a row.

use crate::{
  alert::{AlertDraft, AlertKind, AlertOrigin},
  asset::{Asset, AssetStatus},
  observation::{Observation, Signal},
};

// ─── Rule table ──────────────────────────────────────────────────────────────

/// Circumstances around a transition that refine the alert kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
  /// Supply is gone: a power-loss signal, or every child of the asset is
  /// offline.
  Outage,
  Damage,
  Maintenance,
}

#[derive(Debug)]
pub struct Rule {
  pub target:      AssetStatus,
  /// `None` matches any context.
  pub context:     Option<Context>,
  pub kind:        AlertKind,
  pub description: &'static str,
}

const CRITICAL: &str = "New critical status detected";
const WARNING: &str = "New warning status detected, inspection recommended";

pub const RULES: &[Rule] = &[
  Rule {
    target:      AssetStatus::Critical,
    context:     Some(Context::Outage),
    kind:        AlertKind::PowerOutage,
    description: CRITICAL,
  },
  Rule {
    target:      AssetStatus::Critical,
    context:     Some(Context::Damage),
    kind:        AlertKind::PhysicalDamage,
    description: CRITICAL,
  },
  Rule {
    target:      AssetStatus::Critical,
    context:     None,
    kind:        AlertKind::Other,
    description: CRITICAL,
  },
  Rule {
    target:      AssetStatus::Warning,
    context:     Some(Context::Maintenance),
    kind:        AlertKind::MaintenanceRequired,
    description: "Maintenance required: new warning status detected",
  },
  Rule {
    target:      AssetStatus::Warning,
    context:     Some(Context::Damage),
    kind:        AlertKind::PhysicalDamage,
    description: WARNING,
  },
  Rule {
    target:      AssetStatus::Warning,
    context:     None,
    kind:        AlertKind::Other,
    description: WARNING,
  },
];

// ─── Verdict ─────────────────────────────────────────────────────────────────

/// Outcome of evaluating one observation.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
  /// Same status as before; nothing to raise.
  Unchanged,
  /// The transition warrants an alert.
  Raise(AlertDraft),
  /// Back from a degraded state. Worth logging, never alerted.
  Recovered { from: AssetStatus, to: AssetStatus },
  /// A change into an expected operational state.
  Quiet,
}

impl Verdict {
  pub fn alert(&self) -> Option<&AlertDraft> {
    match self {
      Self::Raise(draft) => Some(draft),
      _ => None,
    }
  }
}

// ─── Evaluation ──────────────────────────────────────────────────────────────

/// Evaluate `observation` against `asset`, whose recorded status before the
/// observation is `previous`.
pub fn evaluate(
  previous: AssetStatus,
  observation: &Observation,
  asset: &Asset,
) -> Verdict {
  evaluate_with(RULES, previous, observation, asset)
}

/// [`evaluate`] against a caller-supplied rule table.
pub fn evaluate_with(
  rules: &[Rule],
  previous: AssetStatus,
  observation: &Observation,
  asset: &Asset,
) -> Verdict {
  let next = observation.status;
  if next == previous {
    return Verdict::Unchanged;
  }

  let contexts = contexts(observation, asset);
  let rule = rules.iter().find(|r| {
    r.target == next && r.context.is_none_or(|c| contexts.contains(&c))
  });

  match rule {
    Some(rule) => Verdict::Raise(AlertDraft::for_asset(
      asset,
      rule.kind,
      rule.description,
      AlertOrigin::Evaluator,
    )),
    None if previous.is_degraded() && !next.is_degraded() => {
      Verdict::Recovered { from: previous, to: next }
    }
    None => Verdict::Quiet,
  }
}

fn contexts(observation: &Observation, asset: &Asset) -> Vec<Context> {
  let mut out = Vec::new();
  let children_dark = !asset.children.is_empty()
    && asset
      .children
      .iter()
      .all(|c| c.status == AssetStatus::Offline);

  if children_dark || observation.signal == Some(Signal::PowerLoss) {
    out.push(Context::Outage);
  }
  match observation.signal {
    Some(Signal::PhysicalDamage) => out.push(Context::Damage),
    Some(Signal::MaintenanceDue) => out.push(Context::Maintenance),
    Some(Signal::PowerLoss) | None => {}
  }
  out
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use AssetStatus::*;

  fn pole(status: AssetStatus, children: &[AssetStatus]) -> Asset {
    let kids = children
      .iter()
      .enumerate()
      .map(|(i, s)| {
        Asset::new(format!("p-{i}"), format!("Sub {i}"), "Street", *s, Utc::now())
      })
      .collect();
    Asset::new("p", "Pole", "Town", status, Utc::now()).with_children(kids)
  }

  fn obs(status: AssetStatus) -> Observation {
    Observation::new("p", status, Utc::now())
  }

  fn kind_of(v: &Verdict) -> Option<AlertKind> { v.alert().map(|d| d.kind) }

  #[test]
  fn same_status_is_unchanged() {
    for s in AssetStatus::all() {
      assert_eq!(evaluate(s, &obs(s), &pole(s, &[])), Verdict::Unchanged);
    }
  }

  #[test]
  fn critical_without_context_is_other() {
    let v = evaluate(Online, &obs(Critical), &pole(Online, &[Online]));
    let draft = v.alert().unwrap();
    assert_eq!(draft.kind, AlertKind::Other);
    assert_eq!(draft.description, "New critical status detected");
    assert_eq!(draft.origin, AlertOrigin::Evaluator);
    assert_eq!(draft.asset_name, "Pole");
  }

  #[test]
  fn critical_with_power_loss_is_outage() {
    let o = obs(Critical).with_signal(Signal::PowerLoss);
    let v = evaluate(Warning, &o, &pole(Warning, &[]));
    assert_eq!(kind_of(&v), Some(AlertKind::PowerOutage));
  }

  #[test]
  fn critical_with_all_children_offline_is_outage() {
    let v = evaluate(Online, &obs(Critical), &pole(Online, &[Offline, Offline]));
    assert_eq!(kind_of(&v), Some(AlertKind::PowerOutage));

    let v = evaluate(Online, &obs(Critical), &pole(Online, &[Offline, Online]));
    assert_eq!(kind_of(&v), Some(AlertKind::Other));
  }

  #[test]
  fn warning_defaults_to_other_and_honours_maintenance_signal() {
    let v = evaluate(Online, &obs(Warning), &pole(Online, &[]));
    assert_eq!(kind_of(&v), Some(AlertKind::Other));

    let o = obs(Warning).with_signal(Signal::MaintenanceDue);
    let v = evaluate(Online, &o, &pole(Online, &[]));
    assert_eq!(kind_of(&v), Some(AlertKind::MaintenanceRequired));
  }

  #[test]
  fn damage_signal_maps_to_physical_damage() {
    let o = obs(Critical).with_signal(Signal::PhysicalDamage);
    let v = evaluate(Online, &o, &pole(Online, &[]));
    assert_eq!(kind_of(&v), Some(AlertKind::PhysicalDamage));
  }

  #[test]
  fn recovery_is_logged_not_alerted() {
    for from in [Warning, Critical] {
      for to in [Online, Offline] {
        assert_eq!(
          evaluate(from, &obs(to), &pole(from, &[])),
          Verdict::Recovered { from, to }
        );
      }
    }
  }

  #[test]
  fn operational_transitions_are_quiet() {
    assert_eq!(evaluate(Online, &obs(Offline), &pole(Online, &[])), Verdict::Quiet);
    assert_eq!(evaluate(Offline, &obs(Online), &pole(Offline, &[])), Verdict::Quiet);
  }

  #[test]
  fn custom_table_extends_without_code_changes() {
    let rules = [Rule {
      target:      Offline,
      context:     None,
      kind:        AlertKind::PowerOutage,
      description: "went dark",
    }];
    let v = evaluate_with(&rules, Online, &obs(Offline), &pole(Online, &[]));
    assert_eq!(kind_of(&v), Some(AlertKind::PowerOutage));
  }
}
