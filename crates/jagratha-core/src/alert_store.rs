//! [`AlertStore`] — the append-only alert log.
//!
//! Alerts are kept in creation order internally and read back
//! most-recent-first. Resolution flips a flag on the stored record; nothing is
//! removed except through [`AlertStore::archive_resolved`], which hands
//! resolved alerts to an [`AlertArchive`] sink.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{
  Error, Result,
  alert::{Alert, AlertId, AlertState},
};

// ─── Paging ──────────────────────────────────────────────────────────────────

/// Caller-side pagination over a most-recent-first listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Page {
  /// Maximum number of alerts to return; `None` means no limit.
  pub limit:  Option<usize>,
  #[serde(default)]
  pub offset: usize,
}

impl Page {
  pub fn new(limit: usize, offset: usize) -> Self {
    Self { limit: Some(limit), offset }
  }
}

// ─── Archival hook ───────────────────────────────────────────────────────────

/// Receives alerts moved out of the store. Implementations decide where they
/// go; the store only guarantees they arrive oldest-first and are resolved.
pub trait AlertArchive: Send + Sync {
  fn archive(&self, alerts: Vec<Alert>);
}

// ─── Store ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct AlertStore {
  /// Oldest first.
  alerts:   Vec<Alert>,
  index:    HashMap<AlertId, usize>,
  /// Ids moved out by archival. They stay reserved.
  archived: HashSet<AlertId>,
}

impl AlertStore {
  pub fn new() -> Self { Self::default() }

  pub fn len(&self) -> usize { self.alerts.len() }

  pub fn is_empty(&self) -> bool { self.alerts.is_empty() }

  /// Whether `id` is taken, by a stored alert or an archived one.
  pub fn contains(&self, id: &AlertId) -> bool {
    self.index.contains_key(id) || self.archived.contains(id)
  }

  /// Add an alert as the newest entry. Fails without side effects if the id
  /// is already taken, including by an alert that has since been archived.
  pub fn append(&mut self, alert: Alert) -> Result<&Alert> {
    if self.contains(&alert.id) {
      return Err(Error::DuplicateAlertId(alert.id));
    }
    self.index.insert(alert.id.clone(), self.alerts.len());
    self.alerts.push(alert);
    Ok(&self.alerts[self.alerts.len() - 1])
  }

  pub fn get(&self, id: &AlertId) -> Result<&Alert> {
    self
      .index
      .get(id)
      .map(|&i| &self.alerts[i])
      .ok_or_else(|| Error::AlertNotFound(id.clone()))
  }

  /// Resolve an alert and return its post-resolution state. Resolving an
  /// already-resolved alert succeeds and changes nothing.
  pub fn resolve(&mut self, id: &AlertId, at: DateTime<Utc>) -> Result<Alert> {
    let i = *self
      .index
      .get(id)
      .ok_or_else(|| Error::AlertNotFound(id.clone()))?;
    let alert = &mut self.alerts[i];
    alert.resolve(at);
    Ok(alert.clone())
  }

  /// Most-recent-first view, optionally restricted to one lifecycle state.
  pub fn iter_recent(
    &self,
    state: Option<AlertState>,
  ) -> impl Iterator<Item = &Alert> {
    self
      .alerts
      .iter()
      .rev()
      .filter(move |a| state.is_none_or(|s| a.state == s))
  }

  pub fn list(&self, state: Option<AlertState>, page: Page) -> Vec<Alert> {
    self
      .iter_recent(state)
      .skip(page.offset)
      .take(page.limit.unwrap_or(usize::MAX))
      .cloned()
      .collect()
  }

  pub fn list_active(&self) -> Vec<Alert> {
    self.list(Some(AlertState::Active), Page::default())
  }

  pub fn list_all(&self, page: Page) -> Vec<Alert> { self.list(None, page) }

  pub fn active_count(&self) -> usize {
    self.alerts.iter().filter(|a| a.is_active()).count()
  }

  /// Move resolved alerts created before `before` into `sink`. Active alerts
  /// always stay. Returns how many were moved.
  pub fn archive_resolved(
    &mut self,
    before: DateTime<Utc>,
    sink: &dyn AlertArchive,
  ) -> usize {
    let (archived, kept): (Vec<Alert>, Vec<Alert>) =
      std::mem::take(&mut self.alerts)
        .into_iter()
        .partition(|a| !a.is_active() && a.created_at < before);

    self.alerts = kept;
    self.archived.extend(archived.iter().map(|a| a.id.clone()));
    self.index = self
      .alerts
      .iter()
      .enumerate()
      .map(|(i, a)| (a.id.clone(), i))
      .collect();

    let moved = archived.len();
    if moved > 0 {
      sink.archive(archived);
    }
    moved
  }
}
