//! Asset records — poles and the sub-poles hanging off them.
//!
//! An asset carries its own status and the timestamp of the last observation
//! that set it. Assets nest arbitrarily deep; the current fleet only ever uses
//! one level of children.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator as _};

use crate::{Error, Result};

// ─── Identity ────────────────────────────────────────────────────────────────

/// Opaque asset identifier, unique across the whole tree.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for AssetId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for AssetId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

impl From<String> for AssetId {
  fn from(s: String) -> Self { Self(s) }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Health of a single asset. Closed set; anything else is rejected at the
/// boundary with [`Error::InvalidStatus`].
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
  EnumIter,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AssetStatus {
  Online,
  Warning,
  Critical,
  Offline,
}

impl AssetStatus {
  /// Parse the lowercase textual form. Case and whitespace are not coerced.
  pub fn parse(raw: &str) -> Result<Self> {
    Self::from_str(raw).map_err(|_| Error::InvalidStatus(raw.to_owned()))
  }

  /// Every status, in declaration order.
  pub fn all() -> impl Iterator<Item = Self> { Self::iter() }

  /// `warning` and `critical` are the degraded states that raise alerts.
  pub fn is_degraded(self) -> bool {
    matches!(self, Self::Warning | Self::Critical)
  }
}

// ─── Asset ───────────────────────────────────────────────────────────────────

/// A monitored pole or sub-pole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
  pub id:           AssetId,
  pub name:         String,
  pub location:     String,
  pub status:       AssetStatus,
  /// Timestamp of the most recent status-setting observation.
  pub last_updated: DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub children:     Vec<Asset>,
}

impl Asset {
  /// A leaf asset with no children.
  pub fn new(
    id: impl Into<AssetId>,
    name: impl Into<String>,
    location: impl Into<String>,
    status: AssetStatus,
    last_updated: DateTime<Utc>,
  ) -> Self {
    Self {
      id: id.into(),
      name: name.into(),
      location: location.into(),
      status,
      last_updated,
      children: Vec::new(),
    }
  }

  pub fn with_children(mut self, children: Vec<Asset>) -> Self {
    self.children = children;
    self
  }

  /// Case-insensitive substring match over name or location.
  ///
  /// `needle` must already be lowercased.
  pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
    self.name.to_lowercase().contains(needle)
      || self.location.to_lowercase().contains(needle)
  }
}
