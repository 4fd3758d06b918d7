//! Error types for `jagratha-core`.

use thiserror::Error;

use crate::{alert::AlertId, asset::AssetId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
  #[error("asset not found: {0}")]
  AssetNotFound(AssetId),

  #[error("alert not found: {0}")]
  AlertNotFound(AlertId),

  #[error("duplicate asset id: {0}")]
  DuplicateAssetId(AssetId),

  #[error("duplicate alert id: {0}")]
  DuplicateAlertId(AlertId),

  #[error("invalid asset status: {0:?}")]
  InvalidStatus(String),

  #[error("invalid alert kind: {0:?}")]
  InvalidAlertKind(String),

  #[error("invalid alert state: {0:?}")]
  InvalidAlertState(String),

  #[error("report description must not be empty")]
  EmptyDescription,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
