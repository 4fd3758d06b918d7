//! Error type for `jagratha-engine`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] jagratha_core::Error),

  #[error("failed to read fleet file {path:?}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("unknown selector: {0:?}")]
  InvalidSelector(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
