//! Server configuration.
//!
//! Layered from an optional TOML file and `JAGRATHA_`-prefixed environment
//! variables, with `__` separating nested keys
//! (`JAGRATHA_SCHEDULER__INTERVAL_SECS=5`). Every field has a default, so an
//! empty configuration starts the demo fleet on `127.0.0.1:8080`.

use std::path::{Path, PathBuf};

use jagratha_engine::{archive::ArchiveConfig, scheduler::SchedulerConfig};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  /// JSON fleet seed. The built-in demo fleet is used when unset.
  pub fleet_path: Option<PathBuf>,
  pub scheduler:  SchedulerConfig,
  pub archive:    ArchiveConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "127.0.0.1".to_string(),
      port:       8080,
      fleet_path: None,
      scheduler:  SchedulerConfig::default(),
      archive:    ArchiveConfig::default(),
    }
  }
}

impl ServerConfig {
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    Self::from_sources(
      config::File::from(path).required(false),
      config::Environment::with_prefix("JAGRATHA")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true),
    )
  }

  fn from_sources<F, E>(file: F, env: E) -> Result<Self, config::ConfigError>
  where
    F: config::Source + Send + Sync + 'static,
    E: config::Source + Send + Sync + 'static,
  {
    config::Config::builder()
      .add_source(file)
      .add_source(env)
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use config::{Environment, File, FileFormat};
  use jagratha_engine::scheduler::Selector;

  use super::*;

  fn env(vars: &[(&str, &str)]) -> Environment {
    let map: HashMap<String, String> =
      vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    Environment::with_prefix("JAGRATHA")
      .prefix_separator("_")
      .separator("__")
      .try_parsing(true)
      .source(Some(map))
  }

  #[test]
  fn empty_sources_give_defaults() {
    let cfg = ServerConfig::from_sources(
      File::from_str("", FileFormat::Toml),
      env(&[]),
    )
    .unwrap();
    assert_eq!(cfg.address(), "127.0.0.1:8080");
    assert!(cfg.fleet_path.is_none());
    assert_eq!(cfg.scheduler.interval_secs, 10);
    assert!(cfg.archive.retention_hours.is_none());
  }

  #[test]
  fn toml_sets_nested_sections() {
    let toml = r#"
      port = 9000
      fleet_path = "fleet.json"

      [scheduler]
      selector = "round-robin"
      interval_secs = 30

      [archive]
      retention_hours = 48
    "#;
    let cfg =
      ServerConfig::from_sources(File::from_str(toml, FileFormat::Toml), env(&[]))
        .unwrap();
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.fleet_path.as_deref(), Some(Path::new("fleet.json")));
    assert_eq!(cfg.scheduler.selector, Selector::RoundRobin);
    assert_eq!(cfg.scheduler.interval_secs, 30);
    assert_eq!(cfg.archive.retention_hours, Some(48));
    assert_eq!(cfg.archive.interval_secs, 3600);
  }

  #[test]
  fn environment_overrides_file() {
    let cfg = ServerConfig::from_sources(
      File::from_str("port = 9000", FileFormat::Toml),
      env(&[
        ("JAGRATHA_PORT", "9100"),
        ("JAGRATHA_SCHEDULER__SEED", "7"),
        ("JAGRATHA_SCHEDULER__SELECTOR", "external-feed"),
      ]),
    )
    .unwrap();
    assert_eq!(cfg.port, 9100);
    assert_eq!(cfg.scheduler.seed, Some(7));
    assert_eq!(cfg.scheduler.selector, Selector::ExternalFeed);
  }

  #[test]
  fn unknown_selector_is_an_error() {
    let err = ServerConfig::from_sources(
      File::from_str("[scheduler]\nselector = \"sequential\"", FileFormat::Toml),
      env(&[]),
    );
    assert!(err.is_err());
  }
}
