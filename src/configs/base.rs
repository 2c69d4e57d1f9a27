use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{common::types::AnyResult, configs::*};

const CONFIG_CANDIDATES: &[&str] = &["config.toml", "config.default.toml"];

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
  #[serde(default)]
  pub server: ServerConfig,
  #[serde(default)]
  pub relay: RelayConfig,
  #[serde(default)]
  pub youtube: YouTubeConfig,
  #[serde(default)]
  pub logging: Option<LoggingConfig>,
}

impl Config {
  /// Loads the first config file found, falling back to built-in defaults,
  /// then applies environment overrides.
  pub fn load() -> AnyResult<Self> {
    let mut config = match CONFIG_CANDIDATES.iter().find(|p| Path::new(p).exists()) {
      Some(path) => {
        crate::log_println!("Loading configuration from: {}", path);
        Self::parse(&std::fs::read_to_string(path)?)?
      }
      None => {
        crate::log_println!("No config.toml found, using defaults");
        Self::default()
      }
    };

    config.apply_env(std::env::var("PORT").ok().as_deref())?;
    Ok(config)
  }

  pub fn parse(raw: &str) -> AnyResult<Self> {
    Ok(toml::from_str(raw)?)
  }

  /// `PORT` takes precedence over `server.port`.
  pub fn apply_env(&mut self, port: Option<&str>) -> AnyResult<()> {
    if let Some(port) = port.map(str::trim).filter(|p| !p.is_empty()) {
      self.server.port = port
        .parse()
        .map_err(|e| format!("Invalid PORT value '{}': {}", port, e))?;
    }
    Ok(())
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server.host, self.server.port)
  }
}
