//! Demo configuration: JSON file, then environment, then CLI flags.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::DemoError;
use crate::{
  DEFAULT_API_URL, DEFAULT_COMPOSITE_DELAY_MS, DEFAULT_INITIAL_BALANCE, DEFAULT_STEP_DELAY_MS,
  MAX_STEP_DELAY_MS,
};

/// Overrides `api_url`.
pub const ENV_API_URL: &str = "STEPWEAVE_API_URL";
/// Overrides `step_delay_ms`.
pub const ENV_STEP_DELAY_MS: &str = "STEPWEAVE_STEP_DELAY_MS";

/// Settings for both driving modes and the trigger controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
  /// Pause between two activations of the self-driven sequencer.
  pub step_delay_ms: u64,
  /// Base URL of the backend that receives trigger requests.
  pub api_url: String,
  /// Pause between triggers of the composite "run all" action.
  pub composite_delay_ms: u64,
  pub spending_limit: f64,
  pub categories: Vec<String>,
  pub query: String,
  pub max_price: f64,
  /// Balance shown before any event arrives and after a reset.
  pub initial_balance: f64,
}

impl Default for DemoConfig {
  fn default() -> Self {
    Self {
      step_delay_ms: DEFAULT_STEP_DELAY_MS,
      api_url: DEFAULT_API_URL.to_string(),
      composite_delay_ms: DEFAULT_COMPOSITE_DELAY_MS,
      spending_limit: 5000.0,
      categories: vec!["electronics".to_string(), "home".to_string()],
      query: "laptop".to_string(),
      max_price: 2000.0,
      initial_balance: DEFAULT_INITIAL_BALANCE,
    }
  }
}

impl DemoConfig {
  /// Loads a config file; missing fields take their defaults.
  #[instrument(level = "trace", skip(path))]
  pub fn load(path: &Path) -> Result<Self, DemoError> {
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
  }

  /// Applies `STEPWEAVE_*` variables from the process environment. Only those names
  /// are read; unset or non-unicode values are skipped.
  pub fn apply_env(&mut self) -> Result<(), DemoError> {
    self.apply_lookup(|name| std::env::var(name).ok())
  }

  /// Applies the value `lookup` returns for each known variable name.
  pub fn apply_lookup<F>(&mut self, lookup: F) -> Result<(), DemoError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let vars = [ENV_API_URL, ENV_STEP_DELAY_MS]
      .into_iter()
      .filter_map(|name| lookup(name).map(|value| (name, value)));
    self.apply_overrides(vars)
  }

  /// Applies overrides from `(name, value)` pairs; unrelated names are ignored.
  pub fn apply_overrides<I, K, V>(&mut self, vars: I) -> Result<(), DemoError>
  where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
  {
    for (key, value) in vars {
      match key.as_ref() {
        ENV_API_URL => self.api_url = value.into(),
        ENV_STEP_DELAY_MS => {
          let raw: String = value.into();
          self.step_delay_ms = raw.trim().parse().map_err(|_| {
            DemoError::InvalidConfig(format!("{ENV_STEP_DELAY_MS} is not a number: {raw}"))
          })?;
        }
        _ => {}
      }
    }
    Ok(())
  }

  pub fn validate(&self) -> Result<(), DemoError> {
    if self.step_delay_ms == 0 {
      return Err(DemoError::InvalidConfig(
        "step_delay_ms must be greater than zero".to_string(),
      ));
    }
    if self.step_delay_ms > MAX_STEP_DELAY_MS {
      return Err(DemoError::InvalidConfig(format!(
        "step_delay_ms must be at most {MAX_STEP_DELAY_MS}, got {}",
        self.step_delay_ms
      )));
    }
    if self.api_url.trim().is_empty() {
      return Err(DemoError::InvalidConfig("api_url is empty".to_string()));
    }
    if self.max_price <= 0.0 {
      return Err(DemoError::InvalidConfig(format!(
        "max_price must be positive, got {}",
        self.max_price
      )));
    }
    Ok(())
  }

  pub fn step_delay(&self) -> Duration {
    Duration::from_millis(self.step_delay_ms)
  }

  pub fn composite_delay(&self) -> Duration {
    Duration::from_millis(self.composite_delay_ms)
  }
}
