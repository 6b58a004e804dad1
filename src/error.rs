//! Error type shared by the sequencer, tracker, controller and file I/O.

use crate::controller::TriggerAction;

/// Errors raised by this crate.
///
/// Invalid state-machine transitions are not errors: they are silent no-ops.
#[derive(Debug, thiserror::Error)]
pub enum DemoError {
  #[error("invalid configuration: {0}")]
  InvalidConfig(String),

  #[error("duplicate step id in script: {0}")]
  DuplicateStepId(String),

  #[error("malformed event: {0}")]
  MalformedEvent(String),

  #[error("{action} request failed: {source}")]
  Transport {
    action: TriggerAction,
    #[source]
    source: reqwest::Error,
  },

  #[error("{action} request rejected with status {status}: {body}")]
  Rejected {
    action: TriggerAction,
    status: u16,
    body: String,
  },

  #[error("driver stopped")]
  DriverStopped,

  #[error(transparent)]
  Io(#[from] std::io::Error),

  #[error(transparent)]
  Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DemoError>;
