//! Pushed step events: the `step_update` wire form and its validated counterpart.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::StepStatus;
use crate::error::DemoError;

/// Event name carrying step updates on the push channel.
pub const STEP_UPDATE_EVENT: &str = "step_update";

/// Raw `step_update` body as delivered by the transport. Nothing is validated here;
/// see [StepEvent::try_from].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepUpdate {
  #[serde(default)]
  pub step: Option<String>,
  #[serde(default)]
  pub status: Option<String>,
  #[serde(default)]
  pub data: Option<Value>,
  /// Sender-side timestamp, informational only.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub timestamp: Option<String>,
}

/// A validated step event. The same `step_id` may arrive many times.
#[derive(Debug, Clone, PartialEq)]
pub struct StepEvent {
  pub step_id: String,
  pub status: StepStatus,
  pub payload: Map<String, Value>,
}

impl StepEvent {
  pub fn new(step_id: impl Into<String>, status: StepStatus) -> Self {
    Self {
      step_id: step_id.into(),
      status,
      payload: Map::new(),
    }
  }

  pub fn with_payload(mut self, payload: Value) -> Self {
    if let Value::Object(map) = payload {
      self.payload = map;
    }
    self
  }

  /// Parses a `step_update` body from an arbitrary JSON value.
  pub fn from_value(value: Value) -> Result<Self, DemoError> {
    let update: StepUpdate =
      serde_json::from_value(value).map_err(|e| DemoError::MalformedEvent(e.to_string()))?;
    Self::try_from(update)
  }
}

impl TryFrom<StepUpdate> for StepEvent {
  type Error = DemoError;

  fn try_from(update: StepUpdate) -> Result<Self, Self::Error> {
    let step_id = update
      .step
      .filter(|s| !s.is_empty())
      .ok_or_else(|| DemoError::MalformedEvent("missing 'step'".to_string()))?;
    let status = update
      .status
      .ok_or_else(|| DemoError::MalformedEvent(format!("missing 'status' for step {step_id}")))?
      .parse::<StepStatus>()
      .map_err(DemoError::MalformedEvent)?;
    let payload = match update.data {
      None | Some(Value::Null) => Map::new(),
      Some(Value::Object(map)) => map,
      Some(other) => {
        return Err(DemoError::MalformedEvent(format!(
          "'data' for step {step_id} is not an object: {other}"
        )));
      }
    };
    Ok(Self {
      step_id,
      status,
      payload,
    })
  }
}
