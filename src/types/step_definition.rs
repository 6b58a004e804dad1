//! One step of a self-driven script.

use serde::{Deserialize, Serialize};

/// One step of a self-driven script. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDefinition {
  /// Unique within a run.
  pub id: String,
  pub title: String,
  pub description: String,
  /// Message shown while the step is active.
  pub payload: String,
  /// Phase label; consecutive steps with the same group render under one header.
  pub group: String,
  /// Participant that is active during this step (e.g. "callsign", "bank").
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub participant: Option<String>,
}

impl StepDefinition {
  pub fn new(
    id: impl Into<String>,
    title: impl Into<String>,
    description: impl Into<String>,
    payload: impl Into<String>,
    group: impl Into<String>,
  ) -> Self {
    Self {
      id: id.into(),
      title: title.into(),
      description: description.into(),
      payload: payload.into(),
      group: group.into(),
      participant: None,
    }
  }

  pub fn with_participant(mut self, participant: impl Into<String>) -> Self {
    self.participant = Some(participant.into());
    self
  }
}
