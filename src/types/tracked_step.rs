//! Latest known state of one step in push-driven mode.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use super::StepStatus;

/// Latest known status and payload for a step id. Updated in place; cleared only by
/// a reset of the whole run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedStep {
  pub step_id: String,
  /// Display label (known label or humanized id).
  pub label: String,
  pub latest_status: StepStatus,
  pub latest_payload: Map<String, Value>,
  pub first_seen_at: DateTime<Utc>,
  pub last_updated_at: DateTime<Utc>,
  /// Number of events applied to this entry.
  pub updates: u32,
}

impl TrackedStep {
  pub(crate) fn first(
    step_id: String,
    label: String,
    status: StepStatus,
    payload: Map<String, Value>,
    now: DateTime<Utc>,
  ) -> Self {
    Self {
      step_id,
      label,
      latest_status: status,
      latest_payload: payload,
      first_seen_at: now,
      last_updated_at: now,
      updates: 1,
    }
  }

  pub(crate) fn apply(&mut self, status: StepStatus, payload: Map<String, Value>, now: DateTime<Utc>) {
    self.latest_status = status;
    self.latest_payload = payload;
    self.last_updated_at = now;
    self.updates += 1;
  }
}
