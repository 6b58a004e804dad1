//! DTOs for results.log.json: the results accumulated by a tracked run.

use serde::{Deserialize, Serialize};

use super::{ResultEntry, TrackerNotification};

/// Current log format version.
pub const RUN_LOG_VERSION: u32 = 1;

/// Root structure for results.log.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunLog {
  /// Log format version.
  pub version: u32,
  /// Identifier of the tracked run (new on every reset).
  pub run_id: uuid::Uuid,
  /// ISO 8601 timestamp of the first event in the run (None if nothing arrived).
  pub started_at: Option<String>,
  /// ISO 8601 timestamp when the log was finalized (None while in progress).
  pub finished_at: Option<String>,
  /// Final balance reported by the run.
  pub balance: f64,
  /// Accumulated results in arrival order.
  pub entries: Vec<ResultEntry>,
}

impl RunLog {
  /// Mirrors a tracker notification into this log. Returns true when the entries
  /// changed, i.e. when a rewritten log file would differ in its results.
  pub fn follow(&mut self, notification: &TrackerNotification) -> bool {
    match notification {
      TrackerNotification::StepUpdated { step, .. } => {
        if self.started_at.is_none() {
          self.started_at = Some(step.first_seen_at.to_rfc3339());
        }
        false
      }
      TrackerNotification::ResultAccumulated(entry) => {
        self.entries.push(entry.clone());
        true
      }
      TrackerNotification::BalanceChanged { balance } => {
        self.balance = *balance;
        false
      }
      TrackerNotification::Cleared { balance } => {
        self.entries.clear();
        self.started_at = None;
        self.balance = *balance;
        true
      }
      _ => false,
    }
  }
}
