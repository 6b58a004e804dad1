//! Snapshot of a sequencer run, and its fractional progress.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::RunPhase;

/// Cursor over total, reported on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
  pub cursor: usize,
  pub total: usize,
}

impl Progress {
  /// `cursor / total`, or 0.0 for an empty script.
  pub fn fraction(&self) -> f64 {
    if self.total == 0 {
      0.0
    } else {
      self.cursor as f64 / self.total as f64
    }
  }
}

/// Read-only view of the sequencer state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunState {
  pub cursor: usize,
  pub phase: RunPhase,
  pub started_at: Option<DateTime<Utc>>,
  pub total: usize,
}

impl RunState {
  pub fn progress(&self) -> Progress {
    Progress {
      cursor: self.cursor,
      total: self.total,
    }
  }

  /// `cursor <= total`, `completed => cursor == total`, `idle => cursor == 0`.
  pub fn is_consistent(&self) -> bool {
    self.cursor <= self.total
      && (self.phase != RunPhase::Completed || self.cursor == self.total)
      && (self.phase != RunPhase::Idle || self.cursor == 0)
  }
}
