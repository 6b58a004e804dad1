//! Lifecycle phase of a sequencer run and its legal-transition table.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle phase of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
  #[default]
  Idle,
  Running,
  Paused,
  Completed,
}

/// Input to the phase machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
  Start,
  Pause,
  Resume,
  Reset,
  /// Fired by the scheduled callback once every step has been activated.
  Finish,
}

/// What a legal transition means for the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
  /// Begin a fresh run from cursor 0 (implicit reset).
  Restart,
  /// Continue from the current cursor.
  Continue,
  /// Keep the cursor, stop scheduling.
  Hold,
  /// Back to cursor 0, nothing scheduled.
  Clear,
  /// Run finished.
  Finish,
}

impl RunPhase {
  /// Legal-transition table. `None` means the control is a no-op in this phase.
  pub fn on(self, control: Control) -> Option<(RunPhase, Transition)> {
    use Control as C;
    use RunPhase as P;
    match (self, control) {
      (P::Idle | P::Completed, C::Start) => Some((P::Running, Transition::Restart)),
      (P::Paused, C::Start | C::Resume) => Some((P::Running, Transition::Continue)),
      (P::Running, C::Pause) => Some((P::Paused, Transition::Hold)),
      (P::Running, C::Finish) => Some((P::Completed, Transition::Finish)),
      (_, C::Reset) => Some((P::Idle, Transition::Clear)),
      _ => None,
    }
  }
}

impl fmt::Display for RunPhase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RunPhase::Idle => write!(f, "idle"),
      RunPhase::Running => write!(f, "running"),
      RunPhase::Paused => write!(f, "paused"),
      RunPhase::Completed => write!(f, "completed"),
    }
  }
}
