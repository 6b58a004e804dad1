//! Status carried by a pushed step event.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Status carried by a pushed step event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
  Started,
  Completed,
  Failed,
}

impl StepStatus {
  /// Position along `started -> completed|failed`. Terminal statuses share a rank.
  pub fn rank(self) -> u8 {
    match self {
      StepStatus::Started => 0,
      StepStatus::Completed | StepStatus::Failed => 1,
    }
  }

  /// True when moving from `self` to `next` would go backwards.
  pub fn regresses_to(self, next: StepStatus) -> bool {
    next.rank() < self.rank()
  }

  /// Short human label used on rendered step cards.
  pub fn label(self) -> &'static str {
    match self {
      StepStatus::Started => "In Progress",
      StepStatus::Completed => "Completed",
      StepStatus::Failed => "Failed",
    }
  }
}

impl fmt::Display for StepStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      StepStatus::Started => write!(f, "started"),
      StepStatus::Completed => write!(f, "completed"),
      StepStatus::Failed => write!(f, "failed"),
    }
  }
}

impl FromStr for StepStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "started" => Ok(StepStatus::Started),
      "completed" => Ok(StepStatus::Completed),
      "failed" => Ok(StepStatus::Failed),
      other => Err(format!("unknown step status: {other}")),
    }
  }
}
