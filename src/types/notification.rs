//! Notifications emitted to renderers by the sequencer and the tracker.

use serde::Serialize;
use serde_json::{Map, Value};

use super::{
  Collaborator, Merchant, Product, Progress, PurchaseSummary, RunPhase, StepDefinition,
  TrackedStep,
};

/// Emitted by the self-driven sequencer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SequencerEvent {
  /// The step at `index` became active.
  StepActivated { index: usize, step: StepDefinition },
  /// The step at `index` is done.
  StepCompleted { index: usize },
  /// The activated step starts a new group (phase header).
  GroupEntered { group: String },
  PhaseChanged { from: RunPhase, to: RunPhase },
  Progress(Progress),
  /// Every step has been shown.
  Completed,
}

/// One accumulated result: a completed step with a non-empty payload.
#[derive(Debug, Clone, PartialEq, Serialize, serde::Deserialize)]
pub struct ResultEntry {
  pub step_id: String,
  pub label: String,
  pub payload: Map<String, Value>,
  pub recorded_at: chrono::DateTime<chrono::Utc>,
}

/// Connection state of the push channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
  Connected,
  Disconnected,
}

/// Emitted by the push-driven tracker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrackerNotification {
  /// The tracked entry for a step changed (created or updated).
  StepUpdated { step: TrackedStep, created: bool },
  /// Collaborator to highlight; `None` clears every highlight.
  Highlight {
    step_id: String,
    collaborator: Option<Collaborator>,
  },
  ResultAccumulated(ResultEntry),
  ProductsListed {
    merchant: Merchant,
    products: Vec<Product>,
  },
  PurchaseCompleted(PurchaseSummary),
  BalanceChanged { balance: f64 },
  RunFailed { reason: String },
  Connection { state: ConnectionState },
  /// The tracker was reset; renderers clear everything.
  Cleared { balance: f64 },
}

impl TrackerNotification {
  /// True for notifications tied to a specific recognized step id.
  pub fn is_specialized(&self) -> bool {
    matches!(
      self,
      TrackerNotification::ProductsListed { .. }
        | TrackerNotification::PurchaseCompleted(_)
        | TrackerNotification::BalanceChanged { .. }
        | TrackerNotification::RunFailed { .. }
    )
  }
}
