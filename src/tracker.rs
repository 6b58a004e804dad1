//! Push-driven step tracker.
//!
//! Keeps one [TrackedStep] per step id in arrival order, accumulates the results of
//! completed steps, and turns every accepted event into notifications for renderers.
//! Delivery may be out of order or repeated: statuses only move forward along
//! `started -> completed|failed`, and a backward event is dropped.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::DEFAULT_INITIAL_BALANCE;
use crate::types::{
  ConnectionState, KnownStep, NotificationKind, PurchaseSummary, RUN_LOG_VERSION, ResultEntry,
  RunLog, STEP_UPDATE_EVENT, StepEvent, StepStatus, TrackedStep, TrackerNotification,
  display_label, products_from_payload,
};

/// Tracker state for one run.
#[derive(Debug, Clone)]
pub struct StepTracker {
  entries: Vec<TrackedStep>,
  index: HashMap<String, usize>,
  results: Vec<ResultEntry>,
  initial_balance: f64,
  balance: f64,
  run_id: Uuid,
  started_at: Option<DateTime<Utc>>,
}

impl Default for StepTracker {
  fn default() -> Self {
    Self::new(DEFAULT_INITIAL_BALANCE)
  }
}

impl StepTracker {
  pub fn new(initial_balance: f64) -> Self {
    Self {
      entries: Vec::new(),
      index: HashMap::new(),
      results: Vec::new(),
      initial_balance,
      balance: initial_balance,
      run_id: Uuid::new_v4(),
      started_at: None,
    }
  }

  /// Tracked steps in first-seen order.
  pub fn steps(&self) -> &[TrackedStep] {
    &self.entries
  }

  pub fn get(&self, step_id: &str) -> Option<&TrackedStep> {
    self.index.get(step_id).map(|&i| &self.entries[i])
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn results(&self) -> &[ResultEntry] {
    &self.results
  }

  pub fn balance(&self) -> f64 {
    self.balance
  }

  pub fn run_id(&self) -> Uuid {
    self.run_id
  }

  pub fn started_at(&self) -> Option<DateTime<Utc>> {
    self.started_at
  }

  /// Dispatches one named event from the push channel. Malformed `step_update`
  /// bodies and unknown event names are logged and dropped.
  #[instrument(level = "trace", skip(self, data))]
  pub fn ingest(&mut self, name: &str, data: Value) -> Vec<TrackerNotification> {
    match name {
      STEP_UPDATE_EVENT => match StepEvent::from_value(data) {
        Ok(event) => self.record_event(event),
        Err(e) => {
          warn!(error = %e, "dropping step_update");
          Vec::new()
        }
      },
      "connect" | "connected" => {
        info!("push channel connected");
        vec![TrackerNotification::Connection {
          state: ConnectionState::Connected,
        }]
      }
      "disconnect" => {
        warn!("push channel disconnected");
        vec![TrackerNotification::Connection {
          state: ConnectionState::Disconnected,
        }]
      }
      other => {
        debug!(event = other, "ignoring event");
        Vec::new()
      }
    }
  }

  pub fn record_event(&mut self, event: StepEvent) -> Vec<TrackerNotification> {
    self.record_event_at(event, Utc::now())
  }

  /// Applies one event at time `now` and returns the notifications it produces.
  #[instrument(level = "trace", skip(self, event), fields(step_id = %event.step_id, status = %event.status))]
  pub fn record_event_at(
    &mut self,
    event: StepEvent,
    now: DateTime<Utc>,
  ) -> Vec<TrackerNotification> {
    if let Some(current) = self.get(&event.step_id)
      && current.latest_status.regresses_to(event.status)
    {
      warn!(
        current = %current.latest_status,
        "dropping out-of-order status"
      );
      return Vec::new();
    }

    let known = KnownStep::parse(&event.step_id);
    let StepEvent {
      step_id,
      status,
      payload,
    } = event;
    self.started_at.get_or_insert(now);

    let mut out = vec![TrackerNotification::Highlight {
      step_id: step_id.clone(),
      collaborator: known.and_then(KnownStep::collaborator),
    }];

    let (step, created) = match self.index.get(&step_id) {
      Some(&i) => {
        let entry = &mut self.entries[i];
        entry.apply(status, payload, now);
        (entry.clone(), false)
      }
      None => {
        let label = display_label(&step_id);
        let entry = TrackedStep::first(step_id.clone(), label, status, payload, now);
        self.index.insert(step_id.clone(), self.entries.len());
        self.entries.push(entry.clone());
        (entry, true)
      }
    };
    debug!(created, updates = step.updates, "step tracked");

    out.push(TrackerNotification::StepUpdated {
      step: step.clone(),
      created,
    });

    if status == StepStatus::Completed && !step.latest_payload.is_empty() {
      let entry = ResultEntry {
        step_id: step.step_id.clone(),
        label: step.label.clone(),
        payload: step.latest_payload.clone(),
        recorded_at: now,
      };
      self.results.push(entry.clone());
      out.push(TrackerNotification::ResultAccumulated(entry));
    }

    if let Some(known) = known {
      self.specialized(known, &step, &mut out);
    }
    out
  }

  fn specialized(&mut self, known: KnownStep, step: &TrackedStep, out: &mut Vec<TrackerNotification>) {
    let payload = &step.latest_payload;
    match known.notification_kind() {
      NotificationKind::ProductListing(merchant) => {
        if let Some(products) = products_from_payload(payload) {
          out.push(TrackerNotification::ProductsListed { merchant, products });
        }
      }
      NotificationKind::PurchaseSummary if step.latest_status == StepStatus::Completed => {
        match PurchaseSummary::from_payload(payload) {
          Some(summary) => out.push(TrackerNotification::PurchaseCompleted(summary)),
          None => warn!(step_id = %step.step_id, "purchase summary missing product or order"),
        }
      }
      NotificationKind::Failure if step.latest_status == StepStatus::Failed => {
        let reason = payload
          .get("error")
          .and_then(Value::as_str)
          .unwrap_or("unknown error")
          .to_string();
        warn!(%reason, "run failed");
        out.push(TrackerNotification::RunFailed { reason });
      }
      _ => {}
    }
    if let Some(balance) = payload.get("new_balance").and_then(Value::as_f64) {
      self.balance = balance;
      out.push(TrackerNotification::BalanceChanged { balance });
    }
  }

  /// Clears every tracked step and result and restores the initial balance. The push
  /// subscription is not part of the tracker and stays connected.
  #[instrument(level = "trace", skip(self))]
  pub fn reset(&mut self) -> Vec<TrackerNotification> {
    self.entries.clear();
    self.index.clear();
    self.results.clear();
    self.balance = self.initial_balance;
    self.started_at = None;
    self.run_id = Uuid::new_v4();
    info!(run_id = %self.run_id, "tracker reset");
    vec![TrackerNotification::Cleared {
      balance: self.balance,
    }]
  }

  /// Snapshot of the accumulated results as a log document.
  pub fn run_log(&self) -> RunLog {
    RunLog {
      version: RUN_LOG_VERSION,
      run_id: self.run_id,
      started_at: self.started_at.map(|t| t.to_rfc3339()),
      finished_at: None,
      balance: self.balance,
      entries: self.results.clone(),
    }
  }
}
