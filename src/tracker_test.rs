//! Tests for `StepTracker`.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;

use crate::tracker::StepTracker;
use crate::types::{
  Collaborator, ConnectionState, Merchant, StepEvent, StepStatus, TrackerNotification,
};

fn t(secs: i64) -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2026, 2, 14, 10, 0, 0).unwrap() + Duration::seconds(secs)
}

fn results(out: &[TrackerNotification]) -> usize {
  out
    .iter()
    .filter(|n| matches!(n, TrackerNotification::ResultAccumulated(_)))
    .count()
}

fn highlight(out: &[TrackerNotification]) -> Option<Collaborator> {
  out.iter().find_map(|n| match n {
    TrackerNotification::Highlight { collaborator, .. } => Some(*collaborator),
    _ => None,
  })?
}

#[test]
fn started_then_completed_is_one_entry_and_one_result() {
  let mut tracker = StepTracker::default();
  let a = tracker.record_event_at(StepEvent::new("a", StepStatus::Started), t(0));
  let b = tracker.record_event_at(
    StepEvent::new("a", StepStatus::Completed).with_payload(json!({"amount": 100})),
    t(1),
  );
  assert_eq!(tracker.len(), 1);
  let step = tracker.get("a").unwrap();
  assert_eq!(step.latest_status, StepStatus::Completed);
  assert_eq!(step.first_seen_at, t(0));
  assert_eq!(step.last_updated_at, t(1));
  assert_eq!(step.updates, 2);
  assert_eq!(results(&a) + results(&b), 1);
  assert_eq!(tracker.results().len(), 1);
}

#[test]
fn step_updated_reports_creation() {
  let mut tracker = StepTracker::default();
  let first = tracker.record_event_at(StepEvent::new("a", StepStatus::Started), t(0));
  let second = tracker.record_event_at(StepEvent::new("a", StepStatus::Completed), t(1));
  assert!(first.iter().any(|n| matches!(n, TrackerNotification::StepUpdated { created: true, .. })));
  assert!(second.iter().any(|n| matches!(n, TrackerNotification::StepUpdated { created: false, .. })));
}

#[test]
fn completed_without_payload_accumulates_nothing() {
  let mut tracker = StepTracker::default();
  let out = tracker.record_event_at(StepEvent::new("a", StepStatus::Completed), t(0));
  assert_eq!(results(&out), 0);
}

#[test]
fn unrecognized_step_is_tracked_generically() {
  let mut tracker = StepTracker::default();
  let out = tracker.record_event_at(
    StepEvent::new("custom_step_x", StepStatus::Completed).with_payload(json!({"new_balance": 1.0})),
    t(0),
  );
  assert_eq!(tracker.get("custom_step_x").unwrap().label, "Custom Step X");
  assert!(!out.iter().any(TrackerNotification::is_specialized));
  assert_eq!(highlight(&out), None);
  assert_eq!(tracker.balance(), 15000.0);
}

#[test]
fn known_step_highlights_its_collaborator() {
  let mut tracker = StepTracker::default();
  let out = tracker.record_event_at(StepEvent::new("payment_token", StepStatus::Started), t(0));
  assert_eq!(highlight(&out), Some(Collaborator::Hsm));
  let out = tracker.record_event_at(StepEvent::new("app_download", StepStatus::Started), t(0));
  assert_eq!(highlight(&out), None);
  assert_eq!(
    tracker.get("app_download").unwrap().label,
    "App Download & Installation"
  );
}

#[test]
fn backward_status_is_dropped() {
  let mut tracker = StepTracker::default();
  tracker.record_event_at(
    StepEvent::new("a", StepStatus::Completed).with_payload(json!({"amount": 1})),
    t(0),
  );
  let out = tracker.record_event_at(StepEvent::new("a", StepStatus::Started), t(5));
  assert!(out.is_empty());
  let step = tracker.get("a").unwrap();
  assert_eq!(step.latest_status, StepStatus::Completed);
  assert_eq!(step.last_updated_at, t(0));
  assert_eq!(step.latest_payload["amount"], 1);
}

#[test]
fn terminal_to_terminal_applies() {
  let mut tracker = StepTracker::default();
  tracker.record_event_at(StepEvent::new("a", StepStatus::Completed), t(0));
  tracker.record_event_at(StepEvent::new("a", StepStatus::Failed), t(1));
  assert_eq!(tracker.get("a").unwrap().latest_status, StepStatus::Failed);
}

#[test]
fn reset_clears_and_next_event_is_first_seen() {
  let mut tracker = StepTracker::new(15000.0);
  let run_before = tracker.run_id();
  tracker.record_event_at(
    StepEvent::new("bank_transaction", StepStatus::Completed)
      .with_payload(json!({"new_balance": 13201.0})),
    t(0),
  );
  assert_eq!(tracker.balance(), 13201.0);
  let out = tracker.reset();
  assert_eq!(out, vec![TrackerNotification::Cleared { balance: 15000.0 }]);
  assert!(tracker.is_empty());
  assert!(tracker.results().is_empty());
  assert_eq!(tracker.balance(), 15000.0);
  assert!(tracker.started_at().is_none());
  assert_ne!(tracker.run_id(), run_before);

  tracker.record_event_at(StepEvent::new("bank_transaction", StepStatus::Started), t(30));
  let step = tracker.get("bank_transaction").unwrap();
  assert_eq!(step.first_seen_at, t(30));
  assert_eq!(step.updates, 1);
}

#[test]
fn search_step_lists_products() {
  let mut tracker = StepTracker::default();
  let out = tracker.record_event_at(
    StepEvent::new("search_bestbuy", StepStatus::Completed).with_payload(json!({"products": [
      {"id": "BB001", "name": "MacBook Air M2", "price": 1799, "category": "electronics", "rating": 4.8}
    ]})),
    t(0),
  );
  let listed = out.iter().find_map(|n| match n {
    TrackerNotification::ProductsListed { merchant, products } => Some((*merchant, products.len())),
    _ => None,
  });
  assert_eq!(listed, Some((Merchant::BestBuy, 1)));
}

#[test]
fn purchase_complete_emits_summary_and_balance() {
  let mut tracker = StepTracker::default();
  let out = tracker.record_event_at(
    StepEvent::new("purchase_complete", StepStatus::Completed).with_payload(json!({
      "product": {"id": "BB001", "name": "MacBook Air M2", "price": 1799},
      "order": {"order_id": "BES_1a2b3c4d", "estimated_delivery": "2026-02-16"},
      "new_balance": 13201.0
    })),
    t(0),
  );
  let summary = out.iter().find_map(|n| match n {
    TrackerNotification::PurchaseCompleted(s) => Some(s.clone()),
    _ => None,
  });
  let summary = summary.expect("purchase summary");
  assert_eq!(summary.order_id, "BES_1a2b3c4d");
  assert!(out.contains(&TrackerNotification::BalanceChanged { balance: 13201.0 }));
  assert_eq!(tracker.balance(), 13201.0);
}

#[test]
fn purchase_complete_without_order_emits_no_summary() {
  let mut tracker = StepTracker::default();
  let out = tracker.record_event_at(
    StepEvent::new("purchase_complete", StepStatus::Completed)
      .with_payload(json!({"product": {"name": "x", "price": 1}})),
    t(0),
  );
  assert!(
    !out
      .iter()
      .any(|n| matches!(n, TrackerNotification::PurchaseCompleted(_)))
  );
  assert_eq!(tracker.len(), 1);
}

#[test]
fn error_step_reports_failure() {
  let mut tracker = StepTracker::default();
  let out = tracker.record_event_at(
    StepEvent::new("error", StepStatus::Failed).with_payload(json!({"error": "insufficient_funds"})),
    t(0),
  );
  assert!(out.contains(&TrackerNotification::RunFailed {
    reason: "insufficient_funds".to_string()
  }));
}

#[test]
fn ingest_drops_malformed_and_unknown_events() {
  let mut tracker = StepTracker::default();
  assert!(tracker.ingest("step_update", json!({"status": "started"})).is_empty());
  assert!(tracker.ingest("step_update", json!({"step": "a"})).is_empty());
  assert!(tracker.ingest("something_else", json!({})).is_empty());
  assert!(tracker.is_empty());
  let out = tracker.ingest("step_update", json!({"step": "a", "status": "started", "data": {}}));
  assert!(!out.is_empty());
  assert_eq!(tracker.len(), 1);
}

#[test]
fn ingest_reports_connection_changes() {
  let mut tracker = StepTracker::default();
  assert_eq!(
    tracker.ingest("connected", json!({"message": "hi"})),
    vec![TrackerNotification::Connection {
      state: ConnectionState::Connected
    }]
  );
  assert_eq!(
    tracker.ingest("disconnect", serde_json::Value::Null),
    vec![TrackerNotification::Connection {
      state: ConnectionState::Disconnected
    }]
  );
}

#[test]
fn steps_keep_arrival_order() {
  let mut tracker = StepTracker::default();
  for id in ["c", "a", "b", "a"] {
    tracker.record_event_at(StepEvent::new(id, StepStatus::Started), t(0));
  }
  let ids: Vec<&str> = tracker.steps().iter().map(|s| s.step_id.as_str()).collect();
  assert_eq!(ids, vec!["c", "a", "b"]);
}

#[test]
fn run_log_reflects_results() {
  let mut tracker = StepTracker::default();
  tracker.record_event_at(
    StepEvent::new("agent_registration", StepStatus::Completed)
      .with_payload(json!({"agent_id": "AGENT_1"})),
    t(0),
  );
  let log = tracker.run_log();
  assert_eq!(log.run_id, tracker.run_id());
  assert_eq!(log.entries.len(), 1);
  assert_eq!(log.entries[0].label, "Agent Registration");
  assert_eq!(log.started_at, Some(t(0).to_rfc3339()));
  assert!(log.finished_at.is_none());
}
