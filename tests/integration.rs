//! Integration tests that drive the library on the fixtures in tests/integration/:
//! scenario loading into the sequencer, and an ndjson event file through the tracker
//! driver.

use std::path::{Path, PathBuf};
use std::time::Duration;

use stepweave_demo::driver::spawn_tracker;
use stepweave_demo::event_source::file_events;
use stepweave_demo::run_log_io::{load_run_log, write_run_log_final};
use stepweave_demo::types::{Merchant, RunPhase};
use stepweave_demo::{
  DemoError, SequencerEvent, StepStatus, StepTracker, TrackerNotification, load_scenario,
};
use tokio::sync::mpsc;

fn fixture(name: &str) -> PathBuf {
  Path::new(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("integration")
    .join(name)
}

#[test]
fn scenario_fixture_plays_through() {
  let scenario = load_scenario(&fixture("three_steps.json")).expect("load scenario");
  assert_eq!(scenario.groups(), vec!["Setup", "Payment"]);

  let d = Duration::from_millis(10);
  let mut seq = scenario.into_sequencer(d).expect("sequencer");
  let mut events = seq.start(Duration::ZERO);
  events.extend(seq.fire_due(d * 3));

  let groups: Vec<&str> = events
    .iter()
    .filter_map(|e| match e {
      SequencerEvent::GroupEntered { group } => Some(group.as_str()),
      _ => None,
    })
    .collect();
  assert_eq!(groups, vec!["Setup", "Payment"]);
  assert_eq!(events.last(), Some(&SequencerEvent::Completed));
  assert_eq!(seq.phase(), RunPhase::Completed);
}

#[test]
fn duplicate_id_fixture_is_rejected() {
  let scenario = load_scenario(&fixture("duplicate_ids.json")).expect("load scenario");
  let err = scenario
    .into_sequencer(Duration::from_millis(10))
    .unwrap_err();
  assert!(matches!(err, DemoError::DuplicateStepId(ref id) if id == "a"), "{err:?}");
}

#[tokio::test]
async fn purchase_flow_fixture_through_tracker_driver() {
  let inbound = file_events(&fixture("purchase_flow.ndjson"))
    .await
    .expect("open events");
  let (tx, mut rx) = mpsc::channel(256);
  let (_handle, join) = spawn_tracker(StepTracker::new(15000.0), inbound, tx);

  let tracker = join.await.expect("tracker task");
  let mut notifications = Vec::new();
  while let Ok(n) = rx.try_recv() {
    notifications.push(n);
  }

  let ids: Vec<&str> = tracker.steps().iter().map(|s| s.step_id.as_str()).collect();
  assert_eq!(
    ids,
    vec![
      "agent_registration",
      "delegation_registration",
      "search_amazon",
      "order_creation",
      "purchase_complete"
    ]
  );
  // the late "started" for delegation_registration is dropped
  assert_eq!(
    tracker.get("delegation_registration").unwrap().latest_status,
    StepStatus::Completed
  );
  assert_eq!(tracker.results().len(), 4);
  assert_eq!(tracker.balance(), 13700.01);
  assert_eq!(
    tracker.get("purchase_complete").unwrap().label,
    "Purchase Complete"
  );

  assert!(notifications.iter().any(|n| matches!(
    n,
    TrackerNotification::ProductsListed { merchant: Merchant::Amazon, products } if products.len() == 2
  )));
  assert!(notifications.iter().any(|n| matches!(
    n,
    TrackerNotification::PurchaseCompleted(s) if s.order_id == "ORD_42"
  )));
  assert!(matches!(
    notifications.last(),
    Some(TrackerNotification::Connection { .. })
  ));

  let dir = tempfile::tempdir().expect("temp dir");
  let path = dir.path().join("results.log.json");
  write_run_log_final(&path, &tracker.run_log()).expect("write log");
  let log = load_run_log(&path).expect("load log");
  assert_eq!(log.entries.len(), 4);
  assert_eq!(log.entries[0].step_id, "agent_registration");
  assert!(log.finished_at.is_some());
}
