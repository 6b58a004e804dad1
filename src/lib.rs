//! # stepweave-demo
//!
//! Step sequencing for a multi-party payment and delegation demo.
//!
//! ## Architecture
//!
//! Two ways to drive a run, both as plain state machines:
//!
//! - [`Sequencer`]: walks a fixed script on a timer with start/pause/resume/reset.
//!   Time is passed in explicitly; [`driver::spawn_sequencer`] owns the single
//!   pending deadline on a tokio task.
//! - [`StepTracker`]: consumes pushed `step_update` events in arrival order and keeps
//!   one entry per step id, plus the accumulated results. [`driver::spawn_tracker`]
//!   feeds it from an [`event_source`] stream.
//!
//! [`controller`] fires the outbound triggers that make a backend emit events.

pub mod config;
#[cfg(test)]
mod config_test;
pub mod controller;
pub mod driver;
pub mod error;
pub mod event_source;
pub mod payload_summary;
pub mod run_log_io;
pub mod scenario;
pub mod sequencer;
pub mod tracker;
#[cfg(test)]
mod tracker_test;
pub mod types;

/// Default pause between two activations of the self-driven sequencer.
pub const DEFAULT_STEP_DELAY_MS: u64 = 1500;

/// Longest accepted pause between two activations (one hour).
pub const MAX_STEP_DELAY_MS: u64 = 3_600_000;

/// Default backend base URL for trigger requests.
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Default pause between the triggers of the composite "run all" action.
pub const DEFAULT_COMPOSITE_DELAY_MS: u64 = 2000;

/// Account balance before any event and after a reset.
pub const DEFAULT_INITIAL_BALANCE: f64 = 15000.0;

pub use config::DemoConfig;
pub use controller::{DemoBackend, DemoController, HttpBackend, TriggerAction, TriggerOutcome};
pub use error::{DemoError, Result};
pub use scenario::{Scenario, load_scenario, trust_ceremony};
pub use sequencer::{Sequencer, StepDisplay};
pub use tracker::StepTracker;
pub use types::{SequencerEvent, StepDefinition, StepEvent, StepStatus, TrackerNotification};
