//! Tokio drivers for the sequencer and the tracker.
//!
//! Each driver is one task that owns its state machine; commands and inbound events
//! are applied one at a time from that task, and notifications go out on an mpsc
//! channel. The sequencer driver sleeps on the single pending deadline, if any.

use futures::StreamExt;
use futures::stream::BoxStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, instrument};

use crate::error::DemoError;
use crate::event_source::InboundEvent;
use crate::sequencer::Sequencer;
use crate::tracker::StepTracker;
use crate::types::{RunLog, RunState, SequencerEvent, TrackerNotification};

/// Control input for a running sequencer driver.
#[derive(Debug)]
pub enum SequencerCommand {
  Start,
  Pause,
  Resume,
  TogglePause,
  Reset,
  State(oneshot::Sender<RunState>),
}

/// Sends commands to a sequencer driver. The driver stops once every handle is dropped.
#[derive(Debug, Clone)]
pub struct SequencerHandle {
  tx: mpsc::Sender<SequencerCommand>,
}

impl SequencerHandle {
  pub async fn send(&self, command: SequencerCommand) -> Result<(), DemoError> {
    self
      .tx
      .send(command)
      .await
      .map_err(|_| DemoError::DriverStopped)
  }

  pub async fn start(&self) -> Result<(), DemoError> {
    self.send(SequencerCommand::Start).await
  }

  pub async fn pause(&self) -> Result<(), DemoError> {
    self.send(SequencerCommand::Pause).await
  }

  pub async fn resume(&self) -> Result<(), DemoError> {
    self.send(SequencerCommand::Resume).await
  }

  pub async fn toggle_pause(&self) -> Result<(), DemoError> {
    self.send(SequencerCommand::TogglePause).await
  }

  pub async fn reset(&self) -> Result<(), DemoError> {
    self.send(SequencerCommand::Reset).await
  }

  pub async fn state(&self) -> Result<RunState, DemoError> {
    let (tx, rx) = oneshot::channel();
    self.send(SequencerCommand::State(tx)).await?;
    rx.await.map_err(|_| DemoError::DriverStopped)
  }
}

/// Runs `sequencer` on its own task. Returns the sequencer when the driver stops.
pub fn spawn_sequencer(
  sequencer: Sequencer,
  events: mpsc::Sender<SequencerEvent>,
) -> (SequencerHandle, JoinHandle<Sequencer>) {
  let (tx, rx) = mpsc::channel(16);
  let join = tokio::spawn(run_sequencer(sequencer, rx, events));
  (SequencerHandle { tx }, join)
}

#[instrument(level = "trace", skip_all)]
async fn run_sequencer(
  mut seq: Sequencer,
  mut commands: mpsc::Receiver<SequencerCommand>,
  events: mpsc::Sender<SequencerEvent>,
) -> Sequencer {
  let origin = Instant::now();
  loop {
    let deadline = seq.next_deadline().and_then(|due| origin.checked_add(due));
    let out = tokio::select! {
      command = commands.recv() => {
        let Some(command) = command else { break };
        let now = origin.elapsed();
        match command {
          SequencerCommand::Start => seq.start(now),
          SequencerCommand::Pause => seq.pause(),
          SequencerCommand::Resume => seq.resume(now),
          SequencerCommand::TogglePause => seq.toggle_pause(now),
          SequencerCommand::Reset => seq.reset(),
          SequencerCommand::State(reply) => {
            let _ = reply.send(seq.state());
            Vec::new()
          }
        }
      }
      _ = sleep_until(deadline) => seq.fire_due(origin.elapsed()),
    };
    if !forward(&events, out).await {
      debug!("sequencer event receiver dropped");
      break;
    }
  }
  seq
}

async fn sleep_until(deadline: Option<Instant>) {
  match deadline {
    Some(at) => tokio::time::sleep_until(at).await,
    None => std::future::pending().await,
  }
}

async fn forward<T>(tx: &mpsc::Sender<T>, items: Vec<T>) -> bool {
  for item in items {
    if tx.send(item).await.is_err() {
      return false;
    }
  }
  true
}

/// Control input for a running tracker driver.
#[derive(Debug)]
pub enum TrackerCommand {
  Reset,
  Log(oneshot::Sender<RunLog>),
}

/// Sends commands to a tracker driver.
#[derive(Debug, Clone)]
pub struct TrackerHandle {
  tx: mpsc::Sender<TrackerCommand>,
}

impl TrackerHandle {
  pub async fn reset(&self) -> Result<(), DemoError> {
    self
      .tx
      .send(TrackerCommand::Reset)
      .await
      .map_err(|_| DemoError::DriverStopped)
  }

  /// Current result log of the tracked run.
  pub async fn run_log(&self) -> Result<RunLog, DemoError> {
    let (tx, rx) = oneshot::channel();
    self
      .tx
      .send(TrackerCommand::Log(tx))
      .await
      .map_err(|_| DemoError::DriverStopped)?;
    rx.await.map_err(|_| DemoError::DriverStopped)
  }
}

/// Feeds `inbound` into `tracker` on its own task until the stream ends. A reset
/// clears the tracker but keeps consuming the same stream.
pub fn spawn_tracker(
  tracker: StepTracker,
  inbound: BoxStream<'static, InboundEvent>,
  notifications: mpsc::Sender<TrackerNotification>,
) -> (TrackerHandle, JoinHandle<StepTracker>) {
  let (tx, rx) = mpsc::channel(16);
  let join = tokio::spawn(run_tracker(tracker, inbound, rx, notifications));
  (TrackerHandle { tx }, join)
}

#[instrument(level = "trace", skip_all)]
async fn run_tracker(
  mut tracker: StepTracker,
  mut inbound: BoxStream<'static, InboundEvent>,
  mut commands: mpsc::Receiver<TrackerCommand>,
  notifications: mpsc::Sender<TrackerNotification>,
) -> StepTracker {
  let mut commands_open = true;
  loop {
    let out = tokio::select! {
      command = commands.recv(), if commands_open => match command {
        Some(TrackerCommand::Reset) => tracker.reset(),
        Some(TrackerCommand::Log(reply)) => {
          let _ = reply.send(tracker.run_log());
          Vec::new()
        }
        None => {
          commands_open = false;
          Vec::new()
        }
      },
      event = inbound.next() => match event {
        Some(InboundEvent { event, data }) => tracker.ingest(&event, data),
        None => {
          debug!("event stream ended");
          break;
        }
      },
    };
    if !forward(&notifications, out).await {
      debug!("tracker notification receiver dropped");
      break;
    }
  }
  tracker
}
