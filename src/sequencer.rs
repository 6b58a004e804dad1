//! Self-driven step sequencer.
//!
//! A pure state machine over a fixed script. Time is passed in explicitly as an offset
//! on a monotonic timeline, so the same machine runs under the tokio driver
//! ([crate::driver::spawn_sequencer]) and under tests that step time by hand.
//!
//! At most one advance is pending at any time. `pause` and `reset` drop it before
//! returning, so nothing scheduled earlier can touch the run afterwards.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use crate::MAX_STEP_DELAY_MS;
use crate::error::DemoError;
use crate::types::{Control, Progress, RunPhase, RunState, SequencerEvent, StepDefinition, Transition};

/// What the single pending callback does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledAction {
  /// Activate the step at the cursor.
  Advance,
  /// Every step has been shown; complete the run.
  Finish,
}

/// The single outstanding scheduled callback of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pending {
  pub due: Duration,
  pub action: ScheduledAction,
}

/// How a step should be drawn, derived from cursor and phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDisplay {
  Waiting,
  Active,
  Done,
}

/// Self-driven sequencer over an ordered script.
#[derive(Debug, Clone)]
pub struct Sequencer {
  steps: Vec<StepDefinition>,
  step_delay: Duration,
  cursor: usize,
  phase: RunPhase,
  started_at: Option<DateTime<Utc>>,
  pending: Option<Pending>,
}

impl Sequencer {
  /// Builds a sequencer. Step ids must be unique and the delay non-zero and at most
  /// one hour.
  pub fn new(steps: Vec<StepDefinition>, step_delay: Duration) -> Result<Self, DemoError> {
    if step_delay.is_zero() {
      return Err(DemoError::InvalidConfig(
        "step delay must be greater than zero".to_string(),
      ));
    }
    if step_delay > Duration::from_millis(MAX_STEP_DELAY_MS) {
      return Err(DemoError::InvalidConfig(format!(
        "step delay must be at most {MAX_STEP_DELAY_MS} ms, got {} ms",
        step_delay.as_millis()
      )));
    }
    let mut seen = HashSet::new();
    for step in &steps {
      if !seen.insert(step.id.as_str()) {
        return Err(DemoError::DuplicateStepId(step.id.clone()));
      }
    }
    Ok(Self {
      steps,
      step_delay,
      cursor: 0,
      phase: RunPhase::Idle,
      started_at: None,
      pending: None,
    })
  }

  pub fn steps(&self) -> &[StepDefinition] {
    &self.steps
  }

  pub fn step_delay(&self) -> Duration {
    self.step_delay
  }

  pub fn phase(&self) -> RunPhase {
    self.phase
  }

  pub fn cursor(&self) -> usize {
    self.cursor
  }

  pub fn pending(&self) -> Option<Pending> {
    self.pending
  }

  /// When the pending callback is due, if any.
  pub fn next_deadline(&self) -> Option<Duration> {
    self.pending.map(|p| p.due)
  }

  pub fn progress(&self) -> Progress {
    Progress {
      cursor: self.cursor,
      total: self.steps.len(),
    }
  }

  pub fn state(&self) -> RunState {
    RunState {
      cursor: self.cursor,
      phase: self.phase,
      started_at: self.started_at,
      total: self.steps.len(),
    }
  }

  pub fn step_display(&self, index: usize) -> StepDisplay {
    if self.phase == RunPhase::Completed || index + 1 < self.cursor {
      StepDisplay::Done
    } else if index + 1 == self.cursor {
      StepDisplay::Active
    } else {
      StepDisplay::Waiting
    }
  }

  /// Starts a run. From idle or completed this restarts at step 0 and activates it
  /// immediately; from paused it resumes; while running it does nothing.
  #[instrument(level = "trace", skip(self))]
  pub fn start(&mut self, now: Duration) -> Vec<SequencerEvent> {
    let mut events = Vec::new();
    let Some((to, transition)) = self.phase.on(Control::Start) else {
      debug!(phase = %self.phase, "start ignored");
      return events;
    };
    match transition {
      Transition::Restart => {
        self.pending = None;
        self.cursor = 0;
        self.started_at = Some(Utc::now());
        self.set_phase(to, &mut events);
        info!(steps = self.steps.len(), "run started");
        self.advance(now, &mut events);
      }
      _ => self.continue_run(to, now, &mut events),
    }
    events
  }

  /// Holds the run at the current cursor and drops the pending advance.
  #[instrument(level = "trace", skip(self))]
  pub fn pause(&mut self) -> Vec<SequencerEvent> {
    let mut events = Vec::new();
    let Some((to, _)) = self.phase.on(Control::Pause) else {
      debug!(phase = %self.phase, "pause ignored");
      return events;
    };
    self.pending = None;
    self.set_phase(to, &mut events);
    events.push(SequencerEvent::Progress(self.progress()));
    events
  }

  /// Continues a paused run; the next advance fires one delay after `now`.
  #[instrument(level = "trace", skip(self))]
  pub fn resume(&mut self, now: Duration) -> Vec<SequencerEvent> {
    let mut events = Vec::new();
    let Some((to, _)) = self.phase.on(Control::Resume) else {
      debug!(phase = %self.phase, "resume ignored");
      return events;
    };
    self.continue_run(to, now, &mut events);
    events
  }

  /// Pause when running, resume when paused, otherwise nothing.
  pub fn toggle_pause(&mut self, now: Duration) -> Vec<SequencerEvent> {
    match self.phase {
      RunPhase::Running => self.pause(),
      RunPhase::Paused => self.resume(now),
      _ => Vec::new(),
    }
  }

  /// Back to idle at cursor 0 from any phase; drops the pending advance.
  #[instrument(level = "trace", skip(self))]
  pub fn reset(&mut self) -> Vec<SequencerEvent> {
    let mut events = Vec::new();
    if let Some((to, _)) = self.phase.on(Control::Reset) {
      self.pending = None;
      self.cursor = 0;
      self.started_at = None;
      self.set_phase(to, &mut events);
      events.push(SequencerEvent::Progress(self.progress()));
      info!("run reset");
    }
    events
  }

  /// Fires the pending callback if it is due at `now`. A callback fires at its own
  /// due time, so a late caller sees the same sequence as a punctual one.
  #[instrument(level = "trace", skip(self))]
  pub fn fire_due(&mut self, now: Duration) -> Vec<SequencerEvent> {
    let mut events = Vec::new();
    while let Some(pending) = self.pending.filter(|p| p.due <= now) {
      self.pending = None;
      match pending.action {
        ScheduledAction::Advance => self.advance(pending.due, &mut events),
        ScheduledAction::Finish => self.finish(&mut events),
      }
    }
    events
  }

  fn continue_run(&mut self, to: RunPhase, now: Duration, events: &mut Vec<SequencerEvent>) {
    self.set_phase(to, events);
    self.schedule_next(now);
    events.push(SequencerEvent::Progress(self.progress()));
  }

  fn schedule_next(&mut self, from: Duration) {
    let action = if self.cursor < self.steps.len() {
      ScheduledAction::Advance
    } else {
      ScheduledAction::Finish
    };
    self.pending = Some(Pending {
      due: from.saturating_add(self.step_delay),
      action,
    });
  }

  /// Activates the step at the cursor and schedules what comes next.
  fn advance(&mut self, at: Duration, events: &mut Vec<SequencerEvent>) {
    // A pause can land between scheduling and firing.
    if self.phase != RunPhase::Running {
      return;
    }
    if self.cursor >= self.steps.len() {
      self.finish(events);
      return;
    }
    let index = self.cursor;
    if index > 0 {
      events.push(SequencerEvent::StepCompleted { index: index - 1 });
    }
    let step = self.steps[index].clone();
    let new_group = index == 0 || self.steps[index - 1].group != step.group;
    if new_group && !step.group.is_empty() {
      events.push(SequencerEvent::GroupEntered {
        group: step.group.clone(),
      });
    }
    debug!(index, step_id = %step.id, "step activated");
    events.push(SequencerEvent::StepActivated { index, step });
    self.cursor += 1;
    events.push(SequencerEvent::Progress(self.progress()));
    self.schedule_next(at);
  }

  fn finish(&mut self, events: &mut Vec<SequencerEvent>) {
    let Some((to, _)) = self.phase.on(Control::Finish) else {
      return;
    };
    self.pending = None;
    if self.cursor > 0 {
      events.push(SequencerEvent::StepCompleted {
        index: self.cursor - 1,
      });
    }
    self.set_phase(to, events);
    events.push(SequencerEvent::Progress(self.progress()));
    events.push(SequencerEvent::Completed);
    info!(steps = self.steps.len(), "run completed");
  }

  fn set_phase(&mut self, to: RunPhase, events: &mut Vec<SequencerEvent>) {
    let from = self.phase;
    self.phase = to;
    if from != to {
      events.push(SequencerEvent::PhaseChanged { from, to });
    }
  }
}
