//! Outbound triggers: asks the backend to start emitting `step_update` events.
//!
//! Each trigger is fire-and-forget from the tracker's point of view. A failure is
//! reported once as a [`TriggerOutcome::Failed`] notice and never retried.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

use crate::config::DemoConfig;
use crate::driver::TrackerHandle;
use crate::error::DemoError;

/// One of the three backend actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerAction {
  Setup,
  Delegation,
  Purchase,
}

impl TriggerAction {
  pub const ALL: [TriggerAction; 3] = [Self::Setup, Self::Delegation, Self::Purchase];

  /// Endpoint path under the backend base URL.
  pub fn path(self) -> &'static str {
    match self {
      Self::Setup => "/api/demo/setup",
      Self::Delegation => "/api/demo/delegate",
      Self::Purchase => "/api/demo/purchase",
    }
  }

  pub fn title(self) -> &'static str {
    match self {
      Self::Setup => "Setup",
      Self::Delegation => "Delegation",
      Self::Purchase => "Purchase",
    }
  }
}

impl fmt::Display for TriggerAction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Self::Setup => "setup",
      Self::Delegation => "delegation",
      Self::Purchase => "purchase",
    };
    f.write_str(s)
  }
}

/// The system that receives triggers.
#[async_trait]
pub trait DemoBackend: Send + Sync {
  async fn trigger_setup(&self) -> Result<Value, DemoError>;

  async fn trigger_delegation(
    &self,
    spending_limit: f64,
    categories: &[String],
  ) -> Result<Value, DemoError>;

  async fn trigger_purchase(&self, query: &str, max_price: f64) -> Result<Value, DemoError>;
}

/// JSON-over-HTTP backend. Every trigger is a POST.
#[derive(Debug, Clone)]
pub struct HttpBackend {
  client: reqwest::Client,
  base_url: String,
}

impl HttpBackend {
  pub fn new(base_url: &str) -> Self {
    Self {
      client: reqwest::Client::new(),
      base_url: base_url.trim_end_matches('/').to_string(),
    }
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  #[instrument(level = "trace", skip(self, body))]
  async fn post(&self, action: TriggerAction, body: Value) -> Result<Value, DemoError> {
    let url = format!("{}{}", self.base_url, action.path());
    let resp = self
      .client
      .post(&url)
      .json(&body)
      .send()
      .await
      .map_err(|source| DemoError::Transport { action, source })?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(DemoError::Rejected {
        action,
        status: status.as_u16(),
        body,
      });
    }
    resp
      .json()
      .await
      .map_err(|source| DemoError::Transport { action, source })
  }
}

#[async_trait]
impl DemoBackend for HttpBackend {
  async fn trigger_setup(&self) -> Result<Value, DemoError> {
    self.post(TriggerAction::Setup, json!({})).await
  }

  async fn trigger_delegation(
    &self,
    spending_limit: f64,
    categories: &[String],
  ) -> Result<Value, DemoError> {
    self
      .post(
        TriggerAction::Delegation,
        json!({ "spending_limit": spending_limit, "categories": categories }),
      )
      .await
  }

  async fn trigger_purchase(&self, query: &str, max_price: f64) -> Result<Value, DemoError> {
    self
      .post(
        TriggerAction::Purchase,
        json!({ "query": query, "max_price": max_price }),
      )
      .await
  }
}

/// What happened to one trigger attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerOutcome {
  Sent { action: TriggerAction, response: Value },
  /// `notice` is the user-facing failure text.
  Failed { action: TriggerAction, notice: String },
}

impl TriggerOutcome {
  pub fn action(&self) -> TriggerAction {
    match self {
      Self::Sent { action, .. } | Self::Failed { action, .. } => *action,
    }
  }

  pub fn is_sent(&self) -> bool {
    matches!(self, Self::Sent { .. })
  }
}

/// Fires triggers with the configured arguments. When a tracker handle is attached,
/// setup clears the tracker first.
pub struct DemoController<B> {
  backend: B,
  config: DemoConfig,
  tracker: Option<TrackerHandle>,
}

impl<B: DemoBackend> DemoController<B> {
  pub fn new(backend: B, config: DemoConfig) -> Self {
    Self {
      backend,
      config,
      tracker: None,
    }
  }

  pub fn with_tracker(mut self, tracker: TrackerHandle) -> Self {
    self.tracker = Some(tracker);
    self
  }

  pub fn backend(&self) -> &B {
    &self.backend
  }

  pub fn config(&self) -> &DemoConfig {
    &self.config
  }

  pub async fn run_setup(&self) -> TriggerOutcome {
    if let Some(tracker) = &self.tracker
      && let Err(e) = tracker.reset().await
    {
      warn!(error = %e, "could not reset tracker before setup");
    }
    let result = self.backend.trigger_setup().await;
    settle(TriggerAction::Setup, result)
  }

  pub async fn run_delegation(&self) -> TriggerOutcome {
    let result = self
      .backend
      .trigger_delegation(self.config.spending_limit, &self.config.categories)
      .await;
    settle(TriggerAction::Delegation, result)
  }

  pub async fn run_purchase(&self) -> TriggerOutcome {
    let result = self
      .backend
      .trigger_purchase(&self.config.query, self.config.max_price)
      .await;
    settle(TriggerAction::Purchase, result)
  }

  pub async fn run(&self, action: TriggerAction) -> TriggerOutcome {
    match action {
      TriggerAction::Setup => self.run_setup().await,
      TriggerAction::Delegation => self.run_delegation().await,
      TriggerAction::Purchase => self.run_purchase().await,
    }
  }

  /// Setup, delegation and purchase in order with the composite delay between them.
  /// A failed trigger does not stop the ones after it.
  #[instrument(level = "trace", skip(self))]
  pub async fn run_all(&self) -> Vec<TriggerOutcome> {
    let delay = self.config.composite_delay();
    let mut outcomes = Vec::with_capacity(TriggerAction::ALL.len());
    for (i, action) in TriggerAction::ALL.into_iter().enumerate() {
      if i > 0 {
        pause_for(delay).await;
      }
      outcomes.push(self.run(action).await);
    }
    outcomes
  }
}

fn settle(action: TriggerAction, result: Result<Value, DemoError>) -> TriggerOutcome {
  match result {
    Ok(response) => {
      info!(%action, "trigger sent");
      TriggerOutcome::Sent { action, response }
    }
    Err(e) => {
      warn!(%action, error = %e, "trigger failed");
      TriggerOutcome::Failed {
        action,
        notice: format!(
          "{} failed: {e}. Make sure the backend server is running.",
          action.title()
        ),
      }
    }
  }
}

async fn pause_for(delay: Duration) {
  if !delay.is_zero() {
    tokio::time::sleep(delay).await;
  }
}
