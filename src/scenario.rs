//! Scripts for the self-driven sequencer: JSON files and the built-in trust ceremony.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::DemoError;
use crate::sequencer::Sequencer;
use crate::types::StepDefinition;

/// A named, ordered script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
  pub name: String,
  pub steps: Vec<StepDefinition>,
}

impl Scenario {
  /// Builds a sequencer over this script.
  pub fn into_sequencer(self, step_delay: Duration) -> Result<Sequencer, DemoError> {
    Sequencer::new(self.steps, step_delay)
  }

  /// Distinct groups in script order.
  pub fn groups(&self) -> Vec<&str> {
    let mut groups: Vec<&str> = Vec::new();
    for step in &self.steps {
      if groups.last() != Some(&step.group.as_str()) {
        groups.push(step.group.as_str());
      }
    }
    groups
  }
}

/// Loads a scenario from a JSON file (`{"name": ..., "steps": [...]}`).
#[instrument(level = "trace", skip(path))]
pub fn load_scenario(path: &Path) -> Result<Scenario, DemoError> {
  let bytes = std::fs::read(path)?;
  Ok(serde_json::from_slice(&bytes)?)
}

fn step(
  id: &str,
  title: &str,
  description: &str,
  participant: &str,
  payload: &str,
  group: &str,
) -> StepDefinition {
  StepDefinition::new(id, title, description, payload, group).with_participant(participant)
}

/// Four-phase trust and delegation ceremony between an AI agent, an auth gateway and
/// a bank.
pub fn trust_ceremony() -> Scenario {
  const TRUST: &str = "Trust Bootstrap";
  const ENROLL: &str = "User Enrollment";
  const PAY: &str = "Payment Transaction";
  const MONITOR: &str = "Monitoring";
  Scenario {
    name: "trust-ceremony".to_string(),
    steps: vec![
      step(
        "trust_ceremony",
        "Trust Ceremony",
        "OpenAI Agent establishes trust with CallSign Gateway",
        "openai",
        r#"Trust ceremony: {"ssa": "eyJ...", "attestation": {...}, "jwks": {...}}"#,
        TRUST,
      ),
      step(
        "trust_handshake",
        "Trust Handshake",
        "CallSign Gateway establishes trust with Bank API",
        "callsign",
        r#"Trust handshake: {"as_keys": {...}, "rar_schema": {...}, "mtls_certs": [...]}"#,
        TRUST,
      ),
      step(
        "trust_confirmation",
        "Trust Confirmation",
        "Bank confirms trust establishment",
        "bank",
        r#"Trust confirmation: {"status": "confirmed", "api_contract": {...}}"#,
        TRUST,
      ),
      step(
        "trust_bundle",
        "Trust Bundle",
        "CallSign provides trust bundle to OpenAI Agent",
        "callsign",
        r#"Trust bundle: {"endpoints": [...], "scopes": [...], "policies": [...]}"#,
        TRUST,
      ),
      step(
        "user_enrollment",
        "User Enrollment",
        "User enrolls with KYC and consent preferences",
        "user",
        r#"Enroll: {"kyc_data": {...}, "consent": {...}, "retention_policy": "30d"}"#,
        ENROLL,
      ),
      step(
        "webauthn_registration",
        "WebAuthn Registration",
        "CallSign provides WebAuthn registration",
        "callsign",
        r#"Registration: {"webauthn_challenge": "...", "dashboard_url": "..."}"#,
        ENROLL,
      ),
      step(
        "delegation_policy",
        "Delegation Policy",
        "User creates delegation policy with limits",
        "user",
        r#"Policy: {"limits": {"daily": 1000}, "constraints": [...], "sca_rules": [...]}"#,
        ENROLL,
      ),
      step(
        "policy_confirmation",
        "Policy Confirmation",
        "CallSign confirms policy creation",
        "callsign",
        r#"Policy created: {"policy_id": "pol_123", "revocation_handle": "rev_456"}"#,
        ENROLL,
      ),
      step(
        "token_request",
        "Token Request",
        "OpenAI Agent requests access token",
        "openai",
        r#"Token request: {"dpop": "eyJ...", "policy_id": "pol_123", "scope": "payment:write"}"#,
        PAY,
      ),
      step(
        "access_token",
        "Access Token",
        "CallSign provides access token",
        "callsign",
        r#"Access token: {"access_token": "eyJ...", "expires_in": 3600, "scope": "payment:write"}"#,
        PAY,
      ),
      step(
        "payment_request",
        "Payment Request",
        "OpenAI Agent makes payment request to Bank",
        "openai",
        r#"Payment: {"amount": 100.00, "currency": "USD", "recipient": "acc_789"}"#,
        PAY,
      ),
      step(
        "transaction_receipt",
        "Transaction Receipt",
        "Bank processes payment and returns receipt",
        "bank",
        r#"Receipt: {"txn_id": "tx_abc123", "status": "completed", "timestamp": "..."}"#,
        PAY,
      ),
      step(
        "agent_trace",
        "Agent Trace",
        "OpenAI Agent sends trace data",
        "openai",
        r#"Trace: {"request_id": "req_123", "latency_ms": 45, "status": "success"}"#,
        MONITOR,
      ),
      step(
        "auth_trace",
        "Auth Trace",
        "CallSign sends authentication trace",
        "callsign",
        r#"Auth trace: {"policy_eval_ms": 12, "auth_time_ms": 8, "decision": "allow"}"#,
        MONITOR,
      ),
      step(
        "transaction_trace",
        "Transaction Trace",
        "Bank sends transaction trace",
        "bank",
        r#"Txn trace: {"txn_id": "tx_abc123", "amount": 100.00, "status": "completed"}"#,
        MONITOR,
      ),
      step(
        "user_notification",
        "User Notification",
        "Monitoring system notifies user",
        "monitoring",
        r#"Alert: {"type": "transaction_complete", "txn_id": "tx_abc123", "amount": 100.00}"#,
        MONITOR,
      ),
    ],
  }
}
