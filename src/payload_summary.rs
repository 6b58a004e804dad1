//! One-line summaries of step payloads.
//!
//! Only the conventional fields are picked out (token, ids, amounts, flags); the rest
//! of the payload is left to the full result view.

use serde_json::{Map, Value};

/// Characters of a token shown before it is elided.
const TOKEN_PREFIX_CHARS: usize = 20;

/// One labelled value picked out of a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadField {
  pub label: &'static str,
  pub value: String,
}

/// Picks the recognized fields out of `payload`, in a fixed order.
pub fn summarize(payload: &Map<String, Value>) -> Vec<PayloadField> {
  let mut fields = Vec::new();
  let mut push = |label: &'static str, value: String| fields.push(PayloadField { label, value });

  if let Some(token) = truthy(payload, "token") {
    let text = plain(token);
    let prefix: String = text.chars().take(TOKEN_PREFIX_CHARS).collect();
    push("Token", format!("{prefix}..."));
  }
  if let Some(v) = truthy(payload, "agent_id") {
    push("Agent ID", plain(v));
  }
  if let Some(v) = truthy(payload, "delegation_id") {
    push("Delegation ID", plain(v));
  }
  if let Some(v) = truthy(payload, "spending_limit") {
    push("Spending Limit", format!("${}", plain(v)));
  }
  if let Some(v) = truthy(payload, "amount") {
    push("Amount", format!("${}", plain(v)));
  }
  if let Some(v) = truthy(payload, "merchant") {
    push("Merchant", plain(v));
  }
  if let Some(v) = truthy(payload, "order_id") {
    push("Order ID", plain(v));
  }
  if let Some(v) = truthy(payload, "transaction_id") {
    push("Transaction ID", plain(v));
  }
  if let Some(v) = truthy(payload, "total_found") {
    push("Products Found", plain(v));
  }
  if let Some(v) = payload.get("authorized").filter(|v| !v.is_null()) {
    let yes = truthy_value(v);
    push("Authorized", if yes { "Yes" } else { "No" }.to_string());
  }
  fields
}

/// `Label: value • Label: value`.
pub fn summary_line(payload: &Map<String, Value>) -> String {
  summarize(payload)
    .iter()
    .map(|f| format!("{}: {}", f.label, f.value))
    .collect::<Vec<_>>()
    .join(" • ")
}

fn truthy<'a>(payload: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
  payload.get(key).filter(|v| truthy_value(v))
}

/// Empty strings, zero, false and null count as absent.
fn truthy_value(v: &Value) -> bool {
  match v {
    Value::Null => false,
    Value::Bool(b) => *b,
    Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
    Value::String(s) => !s.is_empty(),
    Value::Array(_) | Value::Object(_) => true,
  }
}

/// Strings without quotes, everything else as JSON.
fn plain(v: &Value) -> String {
  match v {
    Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}
