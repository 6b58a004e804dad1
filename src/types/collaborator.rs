//! External systems a step can belong to.

use std::fmt;

use serde::{Deserialize, Serialize};

/// External system highlighted while one of its steps is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collaborator {
  CallSign,
  BankMcp,
  Hsm,
  Bank,
  Amazon,
  Payment,
}

impl Collaborator {
  pub fn id(self) -> &'static str {
    match self {
      Collaborator::CallSign => "callsign",
      Collaborator::BankMcp => "bankmcp",
      Collaborator::Hsm => "hsm",
      Collaborator::Bank => "bank",
      Collaborator::Amazon => "amazon",
      Collaborator::Payment => "payment",
    }
  }
}

impl fmt::Display for Collaborator {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.id())
  }
}

/// Merchant whose catalog a search step reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Merchant {
  Amazon,
  BestBuy,
  Target,
}

impl fmt::Display for Merchant {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Merchant::Amazon => write!(f, "amazon"),
      Merchant::BestBuy => write!(f, "bestbuy"),
      Merchant::Target => write!(f, "target"),
    }
  }
}
