//! Step identifiers the tracker recognizes, and what each one means for consumers.
//!
//! Every lookup keyed by step name (display label, collaborator highlight,
//! specialized notification) goes through [KnownStep] so the recognized names live
//! in one place.

use super::{Collaborator, Merchant};

/// A recognized step identifier from the banking agent flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownStep {
  AppDownload,
  IdentityVerification,
  DeviceRegistration,
  BiometricEnrollment,
  AgentRegistration,
  DelegationAuth,
  DelegationRegistration,
  Authentication,
  ProductSearch,
  SearchAmazon,
  SearchBestBuy,
  SearchTarget,
  TransactionAuth,
  PaymentAuth,
  PaymentToken,
  PaymentProcessing,
  BankTransaction,
  OrderCreation,
  PurchaseComplete,
  Error,
}

/// Specialized notification a step can produce, beyond the generic ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
  None,
  ProductListing(Merchant),
  PurchaseSummary,
  Failure,
}

impl KnownStep {
  pub const ALL: [KnownStep; 20] = [
    KnownStep::AppDownload,
    KnownStep::IdentityVerification,
    KnownStep::DeviceRegistration,
    KnownStep::BiometricEnrollment,
    KnownStep::AgentRegistration,
    KnownStep::DelegationAuth,
    KnownStep::DelegationRegistration,
    KnownStep::Authentication,
    KnownStep::ProductSearch,
    KnownStep::SearchAmazon,
    KnownStep::SearchBestBuy,
    KnownStep::SearchTarget,
    KnownStep::TransactionAuth,
    KnownStep::PaymentAuth,
    KnownStep::PaymentToken,
    KnownStep::PaymentProcessing,
    KnownStep::BankTransaction,
    KnownStep::OrderCreation,
    KnownStep::PurchaseComplete,
    KnownStep::Error,
  ];

  /// Exact-match lookup of a wire step identifier.
  pub fn parse(step_id: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|k| k.id() == step_id)
  }

  pub fn id(self) -> &'static str {
    match self {
      KnownStep::AppDownload => "app_download",
      KnownStep::IdentityVerification => "identity_verification",
      KnownStep::DeviceRegistration => "device_registration",
      KnownStep::BiometricEnrollment => "biometric_enrollment",
      KnownStep::AgentRegistration => "agent_registration",
      KnownStep::DelegationAuth => "delegation_auth",
      KnownStep::DelegationRegistration => "delegation_registration",
      KnownStep::Authentication => "authentication",
      KnownStep::ProductSearch => "product_search",
      KnownStep::SearchAmazon => "search_amazon",
      KnownStep::SearchBestBuy => "search_bestbuy",
      KnownStep::SearchTarget => "search_target",
      KnownStep::TransactionAuth => "transaction_auth",
      KnownStep::PaymentAuth => "payment_auth",
      KnownStep::PaymentToken => "payment_token",
      KnownStep::PaymentProcessing => "payment_processing",
      KnownStep::BankTransaction => "bank_transaction",
      KnownStep::OrderCreation => "order_creation",
      KnownStep::PurchaseComplete => "purchase_complete",
      KnownStep::Error => "error",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      KnownStep::AppDownload => "App Download & Installation",
      KnownStep::IdentityVerification => "Identity Verification",
      KnownStep::DeviceRegistration => "Device Registration",
      KnownStep::BiometricEnrollment => "Biometric Enrollment",
      KnownStep::AgentRegistration => "Agent Registration",
      KnownStep::DelegationAuth => "Delegation Authentication",
      KnownStep::DelegationRegistration => "Delegation Registration",
      KnownStep::Authentication => "User Authentication",
      KnownStep::ProductSearch => "Product Search",
      KnownStep::SearchAmazon => "Search Amazon",
      KnownStep::SearchBestBuy => "Search BestBuy",
      KnownStep::SearchTarget => "Search Target",
      KnownStep::TransactionAuth => "Transaction Authorization",
      KnownStep::PaymentAuth => "Payment Authentication",
      KnownStep::PaymentToken => "Payment Token Generation",
      KnownStep::PaymentProcessing => "Payment Processing",
      KnownStep::BankTransaction => "Bank Transaction",
      KnownStep::OrderCreation => "Order Creation",
      KnownStep::PurchaseComplete => "Purchase Complete",
      KnownStep::Error => "Error",
    }
  }

  /// Collaborator to highlight while this step is reported.
  pub fn collaborator(self) -> Option<Collaborator> {
    match self {
      KnownStep::BiometricEnrollment
      | KnownStep::DelegationAuth
      | KnownStep::Authentication
      | KnownStep::PaymentAuth => Some(Collaborator::CallSign),
      KnownStep::AgentRegistration
      | KnownStep::DelegationRegistration
      | KnownStep::TransactionAuth => Some(Collaborator::BankMcp),
      KnownStep::PaymentToken => Some(Collaborator::Hsm),
      KnownStep::IdentityVerification | KnownStep::BankTransaction => Some(Collaborator::Bank),
      KnownStep::SearchAmazon | KnownStep::OrderCreation => Some(Collaborator::Amazon),
      KnownStep::PaymentProcessing => Some(Collaborator::Payment),
      _ => None,
    }
  }

  pub fn notification_kind(self) -> NotificationKind {
    match self {
      KnownStep::SearchAmazon => NotificationKind::ProductListing(Merchant::Amazon),
      KnownStep::SearchBestBuy => NotificationKind::ProductListing(Merchant::BestBuy),
      KnownStep::SearchTarget => NotificationKind::ProductListing(Merchant::Target),
      KnownStep::PurchaseComplete => NotificationKind::PurchaseSummary,
      KnownStep::Error => NotificationKind::Failure,
      _ => NotificationKind::None,
    }
  }
}

/// Display label for any step id: the known label, or the id humanized.
pub fn display_label(step_id: &str) -> String {
  match KnownStep::parse(step_id) {
    Some(known) => known.label().to_string(),
    None => humanize(step_id),
  }
}

/// `custom_step_x` -> `Custom Step X`. Separators are `_`, `-` and whitespace.
pub fn humanize(step_id: &str) -> String {
  step_id
    .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
    .filter(|w| !w.is_empty())
    .map(|w| {
      let mut chars = w.chars();
      match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
      }
    })
    .collect::<Vec<_>>()
    .join(" ")
}
