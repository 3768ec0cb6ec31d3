// tukangin/src/model/order.rs

use super::{OrderId, ProfessionalId, UserId, VoucherId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
  Pending,
  Processing,
  Warranty,
  Completed,
  Cancelled,
}

impl OrderStatus {
  pub const ALL: [OrderStatus; 5] = [
    OrderStatus::Pending,
    OrderStatus::Processing,
    OrderStatus::Warranty,
    OrderStatus::Completed,
    OrderStatus::Cancelled,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      OrderStatus::Pending => "PENDING",
      OrderStatus::Processing => "PROCESSING",
      OrderStatus::Warranty => "WARRANTY",
      OrderStatus::Completed => "COMPLETED",
      OrderStatus::Cancelled => "CANCELLED",
    }
  }

  pub fn is_terminal(&self) -> bool {
    matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for OrderStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    OrderStatus::ALL
      .into_iter()
      .find(|status| status.as_str().eq_ignore_ascii_case(s))
      .ok_or_else(|| format!("Unknown order status: {}", s))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
  BankTransfer,
  EWallet,
  VirtualAccount,
  Cash,
}

impl PaymentMethod {
  pub fn as_str(&self) -> &'static str {
    match self {
      PaymentMethod::BankTransfer => "bank_transfer",
      PaymentMethod::EWallet => "e_wallet",
      PaymentMethod::VirtualAccount => "virtual_account",
      PaymentMethod::Cash => "cash",
    }
  }
}

impl fmt::Display for PaymentMethod {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for PaymentMethod {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "bank_transfer" => Ok(PaymentMethod::BankTransfer),
      "e_wallet" => Ok(PaymentMethod::EWallet),
      "virtual_account" => Ok(PaymentMethod::VirtualAccount),
      "cash" => Ok(PaymentMethod::Cash),
      _ => Err(format!("Unknown payment method: {}", s)),
    }
  }
}

/// Largest subtotal an order may carry, in the smallest currency unit.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000_000;

/// The deposit (DP) owed on an order: half of the total, halves rounded up.
pub fn deposit_for(total: i64) -> i64 {
  total / 2 + total % 2
}

/// An order row. Monetary fields are in the smallest currency unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: OrderId,
  pub customer_id: UserId,
  pub professional_id: Option<ProfessionalId>,
  pub voucher_id: Option<VoucherId>,
  pub service_name: String,
  pub category: String,
  pub description: String,
  pub address: String,
  pub subtotal: i64,
  pub discount: i64,
  pub total: i64,
  pub status: OrderStatus,
  pub deposit_amount: Option<i64>,
  pub payment_method: Option<PaymentMethod>,
  pub created_at: DateTime<Utc>,
  pub paid_at: Option<DateTime<Utc>>,
  pub completed_at: Option<DateTime<Utc>>,
  pub cancelled_at: Option<DateTime<Utc>>,
  pub updated_at: DateTime<Utc>,
}

impl Order {
  pub fn is_paid(&self) -> bool {
    self.paid_at.is_some()
  }

  pub fn deposit_due(&self) -> i64 {
    deposit_for(self.total)
  }
}

/// Input for `OrderStore::create_order`. The store assigns id and timestamps
/// and always starts the row in PENDING.
#[derive(Debug, Clone)]
pub struct NewOrder {
  pub customer_id: UserId,
  pub voucher_id: Option<VoucherId>,
  pub service_name: String,
  pub category: String,
  pub description: String,
  pub address: String,
  pub subtotal: i64,
  pub discount: i64,
  pub total: i64,
  /// Per-customer cap on non-cancelled orders carrying `voucher_id`. The store
  /// checks it atomically with the insert and fails with `PreconditionFailed`.
  pub voucher_usage_limit: Option<i64>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn deposit_is_half_rounded_up() {
    assert_eq!(deposit_for(150_000), 75_000);
    assert_eq!(deposit_for(150_001), 75_001);
    assert_eq!(deposit_for(1), 1);
    assert_eq!(deposit_for(0), 0);
  }

  #[test]
  fn deposit_does_not_overflow_at_the_top_of_the_range() {
    assert_eq!(deposit_for(i64::MAX), i64::MAX / 2 + 1);
    assert_eq!(deposit_for(MAX_AMOUNT), MAX_AMOUNT / 2);
  }

  #[test]
  fn status_parses_case_insensitively() {
    assert_eq!("processing".parse::<OrderStatus>().unwrap(), OrderStatus::Processing);
    assert_eq!("COMPLETED".parse::<OrderStatus>().unwrap(), OrderStatus::Completed);
    assert!("SHIPPED".parse::<OrderStatus>().is_err());
  }
}
