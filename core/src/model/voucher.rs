// tukangin/src/model/voucher.rs

use super::VoucherId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DiscountRule {
  /// Whole percent of the subtotal, 1..=100.
  Percentage(i64),
  /// Fixed amount in the smallest currency unit.
  Flat(i64),
}

/// A discount code. Read-only from the engine's point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voucher {
  pub id: VoucherId,
  pub code: String,
  pub is_active: bool,
  pub expiry_date: Option<DateTime<Utc>>,
  /// `None` means unlimited.
  pub usage_limit: Option<i64>,
  pub rule: DiscountRule,
  pub max_discount: Option<i64>,
}

impl Voucher {
  pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
    self.expiry_date.map_or(false, |expiry| expiry < now)
  }

  /// Discount granted on `subtotal`, capped by `max_discount` and never above the subtotal.
  pub fn discount_for(&self, subtotal: i64) -> i64 {
    let raw = match self.rule {
      DiscountRule::Percentage(percent) => {
        let raw = i128::from(subtotal) * i128::from(percent.clamp(0, 100)) / 100;
        i64::try_from(raw).unwrap_or(i64::MAX)
      }
      DiscountRule::Flat(amount) => amount.max(0),
    };
    let capped = match self.max_discount {
      Some(cap) => raw.min(cap.max(0)),
      None => raw,
    };
    capped.clamp(0, subtotal.max(0))
  }
}
