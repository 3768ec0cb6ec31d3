// tukangin/src/model/warranty.rs

use super::{OrderId, ProfessionalId, UserId, WarrantyId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarrantyStatus {
  Active,
  Claimed,
}

impl WarrantyStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      WarrantyStatus::Active => "ACTIVE",
      WarrantyStatus::Claimed => "CLAIMED",
    }
  }
}

impl fmt::Display for WarrantyStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for WarrantyStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_uppercase().as_str() {
      "ACTIVE" => Ok(WarrantyStatus::Active),
      "CLAIMED" => Ok(WarrantyStatus::Claimed),
      _ => Err(format!("Unknown warranty status: {}", s)),
    }
  }
}

/// Status reported back to the customer after filing a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimStatus {
  Submitted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarrantyClaim {
  pub issue_description: String,
  pub evidence_photos: Vec<String>,
  pub claimed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warranty {
  pub id: WarrantyId,
  pub order_id: OrderId,
  pub user_id: UserId,
  pub professional_id: Option<ProfessionalId>,
  pub status: WarrantyStatus,
  pub coverage_type: String,
  pub terms: String,
  pub created_at: DateTime<Utc>,
  pub valid_until: DateTime<Utc>,
  pub claim: Option<WarrantyClaim>,
}

impl Warranty {
  /// Whole days left until `valid_until`, floored, never negative.
  pub fn remaining_days(&self, now: DateTime<Utc>) -> i64 {
    (self.valid_until - now).num_days().max(0)
  }

  pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
    self.valid_until <= now
  }
}

#[derive(Debug, Clone)]
pub struct NewWarranty {
  pub order_id: OrderId,
  pub user_id: UserId,
  pub professional_id: Option<ProfessionalId>,
  pub coverage_type: String,
  pub terms: String,
  pub created_at: DateTime<Utc>,
  pub valid_until: DateTime<Utc>,
}
