// tukangin/src/model/review.rs

use super::{OrderId, ProfessionalId, ReviewId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
  pub id: ReviewId,
  pub order_id: OrderId,
  pub user_id: UserId,
  pub professional_id: Option<ProfessionalId>,
  pub rating: i32,
  pub comment: String,
  pub tags: Vec<String>,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReview {
  pub order_id: OrderId,
  pub user_id: UserId,
  pub professional_id: Option<ProfessionalId>,
  pub rating: i32,
  pub comment: String,
  pub tags: Vec<String>,
}
