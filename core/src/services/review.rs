// tukangin/src/services/review.rs

//! Customer reviews of completed jobs. One review per order.

use super::load_owned_order;
use crate::error::{OrderError, OrderResult, StoreError};
use crate::identity::RequestContext;
use crate::model::{NewReview, OrderId, OrderStatus, ProfessionalId, Review, MAX_RATING, MIN_RATING};
use crate::store::{ReviewStore, Store};
use serde::Deserialize;
use tracing::{info, instrument};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReview {
  pub order_id: OrderId,
  #[serde(default, alias = "tukangId")]
  pub professional_id: Option<ProfessionalId>,
  pub rating: i32,
  #[serde(default)]
  pub comment: String,
  #[serde(default)]
  pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReviewRecorder;

impl ReviewRecorder {
  pub fn new() -> Self {
    Self
  }

  #[instrument(name = "ReviewRecorder::submit", skip(self, store, ctx, review), fields(order_id = %review.order_id), err(Display))]
  pub async fn submit(&self, store: &dyn Store, ctx: &RequestContext, review: SubmitReview) -> OrderResult<Review> {
    let user_id = ctx.require_user()?;
    if !(MIN_RATING..=MAX_RATING).contains(&review.rating) {
      return Err(OrderError::InvalidRating(review.rating));
    }

    let order = load_owned_order(store, review.order_id, user_id).await?;
    if order.status != OrderStatus::Completed {
      return Err(OrderError::ReviewNotAllowed {
        order_id: order.id,
        status: order.status,
      });
    }
    if let Some(submitted) = review.professional_id {
      if order.professional_id != Some(submitted) {
        return Err(OrderError::Validation(format!(
          "Professional {} did not work on order {}.",
          submitted, order.id
        )));
      }
    }

    let new_review = NewReview {
      order_id: order.id,
      user_id,
      professional_id: order.professional_id,
      rating: review.rating,
      comment: review.comment.trim().to_string(),
      tags: normalize_tags(review.tags),
    };
    let stored = store.insert_review(new_review).await.map_err(|e| match e {
      StoreError::Conflict(_) => OrderError::ReviewAlreadyExists { order_id: order.id },
      other => other.into(),
    })?;
    info!("Review {}: Order {} rated {}.", stored.id, stored.order_id, stored.rating);
    Ok(stored)
  }
}

/// Trims tags, drops blanks and duplicates, keeps first-seen order.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
  let mut seen = Vec::with_capacity(tags.len());
  for tag in tags {
    let tag = tag.trim();
    if !tag.is_empty() && !seen.iter().any(|t: &String| t.eq_ignore_ascii_case(tag)) {
      seen.push(tag.to_string());
    }
  }
  seen
}
