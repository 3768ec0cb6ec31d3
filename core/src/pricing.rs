// tukangin/src/pricing.rs

//! Pricing and voucher validation for prospective orders.
//!
//! Read-only: the caller persists the quote together with the order.

use crate::error::OrderError;
use crate::model::{UserId, Voucher, VoucherId, MAX_AMOUNT};
use crate::store::{CatalogStore, OrderStore, Store};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
  pub subtotal: i64,
  pub discount: i64,
  pub total: i64,
  #[serde(skip)]
  pub voucher_id: Option<VoucherId>,
  #[serde(skip)]
  pub voucher_usage_limit: Option<i64>,
}

impl Quote {
  pub fn without_voucher(subtotal: i64) -> Self {
    Self {
      subtotal,
      discount: 0,
      total: subtotal,
      voucher_id: None,
      voucher_usage_limit: None,
    }
  }

  pub fn with_voucher(subtotal: i64, voucher: &Voucher) -> Self {
    let discount = voucher.discount_for(subtotal);
    Self {
      subtotal,
      discount,
      total: (subtotal - discount).max(0),
      voucher_id: Some(voucher.id),
      voucher_usage_limit: voucher.usage_limit,
    }
  }
}

/// Checks that `voucher` may be used by a customer who has already used it
/// `prior_uses` times.
pub fn check_eligibility(voucher: &Voucher, prior_uses: i64, now: DateTime<Utc>) -> Result<(), OrderError> {
  if !voucher.is_active || voucher.is_expired(now) {
    return Err(OrderError::VoucherInactive(voucher.code.clone()));
  }
  if let Some(limit) = voucher.usage_limit {
    if prior_uses >= limit {
      return Err(OrderError::VoucherUsageExceeded(voucher.code.clone()));
    }
  }
  Ok(())
}

/// Subtotals must lie in `0..=MAX_AMOUNT`.
pub fn check_subtotal(subtotal: i64) -> Result<(), OrderError> {
  if subtotal < 0 {
    return Err(OrderError::Validation("Subtotal must not be negative.".to_string()));
  }
  if subtotal > MAX_AMOUNT {
    return Err(OrderError::Validation(format!(
      "Subtotal must not exceed {}.",
      MAX_AMOUNT
    )));
  }
  Ok(())
}

/// Produces `{subtotal, discount, total}` for `customer_id`, validating the voucher if one is given.
#[instrument(name = "pricing::quote", skip(store, now), err(Display))]
pub async fn quote(
  store: &dyn Store,
  customer_id: UserId,
  subtotal: i64,
  voucher_code: Option<&str>,
  now: DateTime<Utc>,
) -> Result<Quote, OrderError> {
  check_subtotal(subtotal)?;
  let code = match voucher_code.map(str::trim).filter(|c| !c.is_empty()) {
    Some(code) => code,
    None => return Ok(Quote::without_voucher(subtotal)),
  };

  let voucher = store
    .find_voucher_by_code(code)
    .await?
    .ok_or_else(|| OrderError::VoucherNotFound(code.to_string()))?;
  let prior_uses = store.count_voucher_usage(customer_id, voucher.id).await?;
  check_eligibility(&voucher, prior_uses, now)?;

  let quote = Quote::with_voucher(subtotal, &voucher);
  debug!(code, discount = quote.discount, total = quote.total, "Voucher applied.");
  Ok(quote)
}
