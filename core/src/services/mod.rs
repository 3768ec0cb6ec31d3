// tukangin/src/services/mod.rs

//! The order-lifecycle services. Multi-step operations are expressed as
//! `Flow`s over a per-call context; each step handler is a plain async fn.

pub mod assignment;
pub mod ordering;
pub mod payment;
pub mod review;
pub mod transition;
pub mod warranty;

pub use assignment::{Assignment, AssignmentService, BroadcastFailure, BroadcastReport};
pub use ordering::{CreateOrderRequest, OrderCreation};
pub use payment::{DepositProcessor, DepositReceipt, DepositRequest};
pub use review::{ReviewRecorder, SubmitReview};
pub use transition::{LifecycleService, TransitionOutcome};
pub use warranty::{ClaimReceipt, ClaimRequest, ReconcileReport, WarrantyIssuer, WarrantyView};

use crate::error::{FlowError, OrderError, OrderResult};
use crate::model::{Order, OrderId, UserId};
use crate::store::{OrderStore, Store};
use tracing::warn;

/// The flow ended without the step that fills in its result.
pub(crate) fn incomplete(flow: &'static str, step_name: &'static str) -> OrderError {
  OrderError::Flow(FlowError::Incomplete { flow, step_name })
}

/// Trims `value` and rejects it when nothing is left.
pub(crate) fn require_text(field: &str, value: &str) -> Result<String, OrderError> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Err(OrderError::Validation(format!("{} is required.", field)));
  }
  Ok(trimmed.to_string())
}

/// Loads an order on behalf of `user_id`. Someone else's order is reported
/// exactly like a missing one.
pub(crate) async fn load_owned_order(store: &dyn Store, order_id: OrderId, user_id: UserId) -> OrderResult<Order> {
  let order = store
    .find_order(order_id)
    .await?
    .ok_or_else(|| OrderError::not_found("order", order_id))?;
  if order.customer_id != user_id {
    warn!(%order_id, %user_id, "Order requested by a user who does not own it.");
    return Err(OrderError::not_owned("order", order_id));
  }
  Ok(order)
}
