// tukangin/src/services/payment.rs

//! Deposit ("DP") payments. A correct deposit moves a PENDING order to
//! PROCESSING; the payment fields and the status are written by one
//! conditional update, so of two concurrent payments exactly one lands.

use super::{incomplete, load_owned_order};
use crate::error::{OrderError, OrderResult};
use crate::flow::{Flow, FlowData, StepControl, StepMode};
use crate::identity::RequestContext;
use crate::lifecycle::{self, LifecycleEvent};
use crate::model::{Order, OrderId, OrderStatus, PaymentMethod, UserId};
use crate::store::{OrderPatch, OrderStore, Precondition, Store};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

const FLOW_NAME: &str = "pay_deposit";

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRequest {
  pub amount: i64,
  pub method: PaymentMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositReceipt {
  pub order_id: OrderId,
  pub amount: i64,
  pub method: PaymentMethod,
  pub paid_at: DateTime<Utc>,
  pub order_status: OrderStatus,
}

struct DepositData {
  store: Arc<dyn Store>,
  customer_id: UserId,
  order_id: OrderId,
  request: DepositRequest,
  order: Option<Order>,
  receipt: Option<DepositReceipt>,
}

pub struct DepositProcessor {
  flow: Flow<DepositData, OrderError>,
}

impl DepositProcessor {
  pub fn new() -> Self {
    let mut flow = Flow::new(
      FLOW_NAME,
      &[
        ("load_order", StepMode::Required),
        ("verify_amount", StepMode::Required),
        ("advance_to_processing", StepMode::Required),
      ],
    );
    flow.on("load_order", load_order);
    flow.on("verify_amount", verify_amount);
    flow.on("advance_to_processing", advance_to_processing);
    Self { flow }
  }

  #[instrument(name = "DepositProcessor::pay", skip(self, store, ctx, request), fields(amount = request.amount), err(Display))]
  pub async fn pay(
    &self,
    store: Arc<dyn Store>,
    ctx: &RequestContext,
    order_id: OrderId,
    request: DepositRequest,
  ) -> OrderResult<DepositReceipt> {
    let customer_id = ctx.require_user()?;
    let data = FlowData::new(DepositData {
      store,
      customer_id,
      order_id,
      request,
      order: None,
      receipt: None,
    });
    self.flow.run(data.clone()).await?;
    let receipt = data.write().receipt.take();
    receipt.ok_or_else(|| incomplete(FLOW_NAME, "advance_to_processing"))
  }
}

impl Default for DepositProcessor {
  fn default() -> Self {
    Self::new()
  }
}

async fn load_order(ctx: FlowData<DepositData>) -> OrderResult<StepControl> {
  let (store, order_id, customer_id) = {
    let guard = ctx.read();
    (guard.store.clone(), guard.order_id, guard.customer_id)
  };
  let order = load_owned_order(store.as_ref(), order_id, customer_id).await?;
  ctx.write().order = Some(order);
  Ok(StepControl::Continue)
}

async fn verify_amount(ctx: FlowData<DepositData>) -> OrderResult<StepControl> {
  let guard = ctx.read();
  let order = guard.order.as_ref().ok_or_else(|| incomplete(FLOW_NAME, "load_order"))?;
  let expected = order.deposit_due();
  if guard.request.amount != expected {
    warn!(
      "Deposit Flow (Order {}): Rejected amount {}, expected {}.",
      order.id, guard.request.amount, expected
    );
    return Err(OrderError::InvalidDepositAmount {
      expected,
      received: guard.request.amount,
    });
  }
  Ok(StepControl::Continue)
}

async fn advance_to_processing(ctx: FlowData<DepositData>) -> OrderResult<StepControl> {
  let (store, order_id, request, current) = {
    let guard = ctx.read();
    let current = guard
      .order
      .as_ref()
      .map(|o| o.status)
      .ok_or_else(|| incomplete(FLOW_NAME, "load_order"))?;
    (guard.store.clone(), guard.order_id, guard.request, current)
  };

  let already_paid = OrderError::AlreadyPaidOrInvalidState { order_id };
  let next = lifecycle::next_status(current, LifecycleEvent::DepositPaid).map_err(|_| already_paid)?;
  let paid_at = Utc::now();
  let patch = OrderPatch::status(next).deposit(request.amount, request.method, paid_at);

  let updated = store
    .update_order(order_id, patch, Some(Precondition::for_event(LifecycleEvent::DepositPaid)))
    .await
    .map_err(|e| match OrderError::from(e) {
      OrderError::PreconditionFailed { order_id } => OrderError::AlreadyPaidOrInvalidState { order_id },
      other => other,
    })?;

  info!(
    "Deposit Flow (Order {}): Paid {} via {}. Status now {}.",
    updated.id, request.amount, request.method, updated.status
  );
  ctx.write().receipt = Some(DepositReceipt {
    order_id: updated.id,
    amount: request.amount,
    method: request.method,
    paid_at: updated.paid_at.unwrap_or(paid_at),
    order_status: updated.status,
  });
  Ok(StepControl::Continue)
}
