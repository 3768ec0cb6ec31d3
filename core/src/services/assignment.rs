// tukangin/src/services/assignment.rs

//! Binding a professional ("tukang") to a paid order. Admin only.

use super::incomplete;
use crate::error::{OrderError, OrderResult};
use crate::flow::{Flow, FlowData, FlowOutcome, StepControl, StepMode};
use crate::identity::RequestContext;
use crate::lifecycle::{self, LifecycleEvent};
use crate::model::{Order, OrderId, ProfessionalId};
use crate::store::{CatalogStore, OrderPatch, OrderStore, Precondition, Store};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

const FLOW_NAME: &str = "assign_professional";

/// Result of a single assignment. `changed` is false when the professional
/// was already bound and nothing was written.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
  pub order: Order,
  pub changed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastFailure {
  pub order_id: OrderId,
  pub reason: &'static str,
  pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastReport {
  pub assigned: Vec<OrderId>,
  pub failed: Vec<BroadcastFailure>,
}

struct AssignData {
  store: Arc<dyn Store>,
  order_id: OrderId,
  professional_id: ProfessionalId,
  order: Option<Order>,
  assignment: Option<Assignment>,
}

pub struct AssignmentService {
  flow: Flow<AssignData, OrderError>,
}

impl AssignmentService {
  pub fn new() -> Self {
    let mut flow = Flow::new(
      FLOW_NAME,
      &[
        ("load_order", StepMode::Required),
        ("check_professional", StepMode::Required),
        ("check_deposit", StepMode::Required),
        ("bind_professional", StepMode::Required),
      ],
    );
    flow.on("load_order", load_order);
    flow.on("check_professional", check_professional);
    flow.on("check_deposit", check_deposit);
    flow.on("bind_professional", bind_professional);
    Self { flow }
  }

  #[instrument(name = "AssignmentService::assign", skip(self, store, ctx), err(Display))]
  pub async fn assign(
    &self,
    store: Arc<dyn Store>,
    ctx: &RequestContext,
    order_id: OrderId,
    professional_id: ProfessionalId,
  ) -> OrderResult<Assignment> {
    ctx.require_admin()?;
    let data = FlowData::new(AssignData {
      store,
      order_id,
      professional_id,
      order: None,
      assignment: None,
    });
    let run = self.flow.run(data.clone()).await?;
    if run.outcome == FlowOutcome::Stopped {
      debug!(%order_id, "Assignment short-circuited; professional already bound.");
    }
    let assignment = data.write().assignment.take();
    assignment.ok_or_else(|| incomplete(FLOW_NAME, "bind_professional"))
  }

  /// Assigns `professional_id` to each order in turn. Failures are collected
  /// per order and never stop the rest of the batch.
  #[instrument(name = "AssignmentService::broadcast", skip(self, store, ctx, order_ids), fields(num_orders = order_ids.len()))]
  pub async fn broadcast(
    &self,
    store: Arc<dyn Store>,
    ctx: &RequestContext,
    order_ids: &[OrderId],
    professional_id: ProfessionalId,
  ) -> OrderResult<BroadcastReport> {
    ctx.require_admin()?;
    let mut report = BroadcastReport::default();
    for order_id in order_ids {
      match self.assign(store.clone(), ctx, *order_id, professional_id).await {
        Ok(_) => report.assigned.push(*order_id),
        Err(e) => {
          warn!(%order_id, error = %e, "Broadcast assignment failed for order.");
          report.failed.push(BroadcastFailure {
            order_id: *order_id,
            reason: e.reason(),
            message: e.to_string(),
          });
        }
      }
    }
    info!(
      assigned = report.assigned.len(),
      failed = report.failed.len(),
      "Broadcast finished."
    );
    Ok(report)
  }
}

impl Default for AssignmentService {
  fn default() -> Self {
    Self::new()
  }
}

async fn load_order(ctx: FlowData<AssignData>) -> OrderResult<StepControl> {
  let (store, order_id) = {
    let guard = ctx.read();
    (guard.store.clone(), guard.order_id)
  };
  let order = store
    .find_order(order_id)
    .await?
    .ok_or_else(|| OrderError::not_found("order", order_id))?;
  ctx.write().order = Some(order);
  Ok(StepControl::Continue)
}

async fn check_professional(ctx: FlowData<AssignData>) -> OrderResult<StepControl> {
  let (store, professional_id) = {
    let guard = ctx.read();
    (guard.store.clone(), guard.professional_id)
  };
  let professional = store.find_professional(professional_id).await?;
  if professional.is_none() {
    return Err(OrderError::not_found("professional", professional_id));
  }
  Ok(StepControl::Continue)
}

async fn check_deposit(ctx: FlowData<AssignData>) -> OrderResult<StepControl> {
  let mut guard = ctx.write();
  let order = guard.order.clone().ok_or_else(|| incomplete(FLOW_NAME, "load_order"))?;
  // Finished or cancelled orders reject assignment, even of the professional already bound.
  lifecycle::next_status(order.status, LifecycleEvent::ProfessionalAssigned)?;
  if !order.is_paid() {
    return Err(OrderError::DepositRequired { order_id: order.id });
  }
  if order.professional_id == Some(guard.professional_id) {
    guard.assignment = Some(Assignment { order, changed: false });
    return Ok(StepControl::Stop);
  }
  Ok(StepControl::Continue)
}

async fn bind_professional(ctx: FlowData<AssignData>) -> OrderResult<StepControl> {
  let (store, order_id, professional_id, current) = {
    let guard = ctx.read();
    let current = guard
      .order
      .as_ref()
      .map(|o| o.status)
      .ok_or_else(|| incomplete(FLOW_NAME, "load_order"))?;
    (guard.store.clone(), guard.order_id, guard.professional_id, current)
  };

  let next = lifecycle::next_status(current, LifecycleEvent::ProfessionalAssigned)?;
  let precondition = Precondition::for_event(LifecycleEvent::ProfessionalAssigned).paid();
  let updated = store
    .update_order(order_id, OrderPatch::status(next).professional(professional_id), Some(precondition))
    .await?;

  info!(
    "Assign Flow (Order {}): Professional {} assigned. Status now {}.",
    updated.id, professional_id, updated.status
  );
  ctx.write().assignment = Some(Assignment {
    order: updated,
    changed: true,
  });
  Ok(StepControl::Continue)
}
