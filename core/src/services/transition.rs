// tukangin/src/services/transition.rs

//! Status changes after payment: customer completion and cancellation, and
//! the admin "finish work" and cancel operations.
//!
//! Every change goes through the lifecycle table and a conditional update.
//! Completion then issues the warranty as a best-effort step: a failure there
//! is logged and reported, but the order stays COMPLETED.

use super::warranty::WarrantyIssuer;
use super::{incomplete, load_owned_order};
use crate::config::LifecycleConfig;
use crate::error::{OrderError, OrderResult};
use crate::flow::{Flow, FlowData, StepControl, StepMode};
use crate::identity::RequestContext;
use crate::lifecycle::{self, LifecycleEvent};
use crate::model::{Order, OrderId, OrderStatus, UserId, Warranty};
use crate::store::{OrderPatch, OrderStore, Precondition, Store};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

const FLOW_NAME: &str = "order_transition";
const ISSUE_WARRANTY: &str = "issue_warranty";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionOutcome {
  pub order: Order,
  pub warranty: Option<Warranty>,
  /// Set when the order completed but its warranty could not be issued.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub warranty_error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Actor {
  Customer(UserId),
  Admin,
}

struct TransitionData {
  store: Arc<dyn Store>,
  issuer: WarrantyIssuer,
  order_id: OrderId,
  actor: Actor,
  event: LifecycleEvent,
  order: Option<Order>,
  updated: Option<Order>,
  warranty: Option<Warranty>,
}

pub struct LifecycleService {
  issuer: WarrantyIssuer,
  flow: Flow<TransitionData, OrderError>,
}

impl LifecycleService {
  pub fn new(config: LifecycleConfig) -> Self {
    let mut flow = Flow::new(
      FLOW_NAME,
      &[
        ("load_order", StepMode::Required),
        ("apply_transition", StepMode::Required),
        (ISSUE_WARRANTY, StepMode::BestEffort),
      ],
    );
    flow.on("load_order", load_order);
    flow.on("apply_transition", apply_transition);
    flow.on(ISSUE_WARRANTY, issue_warranty);
    flow.skip_if(ISSUE_WARRANTY, |ctx: &FlowData<TransitionData>| {
      ctx.read().updated.as_ref().map(|o| o.status) != Some(OrderStatus::Completed)
    });
    Self {
      issuer: WarrantyIssuer::new(config),
      flow,
    }
  }

  /// Customer-requested status change. Only COMPLETED and CANCELLED can be
  /// requested; any other target is an invalid transition from the current status.
  #[instrument(name = "LifecycleService::change_status", skip(self, store, ctx), err(Display))]
  pub async fn change_status(
    &self,
    store: Arc<dyn Store>,
    ctx: &RequestContext,
    order_id: OrderId,
    target: OrderStatus,
  ) -> OrderResult<TransitionOutcome> {
    let user_id = ctx.require_user()?;
    match lifecycle::customer_event_for(target) {
      Some(event) => self.run(store, order_id, Actor::Customer(user_id), event).await,
      None => {
        let order = load_owned_order(store.as_ref(), order_id, user_id).await?;
        Err(OrderError::InvalidTransition {
          from: order.status,
          to: target,
        })
      }
    }
  }

  /// PROCESSING to WARRANTY once the professional reports the job done.
  #[instrument(name = "LifecycleService::finish_work", skip(self, store, ctx), err(Display))]
  pub async fn finish_work(
    &self,
    store: Arc<dyn Store>,
    ctx: &RequestContext,
    order_id: OrderId,
  ) -> OrderResult<TransitionOutcome> {
    ctx.require_admin()?;
    self.run(store, order_id, Actor::Admin, LifecycleEvent::WorkFinished).await
  }

  /// Admin cancellation of any order, under the same unassigned-only rule as customers.
  #[instrument(name = "LifecycleService::cancel", skip(self, store, ctx), err(Display))]
  pub async fn cancel(
    &self,
    store: Arc<dyn Store>,
    ctx: &RequestContext,
    order_id: OrderId,
  ) -> OrderResult<TransitionOutcome> {
    ctx.require_admin()?;
    self.run(store, order_id, Actor::Admin, LifecycleEvent::Cancelled).await
  }

  async fn run(
    &self,
    store: Arc<dyn Store>,
    order_id: OrderId,
    actor: Actor,
    event: LifecycleEvent,
  ) -> OrderResult<TransitionOutcome> {
    let data = FlowData::new(TransitionData {
      store,
      issuer: self.issuer.clone(),
      order_id,
      actor,
      event,
      order: None,
      updated: None,
      warranty: None,
    });
    let run = self.flow.run(data.clone()).await?;
    let warranty_error = run
      .degraded
      .into_iter()
      .find(|d| d.step_name == ISSUE_WARRANTY)
      .map(|d| d.message);

    let mut guard = data.write();
    let order = guard.updated.take().ok_or_else(|| incomplete(FLOW_NAME, "apply_transition"))?;
    Ok(TransitionOutcome {
      order,
      warranty: guard.warranty.take(),
      warranty_error,
    })
  }
}

async fn load_order(ctx: FlowData<TransitionData>) -> OrderResult<StepControl> {
  let (store, order_id, actor) = {
    let guard = ctx.read();
    (guard.store.clone(), guard.order_id, guard.actor)
  };
  let order = match actor {
    Actor::Customer(user_id) => load_owned_order(store.as_ref(), order_id, user_id).await?,
    Actor::Admin => store
      .find_order(order_id)
      .await?
      .ok_or_else(|| OrderError::not_found("order", order_id))?,
  };
  ctx.write().order = Some(order);
  Ok(StepControl::Continue)
}

async fn apply_transition(ctx: FlowData<TransitionData>) -> OrderResult<StepControl> {
  let (store, event, order) = {
    let guard = ctx.read();
    let order = guard.order.clone().ok_or_else(|| incomplete(FLOW_NAME, "load_order"))?;
    (guard.store.clone(), guard.event, order)
  };

  let next = lifecycle::next_status(order.status, event)?;
  let now = Utc::now();
  let mut precondition = Precondition::for_event(event);
  let patch = match event {
    LifecycleEvent::Completed => OrderPatch::status(next).completed_at(now),
    // A cancelled order never keeps a professional, for customers and admins alike.
    LifecycleEvent::Cancelled => {
      if order.professional_id.is_some() {
        return Err(OrderError::Conflict(format!(
          "Order {} already has a professional assigned and can no longer be cancelled.",
          order.id
        )));
      }
      precondition = precondition.unassigned();
      OrderPatch::status(next).cancelled_at(now)
    }
    LifecycleEvent::WorkFinished => {
      if order.professional_id.is_none() {
        return Err(OrderError::Conflict(format!(
          "Order {} has no professional assigned.",
          order.id
        )));
      }
      OrderPatch::status(next)
    }
    LifecycleEvent::DepositPaid | LifecycleEvent::ProfessionalAssigned => OrderPatch::status(next),
  };

  let updated = store.update_order(order.id, patch, Some(precondition)).await?;
  info!(
    "Transition Flow (Order {}): {} -> {} on {}.",
    updated.id, order.status, updated.status, event
  );
  ctx.write().updated = Some(updated);
  Ok(StepControl::Continue)
}

async fn issue_warranty(ctx: FlowData<TransitionData>) -> OrderResult<StepControl> {
  let (store, issuer, updated) = {
    let guard = ctx.read();
    let updated = guard
      .updated
      .clone()
      .ok_or_else(|| incomplete(FLOW_NAME, "apply_transition"))?;
    (guard.store.clone(), guard.issuer.clone(), updated)
  };
  let warranty = issuer.issue(store.as_ref(), &updated).await?;
  ctx.write().warranty = Some(warranty);
  Ok(StepControl::Continue)
}
