// tukangin/src/engine.rs

//! `OrderEngine`: one handle over the store and every lifecycle service.
//! Built once at startup and shared by reference (usually behind an `Arc`).

use crate::config::LifecycleConfig;
use crate::error::{OrderError, OrderResult};
use crate::identity::{RequestContext, Role};
use crate::model::{Order, OrderId, OrderStatus, ProfessionalId, Review, WarrantyId};
use crate::pricing::{self, Quote};
use crate::services::{
  self, Assignment, AssignmentService, BroadcastReport, ClaimReceipt, ClaimRequest, CreateOrderRequest,
  DepositProcessor, DepositReceipt, DepositRequest, LifecycleService, OrderCreation, ReconcileReport,
  ReviewRecorder, SubmitReview, TransitionOutcome, WarrantyIssuer, WarrantyView,
};
use crate::store::{OrderStore, Store};
use chrono::Utc;
use std::sync::Arc;

pub struct OrderEngine {
  store: Arc<dyn Store>,
  creation: OrderCreation,
  deposits: DepositProcessor,
  assignments: AssignmentService,
  transitions: LifecycleService,
  warranties: WarrantyIssuer,
  reviews: ReviewRecorder,
}

impl OrderEngine {
  pub fn new(store: Arc<dyn Store>, config: LifecycleConfig) -> Self {
    Self {
      store,
      creation: OrderCreation::new(),
      deposits: DepositProcessor::new(),
      assignments: AssignmentService::new(),
      transitions: LifecycleService::new(config.clone()),
      warranties: WarrantyIssuer::new(config),
      reviews: ReviewRecorder::new(),
    }
  }

  pub fn store(&self) -> &Arc<dyn Store> {
    &self.store
  }

  pub fn config(&self) -> &LifecycleConfig {
    self.warranties.config()
  }

  /// Prices a prospective order without persisting anything.
  pub async fn quote(
    &self,
    ctx: &RequestContext,
    subtotal: i64,
    voucher_code: Option<&str>,
  ) -> OrderResult<Quote> {
    let customer_id = ctx.require_user()?;
    pricing::quote(self.store.as_ref(), customer_id, subtotal, voucher_code, Utc::now()).await
  }

  pub async fn create_order(&self, ctx: &RequestContext, request: CreateOrderRequest) -> OrderResult<Order> {
    self.creation.create(self.store.clone(), ctx, request).await
  }

  /// Customers see their own orders only; admins see any order.
  pub async fn get_order(&self, ctx: &RequestContext, order_id: OrderId) -> OrderResult<Order> {
    match ctx.role {
      Role::Admin => self
        .store
        .find_order(order_id)
        .await?
        .ok_or_else(|| OrderError::not_found("order", order_id)),
      Role::Customer => {
        let user_id = ctx.require_user()?;
        services::load_owned_order(self.store.as_ref(), order_id, user_id).await
      }
    }
  }

  pub async fn pay_deposit(
    &self,
    ctx: &RequestContext,
    order_id: OrderId,
    request: DepositRequest,
  ) -> OrderResult<DepositReceipt> {
    self.deposits.pay(self.store.clone(), ctx, order_id, request).await
  }

  pub async fn change_status(
    &self,
    ctx: &RequestContext,
    order_id: OrderId,
    target: OrderStatus,
  ) -> OrderResult<TransitionOutcome> {
    self.transitions.change_status(self.store.clone(), ctx, order_id, target).await
  }

  pub async fn finish_work(&self, ctx: &RequestContext, order_id: OrderId) -> OrderResult<TransitionOutcome> {
    self.transitions.finish_work(self.store.clone(), ctx, order_id).await
  }

  pub async fn cancel_order(&self, ctx: &RequestContext, order_id: OrderId) -> OrderResult<TransitionOutcome> {
    self.transitions.cancel(self.store.clone(), ctx, order_id).await
  }

  pub async fn assign_professional(
    &self,
    ctx: &RequestContext,
    order_id: OrderId,
    professional_id: ProfessionalId,
  ) -> OrderResult<Assignment> {
    self.assignments.assign(self.store.clone(), ctx, order_id, professional_id).await
  }

  pub async fn broadcast(
    &self,
    ctx: &RequestContext,
    order_ids: &[OrderId],
    professional_id: ProfessionalId,
  ) -> OrderResult<BroadcastReport> {
    self.assignments.broadcast(self.store.clone(), ctx, order_ids, professional_id).await
  }

  pub async fn get_warranty(&self, ctx: &RequestContext, order_id: OrderId) -> OrderResult<WarrantyView> {
    self.warranties.lookup(self.store.as_ref(), ctx, order_id).await
  }

  pub async fn claim_warranty(
    &self,
    ctx: &RequestContext,
    warranty_id: WarrantyId,
    request: ClaimRequest,
  ) -> OrderResult<ClaimReceipt> {
    self.warranties.claim(self.store.as_ref(), ctx, warranty_id, request).await
  }

  pub async fn submit_review(&self, ctx: &RequestContext, review: SubmitReview) -> OrderResult<Review> {
    self.reviews.submit(self.store.as_ref(), ctx, review).await
  }

  /// Admin entry point for warranty reconciliation.
  pub async fn reconcile_warranties(&self, ctx: &RequestContext, limit: usize) -> OrderResult<ReconcileReport> {
    ctx.require_admin()?;
    self.run_reconciliation(limit).await
  }

  /// Reconciliation without an identity check, for the periodic background task.
  pub async fn run_reconciliation(&self, limit: usize) -> OrderResult<ReconcileReport> {
    self.warranties.reconcile(self.store.as_ref(), limit).await
  }
}
