// tukangin/src/store/mod.rs

//! Store contracts consumed by the services.
//!
//! `OrderStore` is the only way order rows are read or written. Its
//! `update_order` is the serialization point for a single order: with a
//! precondition supplied, the check and the write happen atomically, or the
//! call fails with `StoreError::PreconditionFailed` and the row is untouched.

pub mod memory;

use crate::error::StoreResult;
use crate::lifecycle::{self, LifecycleEvent};
use crate::model::{
  NewOrder, NewReview, NewWarranty, Order, OrderId, OrderStatus, PaymentMethod, Professional, ProfessionalId, Review,
  UserId, Voucher, VoucherId, Warranty, WarrantyClaim, WarrantyId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use memory::MemoryStore;

/// Partial update of an order row. `None` leaves a column as it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderPatch {
  pub status: Option<OrderStatus>,
  pub professional_id: Option<ProfessionalId>,
  pub paid_at: Option<DateTime<Utc>>,
  pub deposit_amount: Option<i64>,
  pub payment_method: Option<PaymentMethod>,
  pub completed_at: Option<DateTime<Utc>>,
  pub cancelled_at: Option<DateTime<Utc>>,
}

impl OrderPatch {
  pub fn status(status: OrderStatus) -> Self {
    Self {
      status: Some(status),
      ..Self::default()
    }
  }

  pub fn professional(mut self, professional_id: ProfessionalId) -> Self {
    self.professional_id = Some(professional_id);
    self
  }

  pub fn deposit(mut self, amount: i64, method: PaymentMethod, paid_at: DateTime<Utc>) -> Self {
    self.deposit_amount = Some(amount);
    self.payment_method = Some(method);
    self.paid_at = Some(paid_at);
    self
  }

  pub fn completed_at(mut self, at: DateTime<Utc>) -> Self {
    self.completed_at = Some(at);
    self
  }

  pub fn cancelled_at(mut self, at: DateTime<Utc>) -> Self {
    self.cancelled_at = Some(at);
    self
  }

  /// Applies the patch in place. Used by stores that hold rows in memory.
  pub fn apply(&self, order: &mut Order, now: DateTime<Utc>) {
    if let Some(status) = self.status {
      order.status = status;
    }
    if let Some(professional_id) = self.professional_id {
      order.professional_id = Some(professional_id);
    }
    if let Some(paid_at) = self.paid_at {
      order.paid_at = Some(paid_at);
    }
    if let Some(amount) = self.deposit_amount {
      order.deposit_amount = Some(amount);
    }
    if let Some(method) = self.payment_method {
      order.payment_method = Some(method);
    }
    if let Some(completed_at) = self.completed_at {
      order.completed_at = Some(completed_at);
    }
    if let Some(cancelled_at) = self.cancelled_at {
      order.cancelled_at = Some(cancelled_at);
    }
    order.updated_at = now;
  }
}

/// What must hold on the current row for a conditional update to apply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Precondition {
  /// Allowed current statuses. Empty means any.
  pub status_in: Vec<OrderStatus>,
  pub require_unassigned: bool,
  pub require_paid: bool,
}

impl Precondition {
  pub fn status_in(statuses: impl Into<Vec<OrderStatus>>) -> Self {
    Self {
      status_in: statuses.into(),
      ..Self::default()
    }
  }

  /// The statuses from which `event` is legal, straight from the lifecycle table.
  pub fn for_event(event: LifecycleEvent) -> Self {
    Self::status_in(lifecycle::sources(event))
  }

  pub fn unassigned(mut self) -> Self {
    self.require_unassigned = true;
    self
  }

  pub fn paid(mut self) -> Self {
    self.require_paid = true;
    self
  }

  pub fn holds(&self, order: &Order) -> bool {
    (self.status_in.is_empty() || self.status_in.contains(&order.status))
      && (!self.require_unassigned || order.professional_id.is_none())
      && (!self.require_paid || order.paid_at.is_some())
  }
}

#[async_trait]
pub trait OrderStore: Send + Sync {
  /// Persists a new PENDING order and returns the stored row.
  async fn create_order(&self, order: NewOrder) -> StoreResult<Order>;

  async fn find_order(&self, order_id: OrderId) -> StoreResult<Option<Order>>;

  async fn update_order(
    &self,
    order_id: OrderId,
    patch: OrderPatch,
    precondition: Option<Precondition>,
  ) -> StoreResult<Order>;

  /// The customer's orders referencing `voucher_id` that were not cancelled.
  async fn count_voucher_usage(&self, customer_id: UserId, voucher_id: VoucherId) -> StoreResult<i64>;

  /// COMPLETED orders that have no warranty row, oldest completion first.
  async fn completed_without_warranty(&self, limit: usize) -> StoreResult<Vec<Order>>;
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
  async fn find_voucher_by_code(&self, code: &str) -> StoreResult<Option<Voucher>>;

  async fn find_professional(&self, professional_id: ProfessionalId) -> StoreResult<Option<Professional>>;
}

#[async_trait]
pub trait WarrantyStore: Send + Sync {
  /// Fails with `StoreError::Conflict` when the order already has a warranty.
  async fn insert_warranty(&self, warranty: NewWarranty) -> StoreResult<Warranty>;

  async fn find_warranty(&self, warranty_id: WarrantyId) -> StoreResult<Option<Warranty>>;

  async fn find_warranty_by_order(&self, order_id: OrderId) -> StoreResult<Option<Warranty>>;

  /// ACTIVE -> CLAIMED with the claim payload, atomically. Fails with
  /// `PreconditionFailed` when the warranty is not ACTIVE.
  async fn claim_warranty(&self, warranty_id: WarrantyId, claim: WarrantyClaim) -> StoreResult<Warranty>;
}

#[async_trait]
pub trait ReviewStore: Send + Sync {
  /// Fails with `StoreError::Conflict` when the order already has a review.
  async fn insert_review(&self, review: NewReview) -> StoreResult<Review>;

  async fn find_review_by_order(&self, order_id: OrderId) -> StoreResult<Option<Review>>;
}

/// Everything the engine needs from persistence.
pub trait Store: OrderStore + CatalogStore + WarrantyStore + ReviewStore {}

impl<T> Store for T where T: OrderStore + CatalogStore + WarrantyStore + ReviewStore {}
