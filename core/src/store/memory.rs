// tukangin/src/store/memory.rs

//! In-memory store. Every operation runs under one mutex, which gives the
//! same all-or-nothing behaviour the relational store gets from single-row
//! conditional writes and unique indexes.

use super::{CatalogStore, OrderPatch, OrderStore, Precondition, ReviewStore, WarrantyStore};
use crate::error::{StoreError, StoreResult};
use crate::model::{
  NewOrder, NewReview, NewWarranty, Order, OrderId, OrderStatus, Professional, ProfessionalId, Review, ReviewId,
  UserId, Voucher, VoucherId, Warranty, WarrantyClaim, WarrantyId, WarrantyStatus,
};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Tables {
  orders: HashMap<OrderId, Order>,
  vouchers: HashMap<VoucherId, Voucher>,
  professionals: HashMap<ProfessionalId, Professional>,
  warranties: HashMap<WarrantyId, Warranty>,
  reviews: HashMap<ReviewId, Review>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
  tables: Mutex<Tables>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds or replaces a voucher.
  pub fn put_voucher(&self, voucher: Voucher) {
    self.tables.lock().vouchers.insert(voucher.id, voucher);
  }

  /// Adds or replaces a professional.
  pub fn put_professional(&self, professional: Professional) {
    self.tables.lock().professionals.insert(professional.id, professional);
  }

  pub fn order_count(&self) -> usize {
    self.tables.lock().orders.len()
  }

  pub fn warranties_for_order(&self, order_id: OrderId) -> Vec<Warranty> {
    self
      .tables
      .lock()
      .warranties
      .values()
      .filter(|w| w.order_id == order_id)
      .cloned()
      .collect()
  }
}

#[async_trait]
impl OrderStore for MemoryStore {
  async fn create_order(&self, order: NewOrder) -> StoreResult<Order> {
    let now = Utc::now();
    let row = Order {
      id: Uuid::new_v4(),
      customer_id: order.customer_id,
      professional_id: None,
      voucher_id: order.voucher_id,
      service_name: order.service_name,
      category: order.category,
      description: order.description,
      address: order.address,
      subtotal: order.subtotal,
      discount: order.discount,
      total: order.total,
      status: OrderStatus::Pending,
      deposit_amount: None,
      payment_method: None,
      created_at: now,
      paid_at: None,
      completed_at: None,
      cancelled_at: None,
      updated_at: now,
    };
    let mut tables = self.tables.lock();
    if let (Some(voucher_id), Some(limit)) = (order.voucher_id, order.voucher_usage_limit) {
      let used = tables
        .orders
        .values()
        .filter(|o| {
          o.customer_id == order.customer_id && o.voucher_id == Some(voucher_id) && o.status != OrderStatus::Cancelled
        })
        .count() as i64;
      if used >= limit {
        return Err(StoreError::PreconditionFailed {
          entity: "voucher",
          id: voucher_id,
        });
      }
    }
    tables.orders.insert(row.id, row.clone());
    Ok(row)
  }

  async fn find_order(&self, order_id: OrderId) -> StoreResult<Option<Order>> {
    Ok(self.tables.lock().orders.get(&order_id).cloned())
  }

  async fn update_order(
    &self,
    order_id: OrderId,
    patch: OrderPatch,
    precondition: Option<Precondition>,
  ) -> StoreResult<Order> {
    let mut tables = self.tables.lock();
    let order = tables.orders.get_mut(&order_id).ok_or(StoreError::NotFound {
      entity: "order",
      id: order_id,
    })?;
    if let Some(precondition) = precondition {
      if !precondition.holds(order) {
        return Err(StoreError::PreconditionFailed {
          entity: "order",
          id: order_id,
        });
      }
    }
    patch.apply(order, Utc::now());
    Ok(order.clone())
  }

  async fn count_voucher_usage(&self, customer_id: UserId, voucher_id: VoucherId) -> StoreResult<i64> {
    let tables = self.tables.lock();
    let count = tables
      .orders
      .values()
      .filter(|o| {
        o.customer_id == customer_id && o.voucher_id == Some(voucher_id) && o.status != OrderStatus::Cancelled
      })
      .count();
    Ok(count as i64)
  }

  async fn completed_without_warranty(&self, limit: usize) -> StoreResult<Vec<Order>> {
    let tables = self.tables.lock();
    let mut orphans: Vec<Order> = tables
      .orders
      .values()
      .filter(|o| o.status == OrderStatus::Completed)
      .filter(|o| !tables.warranties.values().any(|w| w.order_id == o.id))
      .cloned()
      .collect();
    orphans.sort_by_key(|o| o.completed_at);
    orphans.truncate(limit);
    Ok(orphans)
  }
}

#[async_trait]
impl CatalogStore for MemoryStore {
  async fn find_voucher_by_code(&self, code: &str) -> StoreResult<Option<Voucher>> {
    Ok(self.tables.lock().vouchers.values().find(|v| v.code == code).cloned())
  }

  async fn find_professional(&self, professional_id: ProfessionalId) -> StoreResult<Option<Professional>> {
    Ok(self.tables.lock().professionals.get(&professional_id).cloned())
  }
}

#[async_trait]
impl WarrantyStore for MemoryStore {
  async fn insert_warranty(&self, warranty: NewWarranty) -> StoreResult<Warranty> {
    let mut tables = self.tables.lock();
    if tables.warranties.values().any(|w| w.order_id == warranty.order_id) {
      return Err(StoreError::Conflict(format!(
        "warranty for order {} already exists",
        warranty.order_id
      )));
    }
    let row = Warranty {
      id: Uuid::new_v4(),
      order_id: warranty.order_id,
      user_id: warranty.user_id,
      professional_id: warranty.professional_id,
      status: WarrantyStatus::Active,
      coverage_type: warranty.coverage_type,
      terms: warranty.terms,
      created_at: warranty.created_at,
      valid_until: warranty.valid_until,
      claim: None,
    };
    tables.warranties.insert(row.id, row.clone());
    Ok(row)
  }

  async fn find_warranty(&self, warranty_id: WarrantyId) -> StoreResult<Option<Warranty>> {
    Ok(self.tables.lock().warranties.get(&warranty_id).cloned())
  }

  async fn find_warranty_by_order(&self, order_id: OrderId) -> StoreResult<Option<Warranty>> {
    Ok(
      self
        .tables
        .lock()
        .warranties
        .values()
        .find(|w| w.order_id == order_id)
        .cloned(),
    )
  }

  async fn claim_warranty(&self, warranty_id: WarrantyId, claim: WarrantyClaim) -> StoreResult<Warranty> {
    let mut tables = self.tables.lock();
    let warranty = tables.warranties.get_mut(&warranty_id).ok_or(StoreError::NotFound {
      entity: "warranty",
      id: warranty_id,
    })?;
    if warranty.status != WarrantyStatus::Active {
      return Err(StoreError::PreconditionFailed {
        entity: "warranty",
        id: warranty_id,
      });
    }
    warranty.status = WarrantyStatus::Claimed;
    warranty.claim = Some(claim);
    Ok(warranty.clone())
  }
}

#[async_trait]
impl ReviewStore for MemoryStore {
  async fn insert_review(&self, review: NewReview) -> StoreResult<Review> {
    let mut tables = self.tables.lock();
    if tables.reviews.values().any(|r| r.order_id == review.order_id) {
      return Err(StoreError::Conflict(format!(
        "review for order {} already exists",
        review.order_id
      )));
    }
    let row = Review {
      id: Uuid::new_v4(),
      order_id: review.order_id,
      user_id: review.user_id,
      professional_id: review.professional_id,
      rating: review.rating,
      comment: review.comment,
      tags: review.tags,
      created_at: Utc::now(),
    };
    tables.reviews.insert(row.id, row.clone());
    Ok(row)
  }

  async fn find_review_by_order(&self, order_id: OrderId) -> StoreResult<Option<Review>> {
    Ok(self.tables.lock().reviews.values().find(|r| r.order_id == order_id).cloned())
  }
}
