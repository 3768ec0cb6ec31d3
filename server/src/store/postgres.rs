// tukangin_server/src/store/postgres.rs

//! PostgreSQL implementation of the engine's store traits.
//!
//! Conditional order updates are one `UPDATE .. WHERE .. RETURNING`
//! statement; warranty and review uniqueness rely on the unique `order_id`
//! columns with `ON CONFLICT DO NOTHING`. Voucher-limited inserts take a
//! transaction-scoped advisory lock per (customer, voucher) before counting.

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::str::FromStr;
use tukangin::model::{
  DiscountRule, NewOrder, NewReview, NewWarranty, Order, OrderId, OrderStatus, PaymentMethod, Professional,
  ProfessionalId, Review, UserId, Voucher, VoucherId, Warranty, WarrantyClaim, WarrantyId, WarrantyStatus,
};
use tukangin::store::{CatalogStore, OrderPatch, OrderStore, Precondition, ReviewStore, WarrantyStore};
use tukangin::{StoreError, StoreResult};
use uuid::Uuid;

const ORDER_COLUMNS: &str = "id, customer_id, professional_id, voucher_id, service_name, category, description, \
                             address, subtotal, discount, total, status, deposit_amount, payment_method, created_at, \
                             paid_at, completed_at, cancelled_at, updated_at";

const WARRANTY_COLUMNS: &str = "id, order_id, user_id, professional_id, status, coverage_type, terms, created_at, \
                                valid_until, issue_description, evidence_photos, claimed_at";

const REVIEW_COLUMNS: &str = "id, order_id, user_id, professional_id, rating, comment, tags, created_at";

fn backend(err: sqlx::Error) -> StoreError {
  StoreError::Backend { source: err.into() }
}

fn parse_column<T>(column: &str, raw: &str) -> StoreResult<T>
where
  T: FromStr<Err = String>,
{
  T::from_str(raw).map_err(|e| StoreError::Backend {
    source: anyhow!("Unreadable {} column: {}", column, e),
  })
}

#[derive(Debug, FromRow)]
struct OrderRow {
  id: Uuid,
  customer_id: Uuid,
  professional_id: Option<Uuid>,
  voucher_id: Option<Uuid>,
  service_name: String,
  category: String,
  description: String,
  address: String,
  subtotal: i64,
  discount: i64,
  total: i64,
  status: String,
  deposit_amount: Option<i64>,
  payment_method: Option<String>,
  created_at: DateTime<Utc>,
  paid_at: Option<DateTime<Utc>>,
  completed_at: Option<DateTime<Utc>>,
  cancelled_at: Option<DateTime<Utc>>,
  updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
  type Error = StoreError;

  fn try_from(row: OrderRow) -> StoreResult<Self> {
    Ok(Order {
      id: row.id,
      customer_id: row.customer_id,
      professional_id: row.professional_id,
      voucher_id: row.voucher_id,
      service_name: row.service_name,
      category: row.category,
      description: row.description,
      address: row.address,
      subtotal: row.subtotal,
      discount: row.discount,
      total: row.total,
      status: parse_column::<OrderStatus>("orders.status", &row.status)?,
      deposit_amount: row.deposit_amount,
      payment_method: row
        .payment_method
        .as_deref()
        .map(|m| parse_column::<PaymentMethod>("orders.payment_method", m))
        .transpose()?,
      created_at: row.created_at,
      paid_at: row.paid_at,
      completed_at: row.completed_at,
      cancelled_at: row.cancelled_at,
      updated_at: row.updated_at,
    })
  }
}

#[derive(Debug, FromRow)]
struct VoucherRow {
  id: Uuid,
  code: String,
  is_active: bool,
  expiry_date: Option<DateTime<Utc>>,
  usage_limit: Option<i64>,
  discount_type: String,
  discount_value: i64,
  max_discount: Option<i64>,
}

impl TryFrom<VoucherRow> for Voucher {
  type Error = StoreError;

  fn try_from(row: VoucherRow) -> StoreResult<Self> {
    let rule = match row.discount_type.as_str() {
      "percentage" => DiscountRule::Percentage(row.discount_value),
      "flat" => DiscountRule::Flat(row.discount_value),
      other => {
        return Err(StoreError::Backend {
          source: anyhow!("Unknown voucher discount_type '{}'", other),
        })
      }
    };
    Ok(Voucher {
      id: row.id,
      code: row.code,
      is_active: row.is_active,
      expiry_date: row.expiry_date,
      usage_limit: row.usage_limit,
      rule,
      max_discount: row.max_discount,
    })
  }
}

#[derive(Debug, FromRow)]
struct ProfessionalRow {
  id: Uuid,
  name: String,
  phone: Option<String>,
  specialty: Option<String>,
}

impl From<ProfessionalRow> for Professional {
  fn from(row: ProfessionalRow) -> Self {
    Professional {
      id: row.id,
      name: row.name,
      phone: row.phone,
      specialty: row.specialty,
    }
  }
}

#[derive(Debug, FromRow)]
struct WarrantyRow {
  id: Uuid,
  order_id: Uuid,
  user_id: Uuid,
  professional_id: Option<Uuid>,
  status: String,
  coverage_type: String,
  terms: String,
  created_at: DateTime<Utc>,
  valid_until: DateTime<Utc>,
  issue_description: Option<String>,
  evidence_photos: Option<Vec<String>>,
  claimed_at: Option<DateTime<Utc>>,
}

impl TryFrom<WarrantyRow> for Warranty {
  type Error = StoreError;

  fn try_from(row: WarrantyRow) -> StoreResult<Self> {
    let claim = match (row.issue_description, row.claimed_at) {
      (Some(issue_description), Some(claimed_at)) => Some(WarrantyClaim {
        issue_description,
        evidence_photos: row.evidence_photos.unwrap_or_default(),
        claimed_at,
      }),
      _ => None,
    };
    Ok(Warranty {
      id: row.id,
      order_id: row.order_id,
      user_id: row.user_id,
      professional_id: row.professional_id,
      status: parse_column::<WarrantyStatus>("warranties.status", &row.status)?,
      coverage_type: row.coverage_type,
      terms: row.terms,
      created_at: row.created_at,
      valid_until: row.valid_until,
      claim,
    })
  }
}

#[derive(Debug, FromRow)]
struct ReviewRow {
  id: Uuid,
  order_id: Uuid,
  user_id: Uuid,
  professional_id: Option<Uuid>,
  rating: i32,
  comment: String,
  tags: Vec<String>,
  created_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
  fn from(row: ReviewRow) -> Self {
    Review {
      id: row.id,
      order_id: row.order_id,
      user_id: row.user_id,
      professional_id: row.professional_id,
      rating: row.rating,
      comment: row.comment,
      tags: row.tags,
      created_at: row.created_at,
    }
  }
}

#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub fn pool(&self) -> &PgPool {
    &self.pool
  }

  async fn exists(&self, table: &str, id: Uuid) -> StoreResult<bool> {
    let sql = format!("SELECT EXISTS (SELECT 1 FROM {} WHERE id = $1)", table);
    sqlx::query_scalar(&sql)
      .bind(id)
      .fetch_one(&self.pool)
      .await
      .map_err(backend)
  }
}

#[async_trait]
impl OrderStore for PgStore {
  async fn create_order(&self, order: NewOrder) -> StoreResult<Order> {
    let mut tx = self.pool.begin().await.map_err(backend)?;

    if let (Some(voucher_id), Some(limit)) = (order.voucher_id, order.voucher_usage_limit) {
      // Serializes voucher inserts per (customer, voucher) until commit.
      sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text || ':' || $2::text, 0))")
        .bind(order.customer_id)
        .bind(voucher_id)
        .execute(&mut *tx)
        .await
        .map_err(backend)?;
      let used: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM orders WHERE customer_id = $1 AND voucher_id = $2 AND status <> 'CANCELLED'",
      )
      .bind(order.customer_id)
      .bind(voucher_id)
      .fetch_one(&mut *tx)
      .await
      .map_err(backend)?;
      if used >= limit {
        return Err(StoreError::PreconditionFailed {
          entity: "voucher",
          id: voucher_id,
        });
      }
    }

    let sql = format!(
      "INSERT INTO orders (id, customer_id, voucher_id, service_name, category, description, address, \
       subtotal, discount, total, status) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'PENDING') RETURNING {}",
      ORDER_COLUMNS
    );
    let row: OrderRow = sqlx::query_as(&sql)
      .bind(Uuid::new_v4())
      .bind(order.customer_id)
      .bind(order.voucher_id)
      .bind(&order.service_name)
      .bind(&order.category)
      .bind(&order.description)
      .bind(&order.address)
      .bind(order.subtotal)
      .bind(order.discount)
      .bind(order.total)
      .fetch_one(&mut *tx)
      .await
      .map_err(backend)?;
    tx.commit().await.map_err(backend)?;
    row.try_into()
  }

  async fn find_order(&self, order_id: OrderId) -> StoreResult<Option<Order>> {
    let sql = format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS);
    let row: Option<OrderRow> = sqlx::query_as(&sql)
      .bind(order_id)
      .fetch_optional(&self.pool)
      .await
      .map_err(backend)?;
    row.map(Order::try_from).transpose()
  }

  async fn update_order(
    &self,
    order_id: OrderId,
    patch: OrderPatch,
    precondition: Option<Precondition>,
  ) -> StoreResult<Order> {
    let guarded = precondition.is_some();
    let precondition = precondition.unwrap_or_default();
    let allowed: Vec<String> = precondition.status_in.iter().map(|s| s.as_str().to_string()).collect();

    let sql = format!(
      "UPDATE orders SET \
         status = COALESCE($2, status), \
         professional_id = COALESCE($3, professional_id), \
         paid_at = COALESCE($4, paid_at), \
         deposit_amount = COALESCE($5, deposit_amount), \
         payment_method = COALESCE($6, payment_method), \
         completed_at = COALESCE($7, completed_at), \
         cancelled_at = COALESCE($8, cancelled_at), \
         updated_at = now() \
       WHERE id = $1 \
         AND (cardinality($9::text[]) = 0 OR status = ANY($9)) \
         AND (NOT $10 OR professional_id IS NULL) \
         AND (NOT $11 OR paid_at IS NOT NULL) \
       RETURNING {}",
      ORDER_COLUMNS
    );
    let row: Option<OrderRow> = sqlx::query_as(&sql)
      .bind(order_id)
      .bind(patch.status.map(|s| s.as_str()))
      .bind(patch.professional_id)
      .bind(patch.paid_at)
      .bind(patch.deposit_amount)
      .bind(patch.payment_method.map(|m| m.as_str()))
      .bind(patch.completed_at)
      .bind(patch.cancelled_at)
      .bind(&allowed)
      .bind(precondition.require_unassigned)
      .bind(precondition.require_paid)
      .fetch_optional(&self.pool)
      .await
      .map_err(backend)?;

    match row {
      Some(row) => row.try_into(),
      None if guarded && self.exists("orders", order_id).await? => Err(StoreError::PreconditionFailed {
        entity: "order",
        id: order_id,
      }),
      None => Err(StoreError::NotFound {
        entity: "order",
        id: order_id,
      }),
    }
  }

  async fn count_voucher_usage(&self, customer_id: UserId, voucher_id: VoucherId) -> StoreResult<i64> {
    sqlx::query_scalar(
      "SELECT COUNT(*) FROM orders WHERE customer_id = $1 AND voucher_id = $2 AND status <> 'CANCELLED'",
    )
    .bind(customer_id)
    .bind(voucher_id)
    .fetch_one(&self.pool)
    .await
    .map_err(backend)
  }

  async fn completed_without_warranty(&self, limit: usize) -> StoreResult<Vec<Order>> {
    let columns: Vec<String> = ORDER_COLUMNS.split(", ").map(|c| format!("o.{}", c.trim())).collect();
    let sql = format!(
      "SELECT {} FROM orders o LEFT JOIN warranties w ON w.order_id = o.id \
       WHERE o.status = 'COMPLETED' AND w.id IS NULL \
       ORDER BY o.completed_at ASC NULLS FIRST LIMIT $1",
      columns.join(", ")
    );
    let rows: Vec<OrderRow> = sqlx::query_as(&sql)
      .bind(i64::try_from(limit).unwrap_or(i64::MAX))
      .fetch_all(&self.pool)
      .await
      .map_err(backend)?;
    rows.into_iter().map(Order::try_from).collect()
  }
}

#[async_trait]
impl CatalogStore for PgStore {
  async fn find_voucher_by_code(&self, code: &str) -> StoreResult<Option<Voucher>> {
    let row: Option<VoucherRow> = sqlx::query_as(
      "SELECT id, code, is_active, expiry_date, usage_limit, discount_type, discount_value, max_discount \
       FROM vouchers WHERE code = $1",
    )
    .bind(code)
    .fetch_optional(&self.pool)
    .await
    .map_err(backend)?;
    row.map(Voucher::try_from).transpose()
  }

  async fn find_professional(&self, professional_id: ProfessionalId) -> StoreResult<Option<Professional>> {
    let row: Option<ProfessionalRow> =
      sqlx::query_as("SELECT id, name, phone, specialty FROM professionals WHERE id = $1")
        .bind(professional_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
    Ok(row.map(Professional::from))
  }
}

#[async_trait]
impl WarrantyStore for PgStore {
  async fn insert_warranty(&self, warranty: NewWarranty) -> StoreResult<Warranty> {
    let sql = format!(
      "INSERT INTO warranties (id, order_id, user_id, professional_id, status, coverage_type, terms, \
       created_at, valid_until) \
       VALUES ($1, $2, $3, $4, 'ACTIVE', $5, $6, $7, $8) \
       ON CONFLICT (order_id) DO NOTHING RETURNING {}",
      WARRANTY_COLUMNS
    );
    let row: Option<WarrantyRow> = sqlx::query_as(&sql)
      .bind(Uuid::new_v4())
      .bind(warranty.order_id)
      .bind(warranty.user_id)
      .bind(warranty.professional_id)
      .bind(&warranty.coverage_type)
      .bind(&warranty.terms)
      .bind(warranty.created_at)
      .bind(warranty.valid_until)
      .fetch_optional(&self.pool)
      .await
      .map_err(backend)?;
    match row {
      Some(row) => row.try_into(),
      None => Err(StoreError::Conflict(format!(
        "warranty for order {} already exists",
        warranty.order_id
      ))),
    }
  }

  async fn find_warranty(&self, warranty_id: WarrantyId) -> StoreResult<Option<Warranty>> {
    let sql = format!("SELECT {} FROM warranties WHERE id = $1", WARRANTY_COLUMNS);
    let row: Option<WarrantyRow> = sqlx::query_as(&sql)
      .bind(warranty_id)
      .fetch_optional(&self.pool)
      .await
      .map_err(backend)?;
    row.map(Warranty::try_from).transpose()
  }

  async fn find_warranty_by_order(&self, order_id: OrderId) -> StoreResult<Option<Warranty>> {
    let sql = format!("SELECT {} FROM warranties WHERE order_id = $1", WARRANTY_COLUMNS);
    let row: Option<WarrantyRow> = sqlx::query_as(&sql)
      .bind(order_id)
      .fetch_optional(&self.pool)
      .await
      .map_err(backend)?;
    row.map(Warranty::try_from).transpose()
  }

  async fn claim_warranty(&self, warranty_id: WarrantyId, claim: WarrantyClaim) -> StoreResult<Warranty> {
    let sql = format!(
      "UPDATE warranties SET status = 'CLAIMED', issue_description = $2, evidence_photos = $3, claimed_at = $4 \
       WHERE id = $1 AND status = 'ACTIVE' RETURNING {}",
      WARRANTY_COLUMNS
    );
    let row: Option<WarrantyRow> = sqlx::query_as(&sql)
      .bind(warranty_id)
      .bind(&claim.issue_description)
      .bind(&claim.evidence_photos)
      .bind(claim.claimed_at)
      .fetch_optional(&self.pool)
      .await
      .map_err(backend)?;
    match row {
      Some(row) => row.try_into(),
      None if self.exists("warranties", warranty_id).await? => Err(StoreError::PreconditionFailed {
        entity: "warranty",
        id: warranty_id,
      }),
      None => Err(StoreError::NotFound {
        entity: "warranty",
        id: warranty_id,
      }),
    }
  }
}

#[async_trait]
impl ReviewStore for PgStore {
  async fn insert_review(&self, review: NewReview) -> StoreResult<Review> {
    let sql = format!(
      "INSERT INTO reviews (id, order_id, user_id, professional_id, rating, comment, tags) \
       VALUES ($1, $2, $3, $4, $5, $6, $7) \
       ON CONFLICT (order_id) DO NOTHING RETURNING {}",
      REVIEW_COLUMNS
    );
    let row: Option<ReviewRow> = sqlx::query_as(&sql)
      .bind(Uuid::new_v4())
      .bind(review.order_id)
      .bind(review.user_id)
      .bind(review.professional_id)
      .bind(review.rating)
      .bind(&review.comment)
      .bind(&review.tags)
      .fetch_optional(&self.pool)
      .await
      .map_err(backend)?;
    row
      .map(Review::from)
      .ok_or_else(|| StoreError::Conflict(format!("review for order {} already exists", review.order_id)))
  }

  async fn find_review_by_order(&self, order_id: OrderId) -> StoreResult<Option<Review>> {
    let sql = format!("SELECT {} FROM reviews WHERE order_id = $1", REVIEW_COLUMNS);
    let row: Option<ReviewRow> = sqlx::query_as(&sql)
      .bind(order_id)
      .fetch_optional(&self.pool)
      .await
      .map_err(backend)?;
    Ok(row.map(Review::from))
  }
}
