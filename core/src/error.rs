// tukangin/src/error.rs

//! Error types for the order engine.
//!
//! `OrderError` is what every service entry point returns. `StoreError` is the
//! narrower contract of the store traits, and `FlowError` covers misconfigured
//! step flows.

use crate::model::{OrderId, OrderStatus, WarrantyId};
use anyhow::Error as AnyhowError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum FlowError {
  #[error("Handler missing for required step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("Flow '{flow}' stopped before producing its result at step '{step_name}'")]
  Incomplete { flow: &'static str, step_name: &'static str },
}

/// Failures reported by the store traits.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("{entity} {id} not found")]
  NotFound { entity: &'static str, id: Uuid },

  /// The conditional write was rejected; the row is unchanged.
  #[error("Precondition failed for {entity} {id}")]
  PreconditionFailed { entity: &'static str, id: Uuid },

  /// A uniqueness constraint rejected the insert.
  #[error("Unique constraint violated: {0}")]
  Conflict(String),

  #[error("Store backend failure. Source: {source}")]
  Backend {
    #[source]
    source: AnyhowError,
  },
}

impl From<AnyhowError> for StoreError {
  fn from(err: AnyhowError) -> Self {
    StoreError::Backend { source: err }
  }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Coarse classification used at the boundary to choose a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Authentication,
  /// The resource exists but belongs to someone else. Reported as not found.
  Authorization,
  Validation,
  StateConflict,
  NotFound,
  Persistence,
}

#[derive(Debug, Error)]
pub enum OrderError {
  #[error("Authentication required")]
  Unauthenticated,

  #[error("Administrator credentials required")]
  AdminRequired,

  #[error("{entity} not found: {id}")]
  NotFound { entity: &'static str, id: String },

  /// Same message as `NotFound` so callers cannot learn whether it exists.
  #[error("{entity} not found: {id}")]
  NotOwned { entity: &'static str, id: String },

  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Price mismatch: expected discount {expected_discount} and total {expected_total}")]
  PriceMismatch { expected_discount: i64, expected_total: i64 },

  #[error("Voucher not found: {0}")]
  VoucherNotFound(String),

  #[error("Voucher is inactive or expired: {0}")]
  VoucherInactive(String),

  #[error("Voucher usage limit reached: {0}")]
  VoucherUsageExceeded(String),

  #[error("Invalid DP Amount: expected {expected}, received {received}")]
  InvalidDepositAmount { expected: i64, received: i64 },

  #[error("Order {order_id} is already paid or no longer pending")]
  AlreadyPaidOrInvalidState { order_id: OrderId },

  #[error("Invalid transition from {from} to {to}")]
  InvalidTransition { from: OrderStatus, to: OrderStatus },

  #[error("Order {order_id} changed concurrently; precondition failed")]
  PreconditionFailed { order_id: OrderId },

  #[error("Deposit must be paid before assigning a professional to order {order_id}")]
  DepositRequired { order_id: OrderId },

  #[error("A warranty already exists for order {order_id}")]
  WarrantyAlreadyExists { order_id: OrderId },

  #[error("Warranty {warranty_id} has expired")]
  WarrantyExpired { warranty_id: WarrantyId },

  #[error("Warranty {warranty_id} has already been claimed")]
  AlreadyClaimed { warranty_id: WarrantyId },

  #[error("Rating must be between 1 and 5, got {0}")]
  InvalidRating(i32),

  #[error("Order {order_id} cannot be reviewed while {status}")]
  ReviewNotAllowed { order_id: OrderId, status: OrderStatus },

  #[error("Order {order_id} has already been reviewed")]
  ReviewAlreadyExists { order_id: OrderId },

  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Persistence failure. Source: {source}")]
  Persistence {
    #[source]
    source: AnyhowError,
  },

  #[error("Flow error: {0}")]
  Flow(#[from] FlowError),
}

impl OrderError {
  pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
    OrderError::NotFound {
      entity,
      id: id.to_string(),
    }
  }

  pub fn not_owned(entity: &'static str, id: impl ToString) -> Self {
    OrderError::NotOwned {
      entity,
      id: id.to_string(),
    }
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      OrderError::Unauthenticated | OrderError::AdminRequired => ErrorKind::Authentication,
      OrderError::NotOwned { .. } => ErrorKind::Authorization,
      OrderError::NotFound { .. } => ErrorKind::NotFound,
      OrderError::Validation(_)
      | OrderError::PriceMismatch { .. }
      | OrderError::VoucherNotFound(_)
      | OrderError::VoucherInactive(_)
      | OrderError::VoucherUsageExceeded(_)
      | OrderError::InvalidDepositAmount { .. }
      | OrderError::InvalidRating(_) => ErrorKind::Validation,
      OrderError::AlreadyPaidOrInvalidState { .. }
      | OrderError::InvalidTransition { .. }
      | OrderError::PreconditionFailed { .. }
      | OrderError::DepositRequired { .. }
      | OrderError::WarrantyAlreadyExists { .. }
      | OrderError::WarrantyExpired { .. }
      | OrderError::AlreadyClaimed { .. }
      | OrderError::ReviewNotAllowed { .. }
      | OrderError::ReviewAlreadyExists { .. }
      | OrderError::Conflict(_) => ErrorKind::StateConflict,
      OrderError::Persistence { .. } | OrderError::Flow(_) => ErrorKind::Persistence,
    }
  }

  /// Stable machine-readable code for response bodies.
  pub fn reason(&self) -> &'static str {
    match self {
      OrderError::Unauthenticated => "unauthenticated",
      OrderError::AdminRequired => "admin_required",
      OrderError::NotFound { .. } | OrderError::NotOwned { .. } => "not_found",
      OrderError::Validation(_) => "validation",
      OrderError::PriceMismatch { .. } => "price_mismatch",
      OrderError::VoucherNotFound(_) => "voucher_not_found",
      OrderError::VoucherInactive(_) => "voucher_inactive",
      OrderError::VoucherUsageExceeded(_) => "voucher_usage_exceeded",
      OrderError::InvalidDepositAmount { .. } => "invalid_deposit_amount",
      OrderError::AlreadyPaidOrInvalidState { .. } => "already_paid_or_invalid_state",
      OrderError::InvalidTransition { .. } => "invalid_transition",
      OrderError::PreconditionFailed { .. } => "precondition_failed",
      OrderError::DepositRequired { .. } => "deposit_required",
      OrderError::WarrantyAlreadyExists { .. } => "warranty_already_exists",
      OrderError::WarrantyExpired { .. } => "warranty_expired",
      OrderError::AlreadyClaimed { .. } => "already_claimed",
      OrderError::InvalidRating(_) => "invalid_rating",
      OrderError::ReviewNotAllowed { .. } => "review_not_allowed",
      OrderError::ReviewAlreadyExists { .. } => "review_already_exists",
      OrderError::Conflict(_) => "conflict",
      OrderError::Persistence { .. } => "persistence",
      OrderError::Flow(_) => "internal",
    }
  }
}

impl From<StoreError> for OrderError {
  fn from(err: StoreError) -> Self {
    match err {
      StoreError::NotFound { entity, id } => OrderError::not_found(entity, id),
      StoreError::PreconditionFailed { id, .. } => OrderError::PreconditionFailed { order_id: id },
      StoreError::Conflict(message) => OrderError::Conflict(message),
      StoreError::Backend { source } => OrderError::Persistence { source },
    }
  }
}

pub type OrderResult<T, E = OrderError> = std::result::Result<T, E>;
