// tukangin/src/services/warranty.rs

//! Warranty issuance, lookup, claims and reconciliation.
//!
//! A warranty is derived from a COMPLETED order. The store holds at most one
//! per order; issuing twice yields `WarrantyAlreadyExists`. Completions whose
//! warranty could not be issued are repaired by `reconcile`.

use super::{load_owned_order, require_text};
use crate::config::LifecycleConfig;
use crate::error::{OrderError, OrderResult, StoreError};
use crate::identity::RequestContext;
use crate::model::{
  ClaimStatus, NewWarranty, Order, OrderId, OrderStatus, Professional, Warranty, WarrantyClaim, WarrantyId,
  WarrantyStatus,
};
use crate::store::{CatalogStore, OrderStore, Store, WarrantyStore};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WarrantyView {
  pub warranty: Warranty,
  pub professional: Option<Professional>,
  pub remaining_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRequest {
  pub issue_description: String,
  #[serde(default)]
  pub evidence_photos: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimReceipt {
  pub warranty_id: WarrantyId,
  pub status: ClaimStatus,
  pub warranty_status: WarrantyStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
  pub scanned: usize,
  pub issued: Vec<OrderId>,
  pub already_present: Vec<OrderId>,
  pub failed: Vec<OrderId>,
}

#[derive(Debug, Clone, Default)]
pub struct WarrantyIssuer {
  config: LifecycleConfig,
}

impl WarrantyIssuer {
  pub fn new(config: LifecycleConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &LifecycleConfig {
    &self.config
  }

  /// Creates the ACTIVE warranty for a COMPLETED order.
  #[instrument(name = "WarrantyIssuer::issue", skip_all, fields(order_id = %order.id), err(Display))]
  pub async fn issue(&self, store: &dyn Store, order: &Order) -> OrderResult<Warranty> {
    if order.status != OrderStatus::Completed {
      return Err(OrderError::Conflict(format!(
        "Warranties are issued only for completed orders; order {} is {}.",
        order.id, order.status
      )));
    }
    self.config.validate()?;
    let created_at = order.completed_at.unwrap_or_else(Utc::now);
    let new_warranty = NewWarranty {
      order_id: order.id,
      user_id: order.customer_id,
      professional_id: order.professional_id,
      coverage_type: self.config.coverage_type.clone(),
      terms: self.config.warranty_terms.clone(),
      created_at,
      valid_until: created_at + self.config.warranty_window(),
    };
    let warranty = store.insert_warranty(new_warranty).await.map_err(|e| match e {
      StoreError::Conflict(_) => OrderError::WarrantyAlreadyExists { order_id: order.id },
      other => other.into(),
    })?;
    info!(
      "Warranty (Order {}): Issued {} valid until {}.",
      order.id, warranty.id, warranty.valid_until
    );
    Ok(warranty)
  }

  /// The caller's warranty for `order_id`, with its professional and the days left.
  #[instrument(name = "WarrantyIssuer::lookup", skip(self, store, ctx), err(Display))]
  pub async fn lookup(&self, store: &dyn Store, ctx: &RequestContext, order_id: OrderId) -> OrderResult<WarrantyView> {
    let user_id = ctx.require_user()?;
    load_owned_order(store, order_id, user_id).await?;
    let warranty = store
      .find_warranty_by_order(order_id)
      .await?
      .ok_or_else(|| OrderError::not_found("warranty", order_id))?;
    let professional = match warranty.professional_id {
      Some(professional_id) => store.find_professional(professional_id).await?,
      None => None,
    };
    let remaining_days = warranty.remaining_days(Utc::now());
    Ok(WarrantyView {
      warranty,
      professional,
      remaining_days,
    })
  }

  /// Files a claim. ACTIVE to CLAIMED happens once; the store enforces it.
  #[instrument(name = "WarrantyIssuer::claim", skip(self, store, ctx, request), err(Display))]
  pub async fn claim(
    &self,
    store: &dyn Store,
    ctx: &RequestContext,
    warranty_id: WarrantyId,
    request: ClaimRequest,
  ) -> OrderResult<ClaimReceipt> {
    let user_id = ctx.require_user()?;
    let issue_description = require_text("issueDescription", &request.issue_description)?;

    let warranty = store
      .find_warranty(warranty_id)
      .await?
      .ok_or_else(|| OrderError::not_found("warranty", warranty_id))?;
    if warranty.user_id != user_id {
      return Err(OrderError::not_owned("warranty", warranty_id));
    }
    if warranty.status != WarrantyStatus::Active {
      return Err(OrderError::AlreadyClaimed { warranty_id });
    }
    let now = Utc::now();
    if warranty.is_expired(now) {
      return Err(OrderError::WarrantyExpired { warranty_id });
    }

    let claim = WarrantyClaim {
      issue_description,
      evidence_photos: request
        .evidence_photos
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect(),
      claimed_at: now,
    };
    let claimed = store.claim_warranty(warranty_id, claim).await.map_err(|e| match e {
      StoreError::PreconditionFailed { .. } => OrderError::AlreadyClaimed { warranty_id },
      other => other.into(),
    })?;

    info!("Warranty {}: Claim submitted for order {}.", claimed.id, claimed.order_id);
    Ok(ClaimReceipt {
      warranty_id: claimed.id,
      status: ClaimStatus::Submitted,
      warranty_status: claimed.status,
    })
  }

  /// Issues the missing warranty for up to `limit` completed orders.
  #[instrument(name = "WarrantyIssuer::reconcile", skip(self, store), err(Display))]
  pub async fn reconcile(&self, store: &dyn Store, limit: usize) -> OrderResult<ReconcileReport> {
    let orphans = store.completed_without_warranty(limit).await?;
    let mut report = ReconcileReport {
      scanned: orphans.len(),
      ..ReconcileReport::default()
    };
    for order in &orphans {
      match self.issue(store, order).await {
        Ok(_) => report.issued.push(order.id),
        Err(OrderError::WarrantyAlreadyExists { order_id }) => report.already_present.push(order_id),
        Err(e) => {
          warn!(order_id = %order.id, error = %e, "Reconciliation could not issue warranty.");
          report.failed.push(order.id);
        }
      }
    }
    if !orphans.is_empty() {
      info!(
        scanned = report.scanned,
        issued = report.issued.len(),
        failed = report.failed.len(),
        "Warranty reconciliation pass finished."
      );
    }
    Ok(report)
  }
}
