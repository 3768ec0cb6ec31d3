// tukangin/src/services/ordering.rs

//! Order creation: validate the request, price it, persist a PENDING order.

use super::{incomplete, require_text};
use crate::error::{OrderError, OrderResult, StoreError};
use crate::flow::{Flow, FlowData, StepControl, StepMode};
use crate::identity::RequestContext;
use crate::model::{NewOrder, Order, UserId};
use crate::pricing::{self, Quote};
use crate::store::{OrderStore, Store};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};

const FLOW_NAME: &str = "create_order";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
  pub service_name: String,
  pub category: String,
  #[serde(default)]
  pub description: Option<String>,
  pub address: String,
  pub subtotal: i64,
  /// Client-side figures. When present they must match the server quote.
  #[serde(default)]
  pub discount: Option<i64>,
  #[serde(default)]
  pub total: Option<i64>,
  #[serde(default)]
  pub voucher_code: Option<String>,
}

/// Normalized fields produced by the validation step.
#[derive(Debug, Clone)]
struct ValidRequest {
  service_name: String,
  category: String,
  description: String,
  address: String,
}

pub struct CreateOrderData {
  store: Arc<dyn Store>,
  customer_id: UserId,
  request: CreateOrderRequest,
  valid: Option<ValidRequest>,
  quote: Option<Quote>,
  created: Option<Order>,
}

pub struct OrderCreation {
  flow: Flow<CreateOrderData, OrderError>,
}

impl OrderCreation {
  pub fn new() -> Self {
    let mut flow = Flow::new(
      FLOW_NAME,
      &[
        ("validate_request", StepMode::Required),
        ("quote_price", StepMode::Required),
        ("persist_order", StepMode::Required),
      ],
    );
    flow.on("validate_request", validate_request);
    flow.on("quote_price", quote_price);
    flow.on("persist_order", persist_order);
    Self { flow }
  }

  #[instrument(name = "OrderCreation::create", skip_all, err(Display))]
  pub async fn create(
    &self,
    store: Arc<dyn Store>,
    ctx: &RequestContext,
    request: CreateOrderRequest,
  ) -> OrderResult<Order> {
    let customer_id = ctx.require_user()?;
    let data = FlowData::new(CreateOrderData {
      store,
      customer_id,
      request,
      valid: None,
      quote: None,
      created: None,
    });
    self.flow.run(data.clone()).await?;
    let created = data.write().created.take();
    created.ok_or_else(|| incomplete(FLOW_NAME, "persist_order"))
  }
}

impl Default for OrderCreation {
  fn default() -> Self {
    Self::new()
  }
}

async fn validate_request(ctx: FlowData<CreateOrderData>) -> OrderResult<StepControl> {
  let request = ctx.read().request.clone();
  let valid = ValidRequest {
    service_name: require_text("serviceName", &request.service_name)?,
    category: require_text("category", &request.category)?,
    description: request.description.as_deref().unwrap_or_default().trim().to_string(),
    address: require_text("address", &request.address)?,
  };
  pricing::check_subtotal(request.subtotal)?;
  ctx.write().valid = Some(valid);
  Ok(StepControl::Continue)
}

async fn quote_price(ctx: FlowData<CreateOrderData>) -> OrderResult<StepControl> {
  let (store, customer_id, request) = {
    let guard = ctx.read();
    (guard.store.clone(), guard.customer_id, guard.request.clone())
  };

  let quote = pricing::quote(
    store.as_ref(),
    customer_id,
    request.subtotal,
    request.voucher_code.as_deref(),
    Utc::now(),
  )
  .await?;

  let discount_differs = request.discount.is_some_and(|d| d != quote.discount);
  let total_differs = request.total.is_some_and(|t| t != quote.total);
  if discount_differs || total_differs {
    return Err(OrderError::PriceMismatch {
      expected_discount: quote.discount,
      expected_total: quote.total,
    });
  }

  ctx.write().quote = Some(quote);
  Ok(StepControl::Continue)
}

async fn persist_order(ctx: FlowData<CreateOrderData>) -> OrderResult<StepControl> {
  let (store, new_order, voucher_code) = {
    let guard = ctx.read();
    let valid = guard.valid.clone().ok_or_else(|| incomplete(FLOW_NAME, "validate_request"))?;
    let quote = guard.quote.ok_or_else(|| incomplete(FLOW_NAME, "quote_price"))?;
    let new_order = NewOrder {
      customer_id: guard.customer_id,
      voucher_id: quote.voucher_id,
      service_name: valid.service_name,
      category: valid.category,
      description: valid.description,
      address: valid.address,
      subtotal: quote.subtotal,
      discount: quote.discount,
      total: quote.total,
      voucher_usage_limit: quote.voucher_usage_limit,
    };
    (guard.store.clone(), new_order, guard.request.voucher_code.clone())
  };

  let order = store.create_order(new_order).await.map_err(|err| match err {
    StoreError::PreconditionFailed { entity: "voucher", .. } => {
      OrderError::VoucherUsageExceeded(voucher_code.map(|c| c.trim().to_string()).unwrap_or_default())
    }
    other => other.into(),
  })?;
  info!(
    "Create Order Flow (Order {}): Persisted for customer {}. Total: {}",
    order.id, order.customer_id, order.total
  );
  ctx.write().created = Some(order);
  Ok(StepControl::Continue)
}
