// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every helper

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::Level;
use tukangin::model::{
  DiscountRule, NewOrder, NewReview, NewWarranty, Order, OrderId, Professional, ProfessionalId, Review, UserId,
  Voucher, VoucherId, Warranty, WarrantyClaim, WarrantyId,
};
use tukangin::services::{CreateOrderRequest, DepositRequest};
use tukangin::store::{CatalogStore, OrderPatch, OrderStore, Precondition, ReviewStore, WarrantyStore};
use tukangin::{
  FlowData, FlowError, LifecycleConfig, MemoryStore, OrderEngine, RequestContext, StepControl, StoreError,
  StoreResult,
};
use uuid::Uuid;

// --- Flow test context and error ---
#[derive(Clone, Debug, Default)]
pub struct TestContext {
  pub counter: i32,
  pub message: String,
  pub steps_executed: Vec<String>,
  pub should_stop_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("Flow error: {0}")]
  Flow(String),

  #[error("Test handler failed: {0}")]
  Handler(String),
}

impl From<FlowError> for TestError {
  fn from(fe: FlowError) -> Self {
    TestError::Flow(fe.to_string())
  }
}

pub type TestHandler = Box<
  dyn Fn(FlowData<TestContext>) -> Pin<Box<dyn Future<Output = Result<StepControl, TestError>> + Send>>
    + Send
    + Sync,
>;

pub fn create_simple_handler(step_name: &'static str, message_to_append: &'static str) -> TestHandler {
  Box::new(move |ctx: FlowData<TestContext>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.counter += 1;
      guard.message.push_str(message_to_append);
      guard.steps_executed.push(step_name.to_string());
      tracing::debug!(target: "test_handlers", step = step_name, "executed, counter: {}", guard.counter);
      if guard.should_stop_at.as_deref() == Some(step_name) {
        return Ok(StepControl::Stop);
      }
      Ok(StepControl::Continue)
    })
  })
}

pub fn create_failing_handler(step_name: &'static str, error_message: &'static str) -> TestHandler {
  Box::new(move |ctx: FlowData<TestContext>| {
    Box::pin(async move {
      ctx.write().steps_executed.push(step_name.to_string());
      tracing::warn!(target: "test_handlers", step = step_name, "failing with: '{}'", error_message);
      Err(TestError::Handler(error_message.to_string()))
    })
  })
}

// --- Tracing setup ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Identities ---
pub fn customer() -> (UserId, RequestContext) {
  let id = Uuid::new_v4();
  (id, RequestContext::customer(id))
}

pub fn admin() -> RequestContext {
  RequestContext::admin(None)
}

// --- Engine and fixtures ---
pub fn engine_over(store: Arc<MemoryStore>) -> OrderEngine {
  OrderEngine::new(store, LifecycleConfig::default())
}

pub fn order_request(subtotal: i64) -> CreateOrderRequest {
  CreateOrderRequest {
    service_name: "Perbaikan AC".to_string(),
    category: "ac".to_string(),
    description: Some("AC tidak dingin".to_string()),
    address: "Jl. Sudirman No. 10, Jakarta".to_string(),
    subtotal,
    discount: None,
    total: None,
    voucher_code: None,
  }
}

pub fn deposit(amount: i64) -> DepositRequest {
  DepositRequest {
    amount,
    method: tukangin::model::PaymentMethod::BankTransfer,
  }
}

pub fn seed_professional(store: &MemoryStore) -> ProfessionalId {
  let id = Uuid::new_v4();
  store.put_professional(Professional {
    id,
    name: "Budi Santoso".to_string(),
    phone: Some("+628123456789".to_string()),
    specialty: Some("ac".to_string()),
  });
  id
}

pub fn seed_voucher(store: &MemoryStore, code: &str, rule: DiscountRule) -> VoucherId {
  let id = Uuid::new_v4();
  store.put_voucher(Voucher {
    id,
    code: code.to_string(),
    is_active: true,
    expiry_date: Some(Utc::now() + Duration::days(7)),
    usage_limit: Some(1),
    rule,
    max_discount: None,
  });
  id
}

/// Creates an order for `ctx` and pays its deposit, returning the paid order.
pub async fn paid_order(engine: &OrderEngine, ctx: &RequestContext, subtotal: i64) -> Order {
  let order = engine.create_order(ctx, order_request(subtotal)).await.unwrap();
  engine
    .pay_deposit(ctx, order.id, deposit(order.deposit_due()))
    .await
    .unwrap();
  engine.get_order(ctx, order.id).await.unwrap()
}

// --- A store whose warranty inserts can be made to fail ---
#[derive(Default)]
pub struct FlakyWarrantyStore {
  pub inner: MemoryStore,
  pub fail_warranty_inserts: AtomicBool,
}

impl FlakyWarrantyStore {
  pub fn failing() -> Self {
    Self {
      inner: MemoryStore::new(),
      fail_warranty_inserts: AtomicBool::new(true),
    }
  }

  pub fn heal(&self) {
    self.fail_warranty_inserts.store(false, Ordering::SeqCst);
  }
}

#[async_trait]
impl OrderStore for FlakyWarrantyStore {
  async fn create_order(&self, order: NewOrder) -> StoreResult<Order> {
    self.inner.create_order(order).await
  }

  async fn find_order(&self, order_id: OrderId) -> StoreResult<Option<Order>> {
    self.inner.find_order(order_id).await
  }

  async fn update_order(
    &self,
    order_id: OrderId,
    patch: OrderPatch,
    precondition: Option<Precondition>,
  ) -> StoreResult<Order> {
    self.inner.update_order(order_id, patch, precondition).await
  }

  async fn count_voucher_usage(&self, customer_id: UserId, voucher_id: VoucherId) -> StoreResult<i64> {
    self.inner.count_voucher_usage(customer_id, voucher_id).await
  }

  async fn completed_without_warranty(&self, limit: usize) -> StoreResult<Vec<Order>> {
    self.inner.completed_without_warranty(limit).await
  }
}

#[async_trait]
impl CatalogStore for FlakyWarrantyStore {
  async fn find_voucher_by_code(&self, code: &str) -> StoreResult<Option<Voucher>> {
    self.inner.find_voucher_by_code(code).await
  }

  async fn find_professional(&self, professional_id: ProfessionalId) -> StoreResult<Option<Professional>> {
    self.inner.find_professional(professional_id).await
  }
}

#[async_trait]
impl WarrantyStore for FlakyWarrantyStore {
  async fn insert_warranty(&self, warranty: NewWarranty) -> StoreResult<Warranty> {
    if self.fail_warranty_inserts.load(Ordering::SeqCst) {
      return Err(StoreError::from(anyhow::anyhow!("warranty table unavailable")));
    }
    self.inner.insert_warranty(warranty).await
  }

  async fn find_warranty(&self, warranty_id: WarrantyId) -> StoreResult<Option<Warranty>> {
    self.inner.find_warranty(warranty_id).await
  }

  async fn find_warranty_by_order(&self, order_id: OrderId) -> StoreResult<Option<Warranty>> {
    self.inner.find_warranty_by_order(order_id).await
  }

  async fn claim_warranty(&self, warranty_id: WarrantyId, claim: WarrantyClaim) -> StoreResult<Warranty> {
    self.inner.claim_warranty(warranty_id, claim).await
  }
}

#[async_trait]
impl ReviewStore for FlakyWarrantyStore {
  async fn insert_review(&self, review: NewReview) -> StoreResult<Review> {
    self.inner.insert_review(review).await
  }

  async fn find_review_by_order(&self, order_id: OrderId) -> StoreResult<Option<Review>> {
    self.inner.find_review_by_order(order_id).await
  }
}
