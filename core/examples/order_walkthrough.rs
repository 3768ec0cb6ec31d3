// tukangin/examples/order_walkthrough.rs

use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::info;
use tukangin::model::{DiscountRule, OrderStatus, PaymentMethod, Professional, Voucher};
use tukangin::services::{ClaimRequest, CreateOrderRequest, DepositRequest, SubmitReview};
use tukangin::{LifecycleConfig, MemoryStore, OrderEngine, OrderError, RequestContext};
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<(), OrderError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Order Walkthrough ---");

  // 1. A store with one professional and one voucher
  let store = Arc::new(MemoryStore::new());
  let professional_id = Uuid::new_v4();
  store.put_professional(Professional {
    id: professional_id,
    name: "Budi Santoso".to_string(),
    phone: None,
    specialty: Some("plumbing".to_string()),
  });
  store.put_voucher(Voucher {
    id: Uuid::new_v4(),
    code: "HEMAT10".to_string(),
    is_active: true,
    expiry_date: Some(Utc::now() + Duration::days(30)),
    usage_limit: Some(1),
    rule: DiscountRule::Percentage(10),
    max_discount: None,
  });

  let engine = OrderEngine::new(store.clone(), LifecycleConfig::default());
  let customer = RequestContext::customer(Uuid::new_v4());
  let admin = RequestContext::admin(None);

  // 2. Create: 150,000 less 10% is 135,000
  let order = engine
    .create_order(
      &customer,
      CreateOrderRequest {
        service_name: "Pipe repair".to_string(),
        category: "plumbing".to_string(),
        description: Some("Leaking kitchen sink".to_string()),
        address: "Jl. Merdeka 10, Bandung".to_string(),
        subtotal: 150_000,
        discount: None,
        total: None,
        voucher_code: Some("HEMAT10".to_string()),
      },
    )
    .await?;
  info!("Created order {} with total {} (deposit due {}).", order.id, order.total, order.deposit_due());

  // 3. Pay half up front
  let receipt = engine
    .pay_deposit(
      &customer,
      order.id,
      DepositRequest {
        amount: order.deposit_due(),
        method: PaymentMethod::EWallet,
      },
    )
    .await?;
  info!("Deposit {} paid; order is now {}.", receipt.amount, receipt.order_status);

  // 4. Assign, finish, complete
  engine.assign_professional(&admin, order.id, professional_id).await?;
  engine.finish_work(&admin, order.id).await?;
  let outcome = engine.change_status(&customer, order.id, OrderStatus::Completed).await?;
  let warranty = outcome.warranty.ok_or_else(|| OrderError::Validation("no warranty issued".to_string()))?;
  info!("Order completed; warranty {} valid until {}.", warranty.id, warranty.valid_until);

  // 5. Claim and review
  let claim = engine
    .claim_warranty(
      &customer,
      warranty.id,
      ClaimRequest {
        issue_description: "The sink leaks again".to_string(),
        evidence_photos: vec![],
      },
    )
    .await?;
  info!("Claim on warranty {} is {:?}.", claim.warranty_id, claim.status);

  let review = engine
    .submit_review(
      &customer,
      SubmitReview {
        order_id: order.id,
        professional_id: Some(professional_id),
        rating: 5,
        comment: "Fast and tidy".to_string(),
        tags: vec!["on time".to_string()],
      },
    )
    .await?;
  info!("Review {} recorded with rating {}.", review.id, review.rating);

  // 6. A second deposit is refused
  let second = engine
    .pay_deposit(
      &customer,
      order.id,
      DepositRequest {
        amount: order.deposit_due(),
        method: PaymentMethod::Cash,
      },
    )
    .await;
  info!("Second deposit attempt: {:?}", second.map(|r| r.order_status));

  info!("--- Order Walkthrough Finished ---");
  Ok(())
}
