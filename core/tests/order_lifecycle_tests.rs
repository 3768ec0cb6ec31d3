// tests/order_lifecycle_tests.rs
mod common;

use chrono::{Duration, Utc};
use common::*;
use serial_test::serial;
use std::sync::Arc;
use tukangin::model::{ClaimStatus, DiscountRule, OrderStatus, Voucher, WarrantyStatus, MAX_AMOUNT};
use tukangin::services::{ClaimRequest, SubmitReview};
use tukangin::store::OrderStore;
use tukangin::{ErrorKind, LifecycleConfig, MemoryStore, OrderEngine, OrderError, RequestContext};
use uuid::Uuid;

#[tokio::test]
#[serial]
async fn test_full_order_journey() {
  setup_tracing();
  let store = Arc::new(MemoryStore::new());
  let engine = engine_over(store.clone());
  let (_, ctx) = customer();

  let order = engine.create_order(&ctx, order_request(150_000)).await.unwrap();
  assert_eq!(order.total, 150_000);
  assert_eq!(order.status, OrderStatus::Pending);

  let receipt = engine.pay_deposit(&ctx, order.id, deposit(75_000)).await.unwrap();
  assert_eq!(receipt.order_status, OrderStatus::Processing);

  let outcome = engine
    .change_status(&ctx, order.id, OrderStatus::Completed)
    .await
    .unwrap();
  assert_eq!(outcome.order.status, OrderStatus::Completed);
  assert!(outcome.order.completed_at.is_some());
  let warranty = outcome.warranty.expect("warranty issued on completion");
  let window = warranty.valid_until - Utc::now();
  assert!(window > Duration::days(29) && window <= Duration::days(30));
  assert_eq!(store.warranties_for_order(order.id).len(), 1);

  let review = engine
    .submit_review(
      &ctx,
      SubmitReview {
        order_id: order.id,
        professional_id: None,
        rating: 4,
        comment: "Cepat dan rapi".to_string(),
        tags: vec!["rapi".to_string()],
      },
    )
    .await
    .unwrap();
  assert_eq!(review.rating, 4);

  let claim = engine
    .claim_warranty(
      &ctx,
      warranty.id,
      ClaimRequest {
        issue_description: "AC bocor lagi".to_string(),
        evidence_photos: vec!["https://cdn.example/photo1.jpg".to_string()],
      },
    )
    .await
    .unwrap();
  assert_eq!(claim.status, ClaimStatus::Submitted);
  assert_eq!(claim.warranty_status, WarrantyStatus::Claimed);

  let view = engine.get_warranty(&ctx, order.id).await.unwrap();
  assert_eq!(view.warranty.status, WarrantyStatus::Claimed);
  assert!(view.warranty.claim.is_some());
}

#[tokio::test]
#[serial]
async fn test_wrong_deposit_amount_is_rejected() {
  setup_tracing();
  let store = Arc::new(MemoryStore::new());
  let engine = engine_over(store.clone());
  let (_, ctx) = customer();
  let order = engine.create_order(&ctx, order_request(150_000)).await.unwrap();

  let err = engine.pay_deposit(&ctx, order.id, deposit(10_000)).await.unwrap_err();
  assert!(matches!(
    err,
    OrderError::InvalidDepositAmount {
      expected: 75_000,
      received: 10_000
    }
  ));
  assert!(err.to_string().contains("Invalid DP Amount"));

  let unchanged = store.find_order(order.id).await.unwrap().unwrap();
  assert_eq!(unchanged.status, OrderStatus::Pending);
  assert!(unchanged.paid_at.is_none());
}

#[tokio::test]
#[serial]
async fn test_odd_totals_round_the_deposit_up() {
  setup_tracing();
  let engine = engine_over(Arc::new(MemoryStore::new()));
  let (_, ctx) = customer();
  let order = engine.create_order(&ctx, order_request(99_999)).await.unwrap();

  let receipt = engine.pay_deposit(&ctx, order.id, deposit(50_000)).await.unwrap();
  assert_eq!(receipt.amount, 50_000);
}

#[tokio::test]
#[serial]
async fn test_second_payment_fails() {
  setup_tracing();
  let engine = engine_over(Arc::new(MemoryStore::new()));
  let (_, ctx) = customer();
  let order = engine.create_order(&ctx, order_request(150_000)).await.unwrap();
  engine.pay_deposit(&ctx, order.id, deposit(75_000)).await.unwrap();

  let err = engine.pay_deposit(&ctx, order.id, deposit(75_000)).await.unwrap_err();
  assert!(matches!(err, OrderError::AlreadyPaidOrInvalidState { .. }));
}

#[tokio::test]
#[serial]
async fn test_concurrent_payments_have_exactly_one_winner() {
  setup_tracing();
  let engine = Arc::new(engine_over(Arc::new(MemoryStore::new())));
  let (_, ctx) = customer();
  let order = engine.create_order(&ctx, order_request(150_000)).await.unwrap();

  let mut tasks = Vec::new();
  for _ in 0..8 {
    let engine = engine.clone();
    tasks.push(tokio::spawn(async move {
      engine.pay_deposit(&ctx, order.id, deposit(75_000)).await
    }));
  }
  let mut wins = 0;
  for task in tasks {
    match task.await.unwrap() {
      Ok(_) => wins += 1,
      Err(e) => assert!(matches!(e, OrderError::AlreadyPaidOrInvalidState { .. })),
    }
  }
  assert_eq!(wins, 1);
}

#[tokio::test]
#[serial]
async fn test_completing_a_pending_order_is_an_invalid_transition() {
  setup_tracing();
  let engine = engine_over(Arc::new(MemoryStore::new()));
  let (_, ctx) = customer();
  let order = engine.create_order(&ctx, order_request(150_000)).await.unwrap();

  let err = engine
    .change_status(&ctx, order.id, OrderStatus::Completed)
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    OrderError::InvalidTransition {
      from: OrderStatus::Pending,
      to: OrderStatus::Completed
    }
  ));

  let err = engine
    .change_status(&ctx, order.id, OrderStatus::Processing)
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    OrderError::InvalidTransition {
      from: OrderStatus::Pending,
      to: OrderStatus::Processing
    }
  ));
}

#[tokio::test]
#[serial]
async fn test_terminal_orders_reject_every_change() {
  setup_tracing();
  let store = Arc::new(MemoryStore::new());
  let engine = engine_over(store.clone());
  let (_, ctx) = customer();
  let order = paid_order(&engine, &ctx, 120_000).await;
  engine
    .change_status(&ctx, order.id, OrderStatus::Completed)
    .await
    .unwrap();

  for target in [OrderStatus::Completed, OrderStatus::Cancelled, OrderStatus::Pending] {
    let err = engine.change_status(&ctx, order.id, target).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StateConflict, "{:?}", target);
  }
  let pro = seed_professional(&store);
  assert!(engine.assign_professional(&admin(), order.id, pro).await.is_err());
  assert!(engine.cancel_order(&admin(), order.id).await.is_err());
}

#[tokio::test]
#[serial]
async fn test_orders_of_other_customers_look_missing() {
  setup_tracing();
  let engine = engine_over(Arc::new(MemoryStore::new()));
  let (_, owner) = customer();
  let (_, stranger) = customer();
  let order = engine.create_order(&owner, order_request(80_000)).await.unwrap();

  let err = engine.get_order(&stranger, order.id).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Authorization);
  assert_eq!(err.reason(), "not_found");

  let missing = engine.get_order(&owner, Uuid::new_v4()).await.unwrap_err();
  assert_eq!(missing.kind(), ErrorKind::NotFound);
  assert_eq!(err.to_string().split(':').next(), missing.to_string().split(':').next());

  assert!(engine.pay_deposit(&stranger, order.id, deposit(40_000)).await.is_err());
  assert!(engine.get_order(&admin(), order.id).await.is_ok());
}

#[tokio::test]
#[serial]
async fn test_anonymous_callers_are_rejected() {
  setup_tracing();
  let engine = engine_over(Arc::new(MemoryStore::new()));
  let anonymous = RequestContext::anonymous();

  let err = engine.create_order(&anonymous, order_request(10_000)).await.unwrap_err();
  assert!(matches!(err, OrderError::Unauthenticated));
  let err = engine.get_order(&anonymous, Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, OrderError::Unauthenticated));
}

#[tokio::test]
#[serial]
async fn test_missing_fields_and_price_mismatch_persist_nothing() {
  setup_tracing();
  let store = Arc::new(MemoryStore::new());
  let engine = engine_over(store.clone());
  let (_, ctx) = customer();

  let mut blank_address = order_request(50_000);
  blank_address.address = "   ".to_string();
  let err = engine.create_order(&ctx, blank_address).await.unwrap_err();
  assert!(matches!(err, OrderError::Validation(_)));

  let mut tampered = order_request(50_000);
  tampered.total = Some(1_000);
  let err = engine.create_order(&ctx, tampered).await.unwrap_err();
  assert!(matches!(
    err,
    OrderError::PriceMismatch {
      expected_discount: 0,
      expected_total: 50_000
    }
  ));

  assert_eq!(store.order_count(), 0);
}

#[tokio::test]
#[serial]
async fn test_voucher_is_applied_and_limited_per_customer() {
  setup_tracing();
  let store = Arc::new(MemoryStore::new());
  let engine = engine_over(store.clone());
  let (_, ctx) = customer();
  let voucher_id = seed_voucher(&store, "HEMAT10", DiscountRule::Percentage(10));

  let mut request = order_request(150_000);
  request.voucher_code = Some("HEMAT10".to_string());
  request.discount = Some(15_000);
  request.total = Some(135_000);
  let order = engine.create_order(&ctx, request.clone()).await.unwrap();
  assert_eq!(order.discount, 15_000);
  assert_eq!(order.total, 135_000);
  assert_eq!(order.voucher_id, Some(voucher_id));

  let err = engine.create_order(&ctx, request.clone()).await.unwrap_err();
  assert!(matches!(err, OrderError::VoucherUsageExceeded(_)));

  // Cancelling frees the use again.
  engine
    .change_status(&ctx, order.id, OrderStatus::Cancelled)
    .await
    .unwrap();
  assert!(engine.create_order(&ctx, request).await.is_ok());
}

#[tokio::test]
#[serial]
async fn test_ineligible_vouchers_create_no_order() {
  setup_tracing();
  let store = Arc::new(MemoryStore::new());
  let engine = engine_over(store.clone());
  let (_, ctx) = customer();

  store.put_voucher(Voucher {
    id: Uuid::new_v4(),
    code: "LAMA".to_string(),
    is_active: true,
    expiry_date: Some(Utc::now() - Duration::days(1)),
    usage_limit: None,
    rule: DiscountRule::Flat(5_000),
    max_discount: None,
  });

  let mut request = order_request(60_000);
  request.voucher_code = Some("LAMA".to_string());
  let err = engine.create_order(&ctx, request).await.unwrap_err();
  assert!(matches!(err, OrderError::VoucherInactive(_)));

  let mut unknown = order_request(60_000);
  unknown.voucher_code = Some("TIDAKADA".to_string());
  let err = engine.create_order(&ctx, unknown).await.unwrap_err();
  assert!(matches!(err, OrderError::VoucherNotFound(_)));

  assert_eq!(store.order_count(), 0);
}

#[tokio::test]
#[serial]
async fn test_customer_cancellation_rules() {
  setup_tracing();
  let store = Arc::new(MemoryStore::new());
  let engine = engine_over(store.clone());
  let (_, ctx) = customer();

  let pending = engine.create_order(&ctx, order_request(40_000)).await.unwrap();
  let outcome = engine
    .change_status(&ctx, pending.id, OrderStatus::Cancelled)
    .await
    .unwrap();
  assert_eq!(outcome.order.status, OrderStatus::Cancelled);
  assert!(outcome.order.cancelled_at.is_some());
  assert!(outcome.warranty.is_none());

  let assigned = paid_order(&engine, &ctx, 40_000).await;
  let pro = seed_professional(&store);
  engine.assign_professional(&admin(), assigned.id, pro).await.unwrap();
  let err = engine
    .change_status(&ctx, assigned.id, OrderStatus::Cancelled)
    .await
    .unwrap_err();
  assert!(matches!(err, OrderError::Conflict(_)));

  // Admins are held to the same rule; the order stays assigned and PROCESSING.
  let err = engine.cancel_order(&admin(), assigned.id).await.unwrap_err();
  assert!(matches!(err, OrderError::Conflict(_)));
  let kept = engine.get_order(&admin(), assigned.id).await.unwrap();
  assert_eq!(kept.status, OrderStatus::Processing);
  assert_eq!(kept.professional_id, Some(pro));

  // An unassigned paid order can still be cancelled by an admin.
  let unassigned = paid_order(&engine, &ctx, 40_000).await;
  let outcome = engine.cancel_order(&admin(), unassigned.id).await.unwrap();
  assert_eq!(outcome.order.status, OrderStatus::Cancelled);
  assert!(outcome.order.professional_id.is_none());
}

#[tokio::test]
#[serial]
async fn test_custom_warranty_window_is_used() {
  setup_tracing();
  let store = Arc::new(MemoryStore::new());
  let config = LifecycleConfig {
    warranty_days: 90,
    coverage_type: "premium".to_string(),
    ..LifecycleConfig::default()
  };
  let engine = OrderEngine::new(store, config);
  let (_, ctx) = customer();
  let order = paid_order(&engine, &ctx, 200_000).await;

  let outcome = engine
    .change_status(&ctx, order.id, OrderStatus::Completed)
    .await
    .unwrap();
  let warranty = outcome.warranty.unwrap();
  assert_eq!(warranty.coverage_type, "premium");
  let view = engine.get_warranty(&ctx, order.id).await.unwrap();
  assert!(view.remaining_days == 89 || view.remaining_days == 90);
}

#[tokio::test]
#[serial]
async fn test_out_of_range_subtotals_are_rejected_and_the_top_amount_still_pays() {
  setup_tracing();
  let store = Arc::new(MemoryStore::new());
  let engine = engine_over(store.clone());
  let (_, ctx) = customer();

  for subtotal in [i64::MAX, MAX_AMOUNT + 1, -1] {
    let err = engine.create_order(&ctx, order_request(subtotal)).await.unwrap_err();
    assert!(matches!(err, OrderError::Validation(_)), "{}", subtotal);
  }
  assert_eq!(store.order_count(), 0);

  let order = engine.create_order(&ctx, order_request(MAX_AMOUNT)).await.unwrap();
  assert_eq!(order.deposit_due(), MAX_AMOUNT / 2);
  let receipt = engine.pay_deposit(&ctx, order.id, deposit(MAX_AMOUNT / 2)).await.unwrap();
  assert_eq!(receipt.amount, MAX_AMOUNT / 2);
  assert_eq!(receipt.order_status, OrderStatus::Processing);
}

#[tokio::test]
#[serial]
async fn test_concurrent_completions_issue_one_warranty() {
  setup_tracing();
  let store = Arc::new(MemoryStore::new());
  let engine = Arc::new(engine_over(store.clone()));
  let (_, ctx) = customer();
  let order = paid_order(&engine, &ctx, 180_000).await;

  let mut tasks = Vec::new();
  for _ in 0..8 {
    let engine = engine.clone();
    tasks.push(tokio::spawn(async move {
      engine.change_status(&ctx, order.id, OrderStatus::Completed).await
    }));
  }
  let mut wins = 0;
  for task in tasks {
    match task.await.unwrap() {
      Ok(outcome) => {
        wins += 1;
        assert!(outcome.warranty.is_some());
      }
      Err(e) => assert_eq!(e.kind(), ErrorKind::StateConflict, "{}", e),
    }
  }
  assert_eq!(wins, 1);
  assert_eq!(store.warranties_for_order(order.id).len(), 1);
  let stored = store.find_order(order.id).await.unwrap().unwrap();
  assert_eq!(stored.status, OrderStatus::Completed);
}

#[tokio::test]
#[serial]
async fn test_completion_racing_an_admin_cancel_has_one_winner() {
  setup_tracing();
  let store = Arc::new(MemoryStore::new());
  let engine = Arc::new(engine_over(store.clone()));
  let (_, ctx) = customer();
  let order = paid_order(&engine, &ctx, 60_000).await;

  let completing = {
    let engine = engine.clone();
    tokio::spawn(async move { engine.change_status(&ctx, order.id, OrderStatus::Completed).await })
  };
  let cancelling = {
    let engine = engine.clone();
    tokio::spawn(async move { engine.cancel_order(&admin(), order.id).await })
  };
  let completed = completing.await.unwrap();
  let cancelled = cancelling.await.unwrap();
  assert!(completed.is_ok() != cancelled.is_ok(), "{:?} / {:?}", completed, cancelled);

  let stored = store.find_order(order.id).await.unwrap().unwrap();
  if completed.is_ok() {
    assert_eq!(stored.status, OrderStatus::Completed);
    assert_eq!(store.warranties_for_order(order.id).len(), 1);
    assert_eq!(cancelled.unwrap_err().kind(), ErrorKind::StateConflict);
  } else {
    assert_eq!(stored.status, OrderStatus::Cancelled);
    assert!(stored.completed_at.is_none());
    assert!(store.warranties_for_order(order.id).is_empty());
    assert_eq!(completed.unwrap_err().kind(), ErrorKind::StateConflict);
  }
}

#[tokio::test]
#[serial]
async fn test_concurrent_voucher_orders_respect_the_usage_limit() {
  setup_tracing();
  let store = Arc::new(MemoryStore::new());
  let engine = Arc::new(engine_over(store.clone()));
  let (customer_id, ctx) = customer();
  let voucher_id = seed_voucher(&store, "SEKALI", DiscountRule::Flat(10_000));

  let mut tasks = Vec::new();
  for _ in 0..8 {
    let engine = engine.clone();
    tasks.push(tokio::spawn(async move {
      let mut request = order_request(100_000);
      request.voucher_code = Some("SEKALI".to_string());
      engine.create_order(&ctx, request).await
    }));
  }
  let mut wins = 0;
  for task in tasks {
    match task.await.unwrap() {
      Ok(order) => {
        wins += 1;
        assert_eq!(order.voucher_id, Some(voucher_id));
      }
      Err(e) => assert!(matches!(e, OrderError::VoucherUsageExceeded(ref code) if code == "SEKALI"), "{}", e),
    }
  }
  assert_eq!(wins, 1);
  assert_eq!(store.order_count(), 1);
  assert_eq!(store.count_voucher_usage(customer_id, voucher_id).await.unwrap(), 1);
}
