use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use tokio::runtime::Runtime;
use tukangin::model::{DiscountRule, PaymentMethod, Voucher};
use tukangin::services::{CreateOrderRequest, DepositRequest};
use tukangin::{
  Flow, FlowData, FlowError, LifecycleConfig, MemoryStore, OrderEngine, RequestContext, StepControl, StepMode,
};
use uuid::Uuid;

#[derive(Clone, Debug, Default)]
struct BenchContext {
  counter: u64,
}

#[derive(Debug, thiserror::Error)]
#[error("bench flow error: {0}")]
struct BenchError(String);

impl From<FlowError> for BenchError {
  fn from(fe: FlowError) -> Self {
    BenchError(fe.to_string())
  }
}

async fn increment(ctx: FlowData<BenchContext>) -> Result<StepControl, BenchError> {
  ctx.write().counter += 1;
  Ok(StepControl::Continue)
}

fn build_flow(num_steps: usize) -> Flow<BenchContext, BenchError> {
  let steps: Vec<(&'static str, StepMode)> = (0..num_steps)
    .map(|i| {
      let name: &'static str = Box::leak(format!("step_{}", i).into_boxed_str());
      (name, StepMode::Required)
    })
    .collect();
  let mut flow = Flow::new("bench", &steps);
  for (name, _) in &steps {
    flow.on(name, increment);
  }
  flow
}

fn bench_flow_runner(c: &mut Criterion) {
  let mut group = c.benchmark_group("FlowRunner");
  let rt = Runtime::new().unwrap();

  for num_steps in [1usize, 5, 20] {
    let flow = build_flow(num_steps);
    group.throughput(Throughput::Elements(num_steps as u64));
    group.bench_with_input(BenchmarkId::from_parameter(num_steps), &num_steps, |b, _| {
      b.to_async(&rt).iter(|| async {
        let ctx = FlowData::new(BenchContext::default());
        flow.run(ctx).await.unwrap();
      });
    });
  }
  group.finish();
}

fn request(subtotal: i64, voucher_code: Option<&str>) -> CreateOrderRequest {
  CreateOrderRequest {
    service_name: "Cuci AC".to_string(),
    category: "ac".to_string(),
    description: None,
    address: "Jl. Thamrin 1".to_string(),
    subtotal,
    discount: None,
    total: None,
    voucher_code: voucher_code.map(str::to_string),
  }
}

fn bench_create_and_pay(c: &mut Criterion) {
  let mut group = c.benchmark_group("OrderEngine");
  let rt = Runtime::new().unwrap();

  let store = Arc::new(MemoryStore::new());
  store.put_voucher(Voucher {
    id: Uuid::new_v4(),
    code: "BENCH".to_string(),
    is_active: true,
    expiry_date: None,
    usage_limit: None,
    rule: DiscountRule::Percentage(15),
    max_discount: Some(20_000),
  });
  let engine = OrderEngine::new(store, LifecycleConfig::default());

  for voucher in [None, Some("BENCH")] {
    let label = voucher.unwrap_or("no_voucher");
    group.bench_function(BenchmarkId::new("create_and_pay", label), |b| {
      b.to_async(&rt).iter(|| async {
        let ctx = RequestContext::customer(Uuid::new_v4());
        let order = engine.create_order(&ctx, request(150_000, voucher)).await.unwrap();
        let deposit = DepositRequest {
          amount: order.deposit_due(),
          method: PaymentMethod::EWallet,
        };
        engine.pay_deposit(&ctx, order.id, deposit).await.unwrap();
      });
    });
  }
  group.finish();
}

criterion_group!(benches, bench_flow_runner, bench_create_and_pay);
criterion_main!(benches);
