// tukangin_server/src/seed.rs

//! Sample catalog (professionals and vouchers) for local runs, enabled with `SEED_DB=true`.

use crate::errors::Result;
use crate::store::PgStore;
use chrono::{Duration, Utc};
use tracing::info;
use tukangin::model::{DiscountRule, Professional, Voucher};
use tukangin::MemoryStore;
use uuid::Uuid;

pub struct SampleCatalog {
  pub professionals: Vec<Professional>,
  pub vouchers: Vec<Voucher>,
}

pub fn sample_catalog() -> SampleCatalog {
  let professionals = vec![
    Professional {
      id: Uuid::from_u128(0x7a1c_0001),
      name: "Budi Santoso".to_string(),
      phone: Some("+62 812 0000 0001".to_string()),
      specialty: Some("plumbing".to_string()),
    },
    Professional {
      id: Uuid::from_u128(0x7a1c_0002),
      name: "Siti Rahma".to_string(),
      phone: Some("+62 812 0000 0002".to_string()),
      specialty: Some("electrical".to_string()),
    },
    Professional {
      id: Uuid::from_u128(0x7a1c_0003),
      name: "Agus Wijaya".to_string(),
      phone: None,
      specialty: Some("air conditioning".to_string()),
    },
  ];

  let vouchers = vec![
    Voucher {
      id: Uuid::from_u128(0x70c4_0001),
      code: "HEMAT10".to_string(),
      is_active: true,
      expiry_date: Some(Utc::now() + Duration::days(90)),
      usage_limit: Some(3),
      rule: DiscountRule::Percentage(10),
      max_discount: Some(50_000),
    },
    Voucher {
      id: Uuid::from_u128(0x70c4_0002),
      code: "POTONG25K".to_string(),
      is_active: true,
      expiry_date: None,
      usage_limit: Some(1),
      rule: DiscountRule::Flat(25_000),
      max_discount: None,
    },
    Voucher {
      id: Uuid::from_u128(0x70c4_0003),
      code: "LEBARAN".to_string(),
      is_active: false,
      expiry_date: None,
      usage_limit: None,
      rule: DiscountRule::Percentage(20),
      max_discount: None,
    },
  ];

  SampleCatalog { professionals, vouchers }
}

pub fn seed_memory(store: &MemoryStore) {
  let catalog = sample_catalog();
  let (professionals, vouchers) = (catalog.professionals.len(), catalog.vouchers.len());
  catalog.professionals.into_iter().for_each(|p| store.put_professional(p));
  catalog.vouchers.into_iter().for_each(|v| store.put_voucher(v));
  info!(professionals, vouchers, "Seeded in-memory catalog.");
}

pub async fn seed_postgres(store: &PgStore) -> Result<()> {
  let catalog = sample_catalog();
  let mut tx = store.pool().begin().await?;

  for professional in &catalog.professionals {
    sqlx::query(
      "INSERT INTO professionals (id, name, phone, specialty) VALUES ($1, $2, $3, $4) ON CONFLICT (id) DO NOTHING",
    )
    .bind(professional.id)
    .bind(&professional.name)
    .bind(&professional.phone)
    .bind(&professional.specialty)
    .execute(&mut *tx)
    .await?;
  }

  for voucher in &catalog.vouchers {
    let (discount_type, discount_value) = match voucher.rule {
      DiscountRule::Percentage(p) => ("percentage", p),
      DiscountRule::Flat(a) => ("flat", a),
    };
    sqlx::query(
      "INSERT INTO vouchers (id, code, is_active, expiry_date, usage_limit, discount_type, discount_value, max_discount) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8) ON CONFLICT (code) DO NOTHING",
    )
    .bind(voucher.id)
    .bind(&voucher.code)
    .bind(voucher.is_active)
    .bind(voucher.expiry_date)
    .bind(voucher.usage_limit)
    .bind(discount_type)
    .bind(discount_value)
    .bind(voucher.max_discount)
    .execute(&mut *tx)
    .await?;
  }

  tx.commit().await?;
  info!(
    professionals = catalog.professionals.len(),
    vouchers = catalog.vouchers.len(),
    "Seeded database catalog."
  );
  Ok(())
}
