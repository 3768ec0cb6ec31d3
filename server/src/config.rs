// tukangin_server/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;
use tukangin::LifecycleConfig;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  /// Absent selects the in-memory store.
  pub database_url: Option<String>,
  pub admin_api_key: String,

  pub lifecycle: LifecycleConfig,

  /// Zero disables the periodic warranty reconciliation.
  pub reconcile_interval_secs: u64,
  pub reconcile_batch_size: usize,

  pub run_migrations: bool,
  pub seed_db: bool,
}

fn parse_var<T>(var_name: &str, raw: String) -> Result<T>
where
  T: std::str::FromStr,
  T::Err: std::fmt::Display,
{
  raw
    .trim()
    .parse::<T>()
    .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", var_name, raw, e)))
}

/// Warranty settings from their raw variables; absent values fall back to the defaults.
fn lifecycle_from(
  warranty_days: Option<String>,
  coverage_type: Option<String>,
  warranty_terms: Option<String>,
) -> Result<LifecycleConfig> {
  let defaults = LifecycleConfig::default();
  let lifecycle = LifecycleConfig {
    warranty_days: match warranty_days {
      Some(raw) => parse_var("WARRANTY_DAYS", raw)?,
      None => defaults.warranty_days,
    },
    coverage_type: coverage_type.unwrap_or(defaults.coverage_type),
    warranty_terms: warranty_terms.unwrap_or(defaults.warranty_terms),
  };
  lifecycle
    .validate()
    .map_err(|e| AppError::Config(format!("Invalid WARRANTY_DAYS: {}", e)))?;
  Ok(lifecycle)
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = parse_var("SERVER_PORT", get_env("SERVER_PORT").unwrap_or_else(|_| "8080".to_string()))?;
    let database_url = get_env("DATABASE_URL").ok().filter(|url| !url.trim().is_empty());
    let admin_api_key = get_env("ADMIN_API_KEY")?;
    if admin_api_key.trim().is_empty() {
      return Err(AppError::Config("ADMIN_API_KEY must not be empty".to_string()));
    }

    let lifecycle = lifecycle_from(
      get_env("WARRANTY_DAYS").ok(),
      get_env("WARRANTY_COVERAGE_TYPE").ok(),
      get_env("WARRANTY_TERMS").ok(),
    )?;

    let reconcile_interval_secs = parse_var(
      "RECONCILE_INTERVAL_SECS",
      get_env("RECONCILE_INTERVAL_SECS").unwrap_or_else(|_| "0".to_string()),
    )?;
    let reconcile_batch_size = parse_var(
      "RECONCILE_BATCH_SIZE",
      get_env("RECONCILE_BATCH_SIZE").unwrap_or_else(|_| "100".to_string()),
    )?;
    let run_migrations = parse_var(
      "RUN_MIGRATIONS",
      get_env("RUN_MIGRATIONS").unwrap_or_else(|_| "true".to_string()),
    )?;
    let seed_db = parse_var("SEED_DB", get_env("SEED_DB").unwrap_or_else(|_| "false".to_string()))?;

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      admin_api_key,
      lifecycle,
      reconcile_interval_secs,
      reconcile_batch_size,
      run_migrations,
      seed_db,
    })
  }

  pub fn reconcile_interval(&self) -> Option<Duration> {
    (self.reconcile_interval_secs > 0).then(|| Duration::from_secs(self.reconcile_interval_secs))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn warranty_days_defaults_and_overrides() {
    let lifecycle = lifecycle_from(None, None, None).unwrap();
    assert_eq!(lifecycle.warranty_days, 30);
    assert_eq!(lifecycle.coverage_type, "standard");

    let lifecycle = lifecycle_from(Some(" 90 ".to_string()), Some("premium".to_string()), None).unwrap();
    assert_eq!(lifecycle.warranty_days, 90);
    assert_eq!(lifecycle.coverage_type, "premium");
  }

  #[test]
  fn non_positive_or_garbled_warranty_days_are_rejected() {
    for raw in ["0", "-5", "thirty"] {
      let err = lifecycle_from(Some(raw.to_string()), None, None).unwrap_err();
      assert!(matches!(err, AppError::Config(_)), "{} accepted", raw);
    }
  }
}
