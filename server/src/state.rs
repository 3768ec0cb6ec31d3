// tukangin_server/src/state.rs
use crate::config::AppConfig;
use std::sync::Arc;
use tukangin::OrderEngine;

#[derive(Clone)]
pub struct AppState {
  pub engine: Arc<OrderEngine>,
  pub config: Arc<AppConfig>,
  /// "postgres" or "memory", reported by the health check.
  pub store_kind: &'static str,
}
