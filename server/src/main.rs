// tukangin_server/src/main.rs

mod config;
mod errors;
mod seed;
mod state;
mod store;
mod tasks;
mod web;

use crate::config::AppConfig;
use crate::errors::Result as AppResult;
use crate::state::AppState;
use crate::store::PgStore;

use actix_web::{web as actix_data, App, HttpServer};
use sqlx::PgPool;
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;
use tukangin::{MemoryStore, OrderEngine, Store};

/// Picks the store from configuration: PostgreSQL when `DATABASE_URL` is set,
/// the in-memory store otherwise.
async fn build_store(config: &AppConfig) -> AppResult<(Arc<dyn Store>, &'static str)> {
  match &config.database_url {
    Some(database_url) => {
      let pool = PgPool::connect(database_url).await?;
      tracing::info!("Successfully connected to the database.");
      if config.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied.");
      }
      let store = PgStore::new(pool);
      if config.seed_db {
        seed::seed_postgres(&store).await?;
      }
      let store: Arc<dyn Store> = Arc::new(store);
      Ok((store, "postgres"))
    }
    None => {
      tracing::warn!("DATABASE_URL not set; orders are kept in memory and lost on restart.");
      let store = MemoryStore::new();
      if config.seed_db {
        seed::seed_memory(&store);
      }
      let store: Arc<dyn Store> = Arc::new(store);
      Ok((store, "memory"))
    }
  }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting tukangin order service...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
    }
  };

  let (store, store_kind) = match build_store(&app_config).await {
    Ok(built) => built,
    Err(e) => {
      tracing::error!(error = %e, "Failed to initialise the order store.");
      return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
    }
  };

  let engine = Arc::new(OrderEngine::new(store, app_config.lifecycle.clone()));

  if let Some(period) = app_config.reconcile_interval() {
    tasks::spawn_warranty_reconciler(engine.clone(), period, app_config.reconcile_batch_size);
  }

  let app_state = AppState {
    engine,
    config: app_config.clone(),
    store_kind,
  };

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!(store = store_kind, "Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_app)
  })
  .bind(&server_address)?
  .run()
  .await
}
