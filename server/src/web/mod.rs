// tukangin_server/src/web/mod.rs

pub mod extractors;
pub mod handlers;
pub mod routes;


use crate::errors::AppError;
use actix_web::web;

pub use routes::configure_app_routes;

/// Routes plus extractor configs that report malformed input as validation errors.
pub fn configure_app(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(
      web::JsonConfig::default().error_handler(|err, _req| AppError::Validation(format!("Invalid JSON body: {}", err)).into()),
    )
    .app_data(
      web::PathConfig::default().error_handler(|err, _req| AppError::Validation(format!("Invalid path: {}", err)).into()),
    )
    .app_data(
      web::QueryConfig::default().error_handler(|err, _req| AppError::Validation(format!("Invalid query: {}", err)).into()),
    )
    .configure(configure_app_routes);
}
