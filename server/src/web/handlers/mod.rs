// tukangin_server/src/web/handlers/mod.rs

pub mod admin_handlers;
pub mod order_handlers;
pub mod review_handlers;
pub mod warranty_handlers;

use crate::state::AppState;
use actix_web::{web, HttpResponse};

pub async fn health_check_handler(app_state: web::Data<AppState>) -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok", "store": app_state.store_kind }))
}
