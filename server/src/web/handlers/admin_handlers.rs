// tukangin_server/src/web/handlers/admin_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AdminUser;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AssignPayload {
  #[serde(alias = "tukangId")]
  pub professional_id: Uuid,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastPayload {
  pub order_ids: Vec<Uuid>,
  #[serde(alias = "tukangId")]
  pub professional_id: Uuid,
}

#[derive(Deserialize, Debug)]
pub struct ReconcileQuery {
  pub limit: Option<usize>,
}

#[instrument(name = "handler::admin_get_order", skip(app_state, admin))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  let order = app_state.engine.get_order(&admin.context(), path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(order))
}

#[instrument(name = "handler::assign_professional", skip(app_state, admin, payload), fields(professional_id = %payload.professional_id))]
pub async fn assign_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<AssignPayload>,
  admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  let assignment = app_state
    .engine
    .assign_professional(&admin.context(), order_id, payload.professional_id)
    .await?;
  if assignment.changed {
    info!("Professional {} assigned to order {}.", payload.professional_id, order_id);
  }
  Ok(HttpResponse::Ok().json(json!({
      "orderId": assignment.order.id,
      "tukangId": assignment.order.professional_id,
      "status": assignment.order.status,
      "changed": assignment.changed,
  })))
}

#[instrument(name = "handler::finish_work", skip(app_state, admin))]
pub async fn finish_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  let outcome = app_state.engine.finish_work(&admin.context(), path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(outcome))
}

#[instrument(name = "handler::admin_cancel", skip(app_state, admin))]
pub async fn cancel_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  let outcome = app_state.engine.cancel_order(&admin.context(), path.into_inner()).await?;
  info!("Order {} cancelled by admin.", outcome.order.id);
  Ok(HttpResponse::Ok().json(outcome))
}

#[instrument(
    name = "handler::broadcast",
    skip(app_state, admin, payload),
    fields(professional_id = %payload.professional_id, orders = payload.order_ids.len())
)]
pub async fn broadcast_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<BroadcastPayload>,
  admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  if payload.order_ids.is_empty() {
    return Err(AppError::Validation("orderIds must not be empty.".to_string()));
  }
  let report = app_state
    .engine
    .broadcast(&admin.context(), &payload.order_ids, payload.professional_id)
    .await?;
  if !report.failed.is_empty() {
    warn!(
      "Broadcast of professional {} left {} order(s) unassigned.",
      payload.professional_id,
      report.failed.len()
    );
  }
  Ok(HttpResponse::Ok().json(report))
}

#[instrument(name = "handler::reconcile_warranties", skip(app_state, admin, query))]
pub async fn reconcile_handler(
  app_state: web::Data<AppState>,
  query: web::Query<ReconcileQuery>,
  admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  let limit = query.limit.unwrap_or(app_state.config.reconcile_batch_size);
  let report = app_state.engine.reconcile_warranties(&admin.context(), limit).await?;
  info!(
    "Warranty reconciliation scanned {} order(s), issued {}.",
    report.scanned,
    report.issued.len()
  );
  Ok(HttpResponse::Ok().json(report))
}
