// tukangin_server/src/web/handlers/warranty_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use tukangin::services::ClaimRequest;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct WarrantyQuery {
  pub order_id: Option<Uuid>,
}

#[instrument(name = "handler::get_warranty", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn get_warranty_handler(
  app_state: web::Data<AppState>,
  query: web::Query<WarrantyQuery>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let order_id = query
    .order_id
    .ok_or_else(|| AppError::Validation("orderId query parameter is required.".to_string()))?;
  let view = app_state.engine.get_warranty(&auth_user.context(), order_id).await?;
  Ok(HttpResponse::Ok().json(view))
}

#[instrument(name = "handler::claim_warranty", skip(app_state, payload, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn claim_warranty_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<ClaimRequest>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let warranty_id = path.into_inner();
  let receipt = app_state
    .engine
    .claim_warranty(&auth_user.context(), warranty_id, payload.into_inner())
    .await?;
  info!("Claim submitted on warranty {} by user {}.", warranty_id, auth_user.user_id);
  Ok(HttpResponse::Ok().json(receipt))
}
