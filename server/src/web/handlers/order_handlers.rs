// tukangin_server/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use tukangin::model::OrderStatus;
use tukangin::services::{CreateOrderRequest, DepositRequest};

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct QuotePayload {
  pub subtotal: i64,
  #[serde(default)]
  pub voucher_code: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct StatusPayload {
  pub status: String,
}

#[instrument(name = "handler::quote", skip(app_state, payload, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn quote_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<QuotePayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let quote = app_state
    .engine
    .quote(&auth_user.context(), payload.subtotal, payload.voucher_code.as_deref())
    .await?;
  Ok(HttpResponse::Ok().json(quote))
}

#[instrument(name = "handler::create_order", skip(app_state, payload, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<CreateOrderRequest>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let order = app_state
    .engine
    .create_order(&auth_user.context(), payload.into_inner())
    .await?;
  info!("Order {} created for user {} (total {}).", order.id, auth_user.user_id, order.total);
  Ok(HttpResponse::Created().json(order))
}

#[instrument(name = "handler::get_order", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let order = app_state.engine.get_order(&auth_user.context(), path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(order))
}

#[instrument(
    name = "handler::pay_deposit",
    skip(app_state, payload, auth_user),
    fields(user_id = %auth_user.user_id, amount = payload.amount)
)]
pub async fn pay_deposit_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<DepositRequest>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  let receipt = app_state
    .engine
    .pay_deposit(&auth_user.context(), order_id, payload.into_inner())
    .await?;
  info!("Deposit of {} recorded for order {}.", receipt.amount, order_id);
  Ok(HttpResponse::Ok().json(receipt))
}

#[instrument(
    name = "handler::change_status",
    skip(app_state, payload, auth_user),
    fields(user_id = %auth_user.user_id, target = %payload.status)
)]
pub async fn change_status_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  payload: web::Json<StatusPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let target: OrderStatus = payload.status.parse().map_err(AppError::Validation)?;
  let outcome = app_state
    .engine
    .change_status(&auth_user.context(), path.into_inner(), target)
    .await?;
  info!("Order {} moved to {}.", outcome.order.id, outcome.order.status);
  Ok(HttpResponse::Ok().json(outcome))
}
