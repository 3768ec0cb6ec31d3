// tukangin_server/src/web/handlers/review_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use tukangin::services::SubmitReview;

#[instrument(
    name = "handler::submit_review",
    skip(app_state, payload, auth_user),
    fields(user_id = %auth_user.user_id, order_id = %payload.order_id, rating = payload.rating)
)]
pub async fn submit_review_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<SubmitReview>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let review = app_state
    .engine
    .submit_review(&auth_user.context(), payload.into_inner())
    .await?;
  info!("Review {} recorded for order {}.", review.id, review.order_id);
  Ok(HttpResponse::Created().json(json!({
      "reviewId": review.id,
      "review": review,
  })))
}
