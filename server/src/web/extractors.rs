// tukangin_server/src/web/extractors.rs

//! Request identity. Customers identify with `X-User-ID`; admin routes
//! additionally require `X-Admin-Key` matching the configured key.

use crate::errors::AppError;
use crate::state::AppState;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::warn;
use tukangin::{OrderError, RequestContext};
use uuid::Uuid;

pub const USER_ID_HEADER: &str = "X-User-ID";
pub const ADMIN_KEY_HEADER: &str = "X-Admin-Key";

fn user_id_from(req: &HttpRequest) -> Option<Uuid> {
  req
    .headers()
    .get(USER_ID_HEADER)
    .and_then(|value| value.to_str().ok())
    .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
}

#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
  pub user_id: Uuid,
}

impl AuthenticatedUser {
  pub fn context(&self) -> RequestContext {
    RequestContext::customer(self.user_id)
  }
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    match user_id_from(req) {
      Some(user_id) => ready(Ok(AuthenticatedUser { user_id })),
      None => {
        warn!("AuthenticatedUser extractor: Missing or invalid X-User-ID header.");
        ready(Err(AppError::Auth(
          "User authentication required. Missing or invalid X-User-ID header.".to_string(),
        )))
      }
    }
  }
}

/// An operator holding the admin key. `X-User-ID` is optional and only
/// recorded for tracing.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser {
  pub user_id: Option<Uuid>,
}

impl AdminUser {
  pub fn context(&self) -> RequestContext {
    RequestContext::admin(self.user_id)
  }
}

impl FromRequest for AdminUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    let Some(app_state) = req.app_data::<web::Data<AppState>>() else {
      return ready(Err(AppError::Internal("Application state is not configured.".to_string())));
    };

    let presented = req.headers().get(ADMIN_KEY_HEADER).and_then(|value| value.to_str().ok());
    let result = match presented {
      None => {
        warn!("AdminUser extractor: Missing X-Admin-Key header.");
        Err(AppError::Auth("Admin key required. Missing X-Admin-Key header.".to_string()))
      }
      Some(key) if key == app_state.config.admin_api_key => Ok(AdminUser {
        user_id: user_id_from(req),
      }),
      Some(_) => {
        warn!("AdminUser extractor: X-Admin-Key does not match.");
        Err(AppError::Order(OrderError::AdminRequired))
      }
    };
    ready(result)
  }
}
