// tukangin_server/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;
use tukangin::{ErrorKind, OrderError};

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Migration Error: {0}")]
  Migrate(#[from] sqlx::migrate::MigrateError),

  #[error(transparent)]
  Order(#[from] OrderError),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<sqlx::Error>() {
      Ok(sqlx_err) => AppError::Sqlx(sqlx_err),
      Err(other) => AppError::Internal(other.to_string()),
    }
  }
}

impl AppError {
  /// Stable machine-readable code for the response body.
  pub fn reason(&self) -> &'static str {
    match self {
      AppError::Validation(_) => "validation",
      AppError::Auth(_) => "unauthenticated",
      AppError::Order(e) => e.reason(),
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Migrate(_) | AppError::Internal(_) => "internal",
    }
  }
}

fn order_status_code(err: &OrderError) -> StatusCode {
  match err {
    OrderError::AdminRequired => StatusCode::FORBIDDEN,
    OrderError::InvalidTransition { .. } | OrderError::DepositRequired { .. } => StatusCode::BAD_REQUEST,
    _ => match err.kind() {
      ErrorKind::Authentication => StatusCode::UNAUTHORIZED,
      ErrorKind::Authorization | ErrorKind::NotFound => StatusCode::NOT_FOUND,
      ErrorKind::Validation => StatusCode::BAD_REQUEST,
      ErrorKind::StateConflict => StatusCode::CONFLICT,
      ErrorKind::Persistence => StatusCode::INTERNAL_SERVER_ERROR,
    },
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Order(e) => order_status_code(e),
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Migrate(_) | AppError::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    let message = if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
      "An internal error occurred".to_string()
    } else {
      tracing::warn!(application_error = %self, "Responding with error");
      self.to_string()
    };
    HttpResponse::build(status).json(json!({"error": message, "reason": self.reason()}))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
