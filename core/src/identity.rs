// tukangin/src/identity.rs

//! Request-scoped identity, passed explicitly into every service call.

use crate::error::OrderError;
use crate::model::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
  Customer,
  Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
  pub user: Option<UserId>,
  pub role: Role,
}

impl RequestContext {
  pub fn customer(user: UserId) -> Self {
    Self {
      user: Some(user),
      role: Role::Customer,
    }
  }

  pub fn anonymous() -> Self {
    Self {
      user: None,
      role: Role::Customer,
    }
  }

  pub fn admin(user: Option<UserId>) -> Self {
    Self { user, role: Role::Admin }
  }

  pub fn require_user(&self) -> Result<UserId, OrderError> {
    self.user.ok_or(OrderError::Unauthenticated)
  }

  pub fn require_admin(&self) -> Result<(), OrderError> {
    match self.role {
      Role::Admin => Ok(()),
      Role::Customer => Err(OrderError::AdminRequired),
    }
  }
}
