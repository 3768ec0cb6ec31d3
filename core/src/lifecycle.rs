// tukangin/src/lifecycle.rs

//! The order state machine.
//!
//! `TRANSITIONS` is the only place that decides which status changes are
//! legal. Services ask it for the next status, and derive the store
//! precondition for a write from the same table, so a status check and the
//! conditional update can never disagree.

use crate::error::OrderError;
use crate::model::OrderStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
  DepositPaid,
  ProfessionalAssigned,
  WorkFinished,
  Completed,
  Cancelled,
}

impl LifecycleEvent {
  pub fn as_str(&self) -> &'static str {
    match self {
      LifecycleEvent::DepositPaid => "deposit_paid",
      LifecycleEvent::ProfessionalAssigned => "professional_assigned",
      LifecycleEvent::WorkFinished => "work_finished",
      LifecycleEvent::Completed => "completed",
      LifecycleEvent::Cancelled => "cancelled",
    }
  }

  /// The status this event leads to wherever it is legal.
  pub fn target(&self) -> OrderStatus {
    match self {
      LifecycleEvent::DepositPaid | LifecycleEvent::ProfessionalAssigned => OrderStatus::Processing,
      LifecycleEvent::WorkFinished => OrderStatus::Warranty,
      LifecycleEvent::Completed => OrderStatus::Completed,
      LifecycleEvent::Cancelled => OrderStatus::Cancelled,
    }
  }
}

impl fmt::Display for LifecycleEvent {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

use self::LifecycleEvent as E;
use crate::model::OrderStatus as S;

/// (from, event, to). Anything absent is illegal.
pub const TRANSITIONS: &[(OrderStatus, LifecycleEvent, OrderStatus)] = &[
  (S::Pending, E::DepositPaid, S::Processing),
  (S::Pending, E::ProfessionalAssigned, S::Processing),
  (S::Processing, E::ProfessionalAssigned, S::Processing),
  (S::Processing, E::WorkFinished, S::Warranty),
  (S::Processing, E::Completed, S::Completed),
  (S::Warranty, E::Completed, S::Completed),
  (S::Pending, E::Cancelled, S::Cancelled),
  (S::Processing, E::Cancelled, S::Cancelled),
];

/// Status an order moves to when `event` is applied in status `from`.
pub fn next_status(from: OrderStatus, event: LifecycleEvent) -> Result<OrderStatus, OrderError> {
  TRANSITIONS
    .iter()
    .find(|(source, candidate, _)| *source == from && *candidate == event)
    .map(|(_, _, to)| *to)
    .ok_or(OrderError::InvalidTransition {
      from,
      to: event.target(),
    })
}

/// Every status from which `event` is legal. Used as the write precondition.
pub fn sources(event: LifecycleEvent) -> Vec<OrderStatus> {
  TRANSITIONS
    .iter()
    .filter(|(_, candidate, _)| *candidate == event)
    .map(|(source, _, _)| *source)
    .collect()
}

/// Maps a status requested through the customer status endpoint to the event
/// that would produce it. Statuses reached only through payment or admin
/// actions have no customer event.
pub fn customer_event_for(target: OrderStatus) -> Option<LifecycleEvent> {
  match target {
    S::Completed => Some(E::Completed),
    S::Cancelled => Some(E::Cancelled),
    S::Pending | S::Processing | S::Warranty => None,
  }
}
