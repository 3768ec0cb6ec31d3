// tukangin/src/lib.rs

//! Tukangin: the order lifecycle and transaction engine behind a home-services
//! marketplace.
//!
//! The engine covers:
//!  - Pricing an order and validating its voucher.
//!  - A single state machine for order status (PENDING, PROCESSING, WARRANTY,
//!    COMPLETED, CANCELLED), enforced by conditional store writes.
//!  - Deposit ("DP") payment, professional assignment, completion.
//!  - Warranty issuance on completion, claims, and reconciliation of
//!    completions left without a warranty.
//!  - One review per completed order.
//!
//! Multi-step operations run as `Flow`s: named steps with before/on/after
//! handlers over a shared `FlowData` context.

pub mod config;
pub mod engine;
pub mod error;
pub mod flow;
pub mod identity;
pub mod lifecycle;
pub mod model;
pub mod pricing;
pub mod services;
pub mod store;

// --- Re-exports for the Public API ---

pub use crate::config::LifecycleConfig;
pub use crate::engine::OrderEngine;
pub use crate::error::{ErrorKind, FlowError, OrderError, OrderResult, StoreError, StoreResult};
pub use crate::flow::{Flow, FlowData, FlowOutcome, FlowRun, StepControl, StepMode};
pub use crate::identity::{RequestContext, Role};
pub use crate::lifecycle::LifecycleEvent;
pub use crate::pricing::Quote;
pub use crate::store::{MemoryStore, Store};

/*
    Request walk-through:
    1. The boundary builds a `RequestContext` (customer id, or admin).
    2. It calls one `OrderEngine` operation, e.g. `pay_deposit`.
    3. The service runs its flow: load and authorize, validate, then one
       conditional `update_order` whose precondition comes from the lifecycle table.
    4. A lost race surfaces as `PreconditionFailed` (or a more specific error)
       and the row is left as the winner wrote it.
*/
