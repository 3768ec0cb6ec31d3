// tukangin/src/flow/mod.rs

//! Step flows: each mutating order operation runs as a named sequence of
//! steps over shared per-request data.

pub mod context;
pub mod control;
pub mod definition;
pub mod execution;
pub mod step;

pub use context::FlowData;
pub use control::{DegradedStep, FlowOutcome, FlowRun, StepControl};
pub use definition::{Flow, Handler};
pub use step::{SkipCondition, StepDef, StepMode};
