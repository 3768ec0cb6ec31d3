// tukangin/src/flow/control.rs

//! Signals for steering a flow and the report of a finished run.

/// Returned by a handler: keep going, or halt the flow here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepControl {
  Continue,
  Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
  /// Every step that was not skipped ran.
  Completed,
  /// A handler returned `StepControl::Stop`.
  Stopped,
}

/// A best-effort step whose handler failed without aborting the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegradedStep {
  pub step_name: String,
  pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowRun {
  pub outcome: FlowOutcome,
  pub degraded: Vec<DegradedStep>,
}

impl FlowRun {
  pub fn is_degraded(&self) -> bool {
    !self.degraded.is_empty()
  }
}
