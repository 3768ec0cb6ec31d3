// tukangin/src/flow/step.rs

use super::FlowData;
use std::sync::Arc;

pub type SkipCondition<T> = Arc<dyn Fn(&FlowData<T>) -> bool + Send + Sync + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMode {
  /// Must have a handler; a handler error aborts the flow.
  Required,
  /// A handler error is logged and recorded, and the flow carries on.
  BestEffort,
}

#[derive(Clone)]
pub struct StepDef<T: Send + Sync + 'static> {
  pub name: &'static str,
  pub mode: StepMode,
  pub skip_if: Option<SkipCondition<T>>,
}

impl<T: Send + Sync + 'static> std::fmt::Debug for StepDef<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StepDef")
      .field("name", &self.name)
      .field("mode", &self.mode)
      .field("skip_if_present", &self.skip_if.is_some())
      .finish()
  }
}
