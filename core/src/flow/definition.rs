// tukangin/src/flow/definition.rs

//! The `Flow<T, Err>` type: an ordered list of named steps and the handlers
//! registered for each of them.

use super::step::{SkipCondition, StepDef, StepMode};
use super::{FlowData, StepControl};
use crate::error::FlowError;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

/// A boxed async step handler over `FlowData<T>`.
pub type Handler<T, Err> =
  Box<dyn Fn(FlowData<T>) -> Pin<Box<dyn Future<Output = Result<StepControl, Err>> + Send>> + Send + Sync>;

/// Which phase of a step a handler is attached to. Phases run before, on, after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
  Before,
  On,
  After,
}

pub struct Flow<T, Err>
where
  T: Send + Sync + 'static,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub(crate) name: &'static str,
  pub(crate) steps: Vec<StepDef<T>>,
  pub(crate) before: HashMap<&'static str, Vec<Handler<T, Err>>>,
  pub(crate) on: HashMap<&'static str, Vec<Handler<T, Err>>>,
  pub(crate) after: HashMap<&'static str, Vec<Handler<T, Err>>>,
}

impl<T, Err> Flow<T, Err>
where
  T: Send + Sync + 'static,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub fn new(name: &'static str, steps: &[(&'static str, StepMode)]) -> Self {
    Self {
      name,
      steps: steps
        .iter()
        .map(|(step_name, mode)| StepDef {
          name: *step_name,
          mode: *mode,
          skip_if: None,
        })
        .collect(),
      before: HashMap::new(),
      on: HashMap::new(),
      after: HashMap::new(),
    }
  }

  pub fn step_names(&self) -> Vec<&'static str> {
    self.steps.iter().map(|s| s.name).collect()
  }

  /// Looks up a declared step. Unknown names are a wiring mistake, hence the panic.
  fn step_mut(&mut self, step_name: &str) -> &mut StepDef<T> {
    let flow_name = self.name;
    self
      .steps
      .iter_mut()
      .find(|s| s.name == step_name)
      .unwrap_or_else(|| panic!("Flow '{}' has no step named '{}'", flow_name, step_name))
  }

  pub fn skip_if(&mut self, step_name: &str, condition: impl Fn(&FlowData<T>) -> bool + Send + Sync + 'static) {
    let condition: SkipCondition<T> = std::sync::Arc::new(condition);
    self.step_mut(step_name).skip_if = Some(condition);
  }

  pub fn before<F>(&mut self, step_name: &str, handler_fn: impl Fn(FlowData<T>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<StepControl, Err>> + Send + 'static,
  {
    self.register(Phase::Before, step_name, handler_fn);
  }

  pub fn on<F>(&mut self, step_name: &str, handler_fn: impl Fn(FlowData<T>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<StepControl, Err>> + Send + 'static,
  {
    self.register(Phase::On, step_name, handler_fn);
  }

  pub fn after<F>(&mut self, step_name: &str, handler_fn: impl Fn(FlowData<T>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<StepControl, Err>> + Send + 'static,
  {
    self.register(Phase::After, step_name, handler_fn);
  }

  fn register<F>(&mut self, phase: Phase, step_name: &str, handler_fn: impl Fn(FlowData<T>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<StepControl, Err>> + Send + 'static,
  {
    let key = self.step_mut(step_name).name;
    let handler: Handler<T, Err> = Box::new(move |ctx| {
      let fut = handler_fn(ctx);
      Box::pin(fut) as Pin<Box<dyn Future<Output = Result<StepControl, Err>> + Send>>
    });
    let table = match phase {
      Phase::Before => &mut self.before,
      Phase::On => &mut self.on,
      Phase::After => &mut self.after,
    };
    table.entry(key).or_default().push(handler);
  }

  pub(crate) fn handlers(&self, phase: Phase, step_name: &str) -> &[Handler<T, Err>] {
    let table = match phase {
      Phase::Before => &self.before,
      Phase::On => &self.on,
      Phase::After => &self.after,
    };
    table.get(step_name).map(Vec::as_slice).unwrap_or(&[])
  }
}
