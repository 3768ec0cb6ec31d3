// tukangin/src/flow/execution.rs

//! `Flow::run`: walks the steps in order and runs each phase's handlers.

use super::control::{DegradedStep, FlowOutcome, FlowRun, StepControl};
use super::definition::{Flow, Phase};
use super::step::StepMode;
use super::FlowData;
use crate::error::FlowError;
use tracing::{event, instrument, span, Instrument, Level};

/// How a single step ended.
enum StepEnd<Err> {
  Continue,
  Stop,
  Failed(Err),
}

impl<T, Err> Flow<T, Err>
where
  T: Send + Sync + 'static,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Runs the flow against `ctx`.
  ///
  /// A required step's error aborts the run and is returned. A best-effort
  /// step's error is logged and recorded in `FlowRun::degraded`; its remaining
  /// phases are skipped and the next step runs.
  #[instrument(
    name = "Flow::run",
    skip_all,
    fields(flow = self.name, num_steps = self.steps.len()),
    err(Display)
  )]
  pub async fn run(&self, ctx: FlowData<T>) -> Result<FlowRun, Err> {
    event!(Level::DEBUG, "Flow execution starting.");
    let mut degraded = Vec::new();

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name;

      if let Some(skip) = &step_def.skip_if {
        if skip(&ctx) {
          event!(Level::DEBUG, step = step_name, "Step skipped by its skip condition.");
          continue;
        }
      }

      let has_handlers = [Phase::Before, Phase::On, Phase::After]
        .iter()
        .any(|phase| !self.handlers(*phase, step_name).is_empty());
      if !has_handlers {
        match step_def.mode {
          StepMode::BestEffort => {
            event!(Level::DEBUG, step = step_name, "Best-effort step has no handlers, skipping.");
            continue;
          }
          StepMode::Required => {
            event!(Level::ERROR, step = step_name, "Required step has no handlers.");
            return Err(Err::from(FlowError::HandlerMissing {
              step_name: step_name.to_string(),
            }));
          }
        }
      }

      let step_span = span!(Level::INFO, "flow_step", step = step_name, step_index = step_idx);
      let end = self.run_step(step_name, &ctx).instrument(step_span).await;

      match end {
        StepEnd::Continue => {}
        StepEnd::Stop => {
          event!(Level::INFO, step = step_name, "Flow stopped by a handler.");
          return Ok(FlowRun {
            outcome: FlowOutcome::Stopped,
            degraded,
          });
        }
        StepEnd::Failed(e) if step_def.mode == StepMode::BestEffort => {
          event!(Level::WARN, step = step_name, error = %e, "Best-effort step failed; continuing.");
          degraded.push(DegradedStep {
            step_name: step_name.to_string(),
            message: e.to_string(),
          });
        }
        StepEnd::Failed(e) => {
          event!(Level::ERROR, step = step_name, error = %e, "Step failed.");
          return Err(e);
        }
      }
    }

    event!(Level::DEBUG, degraded = degraded.len(), "Flow execution completed.");
    Ok(FlowRun {
      outcome: FlowOutcome::Completed,
      degraded,
    })
  }

  async fn run_step(&self, step_name: &str, ctx: &FlowData<T>) -> StepEnd<Err> {
    for phase in [Phase::Before, Phase::On, Phase::After] {
      for handler in self.handlers(phase, step_name) {
        match handler(ctx.clone()).await {
          Ok(StepControl::Continue) => {}
          Ok(StepControl::Stop) => return StepEnd::Stop,
          Err(e) => return StepEnd::Failed(e),
        }
      }
    }
    StepEnd::Continue
  }
}
