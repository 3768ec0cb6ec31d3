// tukangin/examples/best_effort_flow.rs

use tracing::info;
use tukangin::{Flow, FlowData, FlowError, StepControl, StepMode};

#[derive(Clone, Debug, Default)]
struct NotifyContext {
  recipients: Vec<String>,
  delivered: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
enum NotifyError {
  #[error("Flow: {0}")]
  Flow(#[from] FlowError),

  #[error("Gateway rejected message: {0}")]
  Gateway(String),
}

async fn collect_recipients(ctx: FlowData<NotifyContext>) -> Result<StepControl, NotifyError> {
  let mut data = ctx.write();
  data.recipients = vec!["customer".to_string(), "professional".to_string()];
  info!("Collected {} recipients.", data.recipients.len());
  Ok(StepControl::Continue)
}

async fn send_sms(_ctx: FlowData<NotifyContext>) -> Result<StepControl, NotifyError> {
  Err(NotifyError::Gateway("sms quota exhausted".to_string()))
}

async fn send_push(ctx: FlowData<NotifyContext>) -> Result<StepControl, NotifyError> {
  let mut data = ctx.write();
  let recipients = data.recipients.clone();
  data.delivered.extend(recipients);
  Ok(StepControl::Continue)
}

#[tokio::main]
async fn main() -> Result<(), NotifyError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Best-Effort Flow Example ---");

  // The SMS step may fail without aborting the run; the push step still runs.
  let mut flow = Flow::<NotifyContext, NotifyError>::new(
    "notify_completion",
    &[
      ("collect_recipients", StepMode::Required),
      ("send_sms", StepMode::BestEffort),
      ("send_push", StepMode::Required),
    ],
  );
  flow.on("collect_recipients", collect_recipients);
  flow.on("send_sms", send_sms);
  flow.on("send_push", send_push);

  let ctx = FlowData::new(NotifyContext::default());
  let run = flow.run(ctx.clone()).await?;

  info!("Outcome: {:?}", run.outcome);
  for degraded in &run.degraded {
    info!("Degraded step '{}': {}", degraded.step_name, degraded.message);
  }
  info!("Delivered to: {:?}", ctx.read().delivered);

  info!("--- Best-Effort Flow Example Finished ---");
  Ok(())
}
