// stagehand/src/pipeline/execution.rs

//! `Pipeline::run`: sequential step execution, with the tail after a commit
//! point handed to a spawned task.

use crate::core::context_data::ContextData;
use crate::core::control::{PipelineControl, PipelineResult};
use crate::core::step::StepDef;
use crate::error::FlowError;
use crate::pipeline::definition::Pipeline;
use std::ops::Range;
use std::sync::Arc;
use tracing::{event, instrument, span, Instrument, Level, Span};

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Executes the pipeline against `ctx_data`.
  ///
  /// Steps before the first commit point run on the caller's task, so
  /// dropping the returned future cancels them. From the commit point on, the
  /// remaining steps run on a task spawned with `tokio::spawn`, which owns
  /// clones of the pipeline and the context; dropping the caller's future
  /// then only stops the caller from observing the result.
  ///
  /// Must be called from within a tokio runtime when the pipeline has a
  /// commit point.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(
      context_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn run(self: &Arc<Self>, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    event!(Level::DEBUG, "Pipeline execution starting.");

    let commit_idx = self.commit_point_index();
    let attached_end = commit_idx.unwrap_or(self.steps.len());

    if self.run_steps(&ctx_data, 0..attached_end).await? == PipelineResult::Stopped {
      return Ok(PipelineResult::Stopped);
    }

    let result = match commit_idx {
      None => PipelineResult::Completed,
      Some(idx) => self.run_detached_tail(ctx_data, idx).await?,
    };

    event!(Level::DEBUG, ?result, "Pipeline execution finished.");
    Ok(result)
  }

  async fn run_detached_tail(self: &Arc<Self>, ctx_data: ContextData<TData>, from_idx: usize) -> Result<PipelineResult, Err> {
    let step_name = self.steps[from_idx].name.clone();
    event!(Level::INFO, commit_step = %step_name, "Commit point reached; remaining steps run detached.");

    let this = Arc::clone(self);
    let total = self.steps.len();
    let tail = async move { this.run_steps(&ctx_data, from_idx..total).await }.instrument(Span::current());

    match tokio::spawn(tail).await {
      Ok(outcome) => outcome,
      Err(join_err) => {
        event!(Level::ERROR, commit_step = %step_name, error = %join_err, "Detached tail aborted.");
        Err(Err::from(FlowError::Detached {
          step_name,
          message: join_err.to_string(),
        }))
      }
    }
  }

  async fn run_steps(&self, ctx_data: &ContextData<TData>, range: Range<usize>) -> Result<PipelineResult, Err> {
    for step_idx in range {
      let step_def = &self.steps[step_idx];
      let step_span = span!(
        Level::INFO,
        "pipeline_step",
        step_name = %step_def.name,
        step_index = step_idx,
        optional = step_def.optional
      );
      if self.run_step(step_def, ctx_data).instrument(step_span).await? == PipelineControl::Stop {
        return Ok(PipelineResult::Stopped);
      }
    }
    Ok(PipelineResult::Completed)
  }

  async fn run_step(&self, step_def: &StepDef<TData>, ctx_data: &ContextData<TData>) -> Result<PipelineControl, Err> {
    if let Some(skip_cond_fn) = &step_def.skip_if {
      if skip_cond_fn(ctx_data.clone()) {
        event!(Level::INFO, "Step skipped due to 'skip_if' condition.");
        return Ok(PipelineControl::Continue);
      }
    }

    let name = step_def.name.as_str();
    let phases = [
      ("before", self.before.get(name)),
      ("on", self.on.get(name)),
      ("after", self.after.get(name)),
    ];

    if !phases.iter().any(|(_, handlers)| handlers.map_or(false, |v| !v.is_empty())) {
      if step_def.optional {
        event!(Level::DEBUG, "Optional step has no handlers, skipping.");
        return Ok(PipelineControl::Continue);
      }
      event!(Level::ERROR, "Non-optional step has no handlers.");
      return Err(Err::from(FlowError::HandlerMissing {
        step_name: step_def.name.clone(),
      }));
    }

    for (phase, handlers) in phases {
      let Some(handlers) = handlers else { continue };
      for (handler_idx, handler_fn) in handlers.iter().enumerate() {
        let hook_span = span!(Level::DEBUG, "hook", phase = phase, handler_index = handler_idx);
        match handler_fn(ctx_data.clone()).instrument(hook_span).await {
          Ok(PipelineControl::Continue) => {}
          Ok(PipelineControl::Stop) => {
            event!(Level::INFO, phase = phase, "Pipeline stopped by a handler.");
            return Ok(PipelineControl::Stop);
          }
          Err(e) => {
            event!(Level::ERROR, phase = phase, error = %e, "Handler failed.");
            return Err(e);
          }
        }
      }
    }

    event!(Level::DEBUG, "Step finished.");
    Ok(PipelineControl::Continue)
  }
}
