// stagehand/src/error.rs

//! Framework-level failures raised by the engine itself.
//!
//! Pipelines are generic over their own handler error type `Err`; the engine
//! only requires `Err: From<FlowError>` so that configuration faults and
//! detached-task failures can be reported through the same channel.

use anyhow::Error as AnyhowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlowError {
  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("Type mismatch during context dispatch (expected {expected_type}, at: '{step_name}')")]
  TypeMismatch { step_name: String, expected_type: String },

  #[error("Error in user-provided handler or external operation. Source: {source}")]
  HandlerError {
    #[source]
    source: AnyhowError,
  },

  #[error("Configuration error for '{step_name}': {message}")]
  ConfigurationError { step_name: String, message: String },

  /// The task running the steps after a commit point did not finish normally
  /// (it panicked or its runtime was shut down).
  #[error("Detached tail starting at step '{step_name}' did not complete: {message}")]
  Detached { step_name: String, message: String },

  #[error("Internal stagehand error: {0}")]
  Internal(String),
}

impl From<AnyhowError> for FlowError {
  fn from(err: AnyhowError) -> Self {
    // An anyhow error that already carries a FlowError keeps its identity.
    match err.downcast::<FlowError>() {
      Ok(flow_err) => flow_err,
      Err(source) => FlowError::HandlerError { source },
    }
  }
}

pub type FlowResult<T, E = FlowError> = std::result::Result<T, E>;
