// stagehand/src/core/context.rs

//! The boxed handler type stored by pipelines.

use crate::core::context_data::ContextData;
use crate::core::control::PipelineControl;
use std::future::Future;
use std::pin::Pin;

/// A pipeline step handler.
///
/// A handler receives its own clone of the run's `ContextData<TData>` and
/// resolves to a `PipelineControl` or the pipeline's error type.
///
/// Handlers must:
/// 1. take `.read()` / `.write()` guards only in short synchronous blocks,
/// 2. drop every guard BEFORE any `.await`,
/// 3. return a `Send` future, since steps after a commit point run on a
///    spawned task.
pub type Handler<TData, Err> = Box<
  dyn Fn(ContextData<TData>) -> Pin<Box<dyn Future<Output = Result<PipelineControl, Err>> + Send>>
    + Send
    + Sync,
>;
