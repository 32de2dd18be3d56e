// stagehand/src/lib.rs

//! Stagehand: an async, type-keyed, staged workflow engine.
//!
//! A pipeline is an ordered list of named steps operating on shared
//! `ContextData<T>`:
//!  - each step has `before` / `on` / `after` hooks,
//!  - handlers can stop the run early or fail it with the pipeline's error type,
//!  - steps can be optional or skipped by a predicate,
//!  - a step can be marked as a *commit point*: from there on the run is
//!    detached from the caller and always finishes,
//!  - the `Stagehand` registry dispatches a context to the pipeline
//!    registered for its type.

pub mod core;
pub mod error;
pub mod pipeline;
pub mod registry;

pub use crate::core::context::Handler;
pub use crate::core::context_data::ContextData;
pub use crate::core::control::{PipelineControl, PipelineResult};
pub use crate::core::step::{SkipCondition, StepDef};

pub use crate::pipeline::definition::Pipeline;

pub use crate::error::{FlowError, FlowResult};

pub use crate::registry::Stagehand;
