// tests/context_management_tests.rs
mod common;

use common::*;
use serial_test::serial;
use stagehand::{ContextData, FlowError, Pipeline, PipelineControl};
use std::sync::Arc;

#[tokio::test]
#[serial]
async fn test_context_data_is_shared_and_modified() {
  setup_tracing();
  let mut pipeline =
    Pipeline::<TestContext, TestError>::new(&[("step1_modify", false, None), ("step2_read_modify", false, None)]);

  pipeline.on_root("step1_modify", |ctx: ContextData<TestContext>| {
    Box::pin(async move {
      ctx.update(|c| {
        c.counter = 10;
        c.message = "SetByStep1".to_string();
      });
      Ok::<PipelineControl, FlowError>(PipelineControl::Continue)
    })
  });

  pipeline.on_root("step2_read_modify", |ctx: ContextData<TestContext>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      assert_eq!(guard.counter, 10);
      guard.counter += 5;
      guard.message.push_str("_ThenStep2");
      Ok::<PipelineControl, FlowError>(PipelineControl::Continue)
    })
  });
  let pipeline = Arc::new(pipeline);

  let ctx = ContextData::new(TestContext::default());
  pipeline.run(ctx.clone()).await.unwrap();

  let snapshot = ctx.snapshot();
  assert_eq!(snapshot.counter, 15);
  assert_eq!(snapshot.message, "SetByStep1_ThenStep2");
}

#[tokio::test]
#[serial]
async fn test_context_data_clone_shares_data() {
  setup_tracing();
  let original = ContextData::new(TestContext {
    counter: 1,
    ..Default::default()
  });
  let cloned = original.clone();
  assert_eq!(original.handle_count(), 2);

  original.update(|c| c.counter = 5);
  assert_eq!(cloned.read().counter, 5);

  cloned.update(|c| c.counter = 10);
  assert_eq!(*original.map_read(|c| &c.counter), 10);
}

#[tokio::test]
#[serial]
async fn test_snapshot_is_detached_from_later_writes() {
  setup_tracing();
  let ctx = ContextData::new(TestContext::default());
  let before = ctx.snapshot();
  ctx.update(|c| c.steps_executed.push("later".to_string()));
  assert!(before.steps_executed.is_empty());
  assert_eq!(ctx.read().steps_executed.len(), 1);
}
