// storefront/src/pipelines/checkout_pipeline.rs

//! The checkout workflow as a `stagehand` pipeline.
//!
//! `charge_payment` is the commit point: it and every later step run on a
//! detached task, so an order is persisted and the cart cleared even if the
//! caller goes away once the charge has started.

use crate::checkout::{assemble, compute_total, CartSnapshot, CheckoutState};
use crate::errors::CheckoutError;
use crate::pipelines::common_steps::{acquire_user_permit, report_uncleared_cart, report_unpersisted_charge, require_user, RECONCILIATION_TARGET};
use crate::pipelines::contexts::CheckoutCtxData;
use stagehand::{ContextData, FlowError, Pipeline, PipelineControl, Stagehand};
use tracing::{info, warn};
use uuid::Uuid;

pub const CHECKOUT_STEPS: [&str; 7] = [
  "authorize",
  "acquire_user_lock",
  "load_cart_snapshot",
  "price_cart",
  "charge_payment",
  "persist_order",
  "clear_cart",
];

type StepResult = Result<PipelineControl, CheckoutError>;

pub fn build_checkout_pipeline() -> Pipeline<CheckoutCtxData, CheckoutError> {
  let steps: Vec<(&str, bool, Option<stagehand::SkipCondition<CheckoutCtxData>>)> =
    CHECKOUT_STEPS.iter().map(|name| (*name, false, None)).collect();
  let mut p = Pipeline::<CheckoutCtxData, CheckoutError>::new(&steps);

  p.on_root("authorize", authorize);
  p.on_root("acquire_user_lock", acquire_user_lock);
  p.on_root("load_cart_snapshot", load_cart_snapshot);
  p.on_root("price_cart", price_cart);
  p.before_root("charge_payment", record_charge_intent);
  p.on_root("charge_payment", charge_payment);
  p.on_root("persist_order", persist_order);
  p.on_root("clear_cart", clear_cart);

  p.mark_commit_point("charge_payment");
  p
}

pub fn register_checkout_pipeline(registry: &Stagehand<CheckoutError>) {
  registry.register_pipeline(build_checkout_pipeline());
  info!("Checkout pipeline registered.");
}

fn missing(what: &str) -> CheckoutError {
  CheckoutError::from(FlowError::Internal(format!("checkout context is missing {}", what)))
}

fn authorized_user(ctx: &ContextData<CheckoutCtxData>) -> Result<Uuid, CheckoutError> {
  ctx.read().user_id.ok_or_else(|| missing("the authorized user"))
}

async fn authorize(ctx: ContextData<CheckoutCtxData>) -> StepResult {
  let user_id = require_user(&ctx.read().identity)?;
  ctx.update(|c| {
    c.user_id = Some(user_id);
    c.advance(CheckoutState::Authorized)
  })?;
  info!(%user_id, "Checkout authorized.");
  Ok(PipelineControl::Continue)
}

async fn acquire_user_lock(ctx: ContextData<CheckoutCtxData>) -> StepResult {
  let user_id = authorized_user(&ctx)?;
  let locks = ctx.read().backends.locks.clone();
  let permit = acquire_user_permit(locks.as_ref(), user_id)?;
  ctx.write().permit = Some(permit);
  Ok(PipelineControl::Continue)
}

async fn load_cart_snapshot(ctx: ContextData<CheckoutCtxData>) -> StepResult {
  let user_id = authorized_user(&ctx)?;
  let carts = ctx.read().backends.carts.clone();

  let lines = carts.load_by_user(user_id).await?;
  let snapshot = CartSnapshot::from_lines(user_id, lines);
  if !snapshot.skipped_line_ids.is_empty() {
    warn!(
      %user_id,
      skipped = ?snapshot.skipped_line_ids,
      "Skipping cart lines whose catalog item no longer exists."
    );
  }
  if snapshot.is_empty() {
    return Err(CheckoutError::EmptyCart);
  }

  info!(%user_id, lines = snapshot.lines.len(), "Cart snapshot loaded.");
  ctx.update(|c| {
    c.snapshot = Some(snapshot);
    c.advance(CheckoutState::CartLoaded)
  })?;
  Ok(PipelineControl::Continue)
}

async fn price_cart(ctx: ContextData<CheckoutCtxData>) -> StepResult {
  let total = {
    let guard = ctx.read();
    let snapshot = guard.snapshot.as_ref().ok_or_else(|| missing("the cart snapshot"))?;
    compute_total(&snapshot.lines)?
  };
  if total == 0 {
    warn!("Refusing to charge a zero total.");
    return Err(CheckoutError::Validation("cart total must be greater than zero".to_string()));
  }
  ctx.update(|c| {
    c.total = Some(total);
    c.advance(CheckoutState::Priced)
  })?;
  info!(total, "Cart priced.");
  Ok(PipelineControl::Continue)
}

async fn record_charge_intent(ctx: ContextData<CheckoutCtxData>) -> StepResult {
  let guard = ctx.read();
  info!(
    target: RECONCILIATION_TARGET,
    user_id = ?guard.user_id,
    total = ?guard.total,
    currency = %guard.backends.currency,
    "Charging customer."
  );
  Ok(PipelineControl::Continue)
}

async fn charge_payment(ctx: ContextData<CheckoutCtxData>) -> StepResult {
  let user_id = authorized_user(&ctx)?;
  let (total, token, currency, gateway) = {
    let guard = ctx.read();
    (
      guard.total.ok_or_else(|| missing("the cart total"))?,
      guard.payment_token.clone(),
      guard.backends.currency.clone(),
      guard.backends.gateway.clone(),
    )
  };

  let charge = match gateway.charge(total, &currency, &token).await {
    Ok(charge) => charge,
    Err(e) => {
      warn!(%user_id, total, code = %e.code, "Payment failed; nothing was committed.");
      return Err(e.into());
    }
  };

  if charge.amount != total {
    warn!(
      %user_id,
      requested = total,
      charged = charge.amount,
      charge_id = %charge.id,
      "Gateway charged a different amount than requested; the order records the charged amount."
    );
  }
  info!(%user_id, charge_id = %charge.id, amount = charge.amount, "Payment captured.");
  ctx.update(|c| {
    c.charge = Some(charge);
    c.advance(CheckoutState::Charged)
  })?;
  Ok(PipelineControl::Continue)
}

async fn persist_order(ctx: ContextData<CheckoutCtxData>) -> StepResult {
  let user_id = authorized_user(&ctx)?;
  let (assembled, orders) = {
    let guard = ctx.read();
    let snapshot = guard.snapshot.as_ref().ok_or_else(|| missing("the cart snapshot"))?;
    let charge = guard.charge.as_ref().ok_or_else(|| missing("the charge"))?;
    (
      assemble(snapshot, charge, user_id, &guard.backends.currency),
      guard.backends.orders.clone(),
    )
  };

  match orders.create(&assembled.order, &assembled.lines).await {
    Ok(order) => {
      info!(%user_id, order_id = %order.id, total = order.total, "Order persisted.");
      ctx.update(|c| {
        c.order = Some(order);
        c.advance(CheckoutState::Persisted)
      })?;
      Ok(PipelineControl::Continue)
    }
    Err(e) => {
      let cause = e.to_string();
      report_unpersisted_charge(
        user_id,
        &assembled.order.charge_id,
        assembled.order.total,
        &assembled.lines,
        &cause,
      );
      Err(CheckoutError::Persistence {
        message: cause,
        charge_id: assembled.order.charge_id,
      })
    }
  }
}

async fn clear_cart(ctx: ContextData<CheckoutCtxData>) -> StepResult {
  let user_id = authorized_user(&ctx)?;
  let (line_ids, order_id, charge_id, carts) = {
    let guard = ctx.read();
    let snapshot = guard.snapshot.as_ref().ok_or_else(|| missing("the cart snapshot"))?;
    let order = guard.order.as_ref().ok_or_else(|| missing("the persisted order"))?;
    (
      snapshot.line_ids(),
      order.id,
      order.charge_id.clone(),
      guard.backends.carts.clone(),
    )
  };

  // Only the snapshot's lines: anything added during checkout stays.
  match carts.delete_by_ids(&line_ids).await {
    Ok(deleted) => {
      ctx.update(|c| {
        c.cleared_lines = deleted;
        c.permit = None;
        c.advance(CheckoutState::CartCleared)
      })?;
      info!(%user_id, %order_id, deleted, "Cart cleared.");
      Ok(PipelineControl::Continue)
    }
    Err(e) => {
      report_uncleared_cart(user_id, order_id, &charge_id, &line_ids, &e.to_string());
      ctx.write().permit = None;
      // The order stands; the caller still gets it.
      Ok(PipelineControl::Stop)
    }
  }
}
