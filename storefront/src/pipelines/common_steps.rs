// storefront/src/pipelines/common_steps.rs

//! Helpers shared by the storefront pipelines.

use crate::checkout::{CheckoutLocks, CheckoutPermit};
use crate::errors::CheckoutError;
use crate::models::{Identity, NewOrderLine};
use crate::services::ChargeResult;
use tracing::{error, warn};
use uuid::Uuid;

/// Tracing target for events that need manual follow-up because money has
/// moved but local state did not follow.
pub const RECONCILIATION_TARGET: &str = "reconciliation";

/// The caller's user id, or `Unauthenticated`. Runs before any store read.
pub fn require_user(identity: &Identity) -> Result<Uuid, CheckoutError> {
  identity.user_id().ok_or_else(|| {
    warn!("Rejecting anonymous caller.");
    CheckoutError::Unauthenticated
  })
}

/// Takes the user's permit without waiting. Fails with
/// `ConcurrencyConflict` while a checkout or cart edit for the same user is
/// in progress.
pub fn acquire_user_permit(locks: &dyn CheckoutLocks, user_id: Uuid) -> Result<CheckoutPermit, CheckoutError> {
  locks
    .try_acquire(user_id)
    .ok_or(CheckoutError::ConcurrencyConflict { user_id })
}

/// Logs a charged-but-not-persisted checkout with everything needed to
/// settle it by hand.
pub fn report_unpersisted_charge(user_id: Uuid, charge_id: &str, total: i64, lines: &[NewOrderLine], cause: &str) {
  let attempted: Vec<(&str, i64, i32)> = lines.iter().map(|l| (l.title.as_str(), l.price, l.quantity)).collect();
  error!(
    target: RECONCILIATION_TARGET,
    %user_id,
    charge_id,
    total,
    lines = ?attempted,
    cause,
    "Charge succeeded but the order was not persisted. No refund was issued."
  );
}

/// Logs an order whose cart lines could not be cleared afterwards.
pub fn report_uncleared_cart(user_id: Uuid, order_id: Uuid, charge_id: &str, line_ids: &[Uuid], cause: &str) {
  error!(
    target: RECONCILIATION_TARGET,
    %user_id,
    %order_id,
    charge_id,
    line_ids = ?line_ids,
    cause,
    "Order persisted but its cart lines were not cleared."
  );
}

/// Logs a checkout whose post-charge steps died without reporting back,
/// e.g. a panic in the store.
pub fn report_interrupted_checkout(user_id: Option<Uuid>, charge: &ChargeResult, order_id: Option<Uuid>, cause: &str) {
  error!(
    target: RECONCILIATION_TARGET,
    user_id = ?user_id,
    charge_id = %charge.id,
    amount = charge.amount,
    order_id = ?order_id,
    cause,
    "Checkout interrupted after the charge. Order and cart state must be checked by hand."
  );
}
