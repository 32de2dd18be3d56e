// storefront/src/checkout/locks.rs

//! Per-user mutual exclusion for checkout.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{event, Level};
use uuid::Uuid;

/// Grants at most one checkout permit per user at a time.
pub trait CheckoutLocks: Send + Sync {
  /// Returns `None` when the user already holds a permit. Never waits.
  fn try_acquire(&self, user_id: Uuid) -> Option<CheckoutPermit>;
}

/// Held for the duration of one checkout; dropping it releases the user.
pub struct CheckoutPermit {
  user_id: Uuid,
  release: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl CheckoutPermit {
  pub fn new(user_id: Uuid, release: impl FnOnce() + Send + Sync + 'static) -> Self {
    Self {
      user_id,
      release: Some(Box::new(release)),
    }
  }

  pub fn user_id(&self) -> Uuid {
    self.user_id
  }
}

impl Drop for CheckoutPermit {
  fn drop(&mut self) {
    if let Some(release) = self.release.take() {
      release();
      event!(Level::DEBUG, user_id = %self.user_id, "Checkout lock released.");
    }
  }
}

impl std::fmt::Debug for CheckoutPermit {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CheckoutPermit").field("user_id", &self.user_id).finish()
  }
}

/// In-process lock table keyed by user id.
#[derive(Debug, Default, Clone)]
pub struct KeyedCheckoutLocks {
  held: Arc<Mutex<HashSet<Uuid>>>,
}

impl KeyedCheckoutLocks {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_held(&self, user_id: Uuid) -> bool {
    self.held.lock().contains(&user_id)
  }
}

impl CheckoutLocks for KeyedCheckoutLocks {
  fn try_acquire(&self, user_id: Uuid) -> Option<CheckoutPermit> {
    if !self.held.lock().insert(user_id) {
      event!(Level::WARN, %user_id, "Checkout lock already held.");
      return None;
    }
    let held = Arc::clone(&self.held);
    Some(CheckoutPermit::new(user_id, move || {
      held.lock().remove(&user_id);
    }))
  }
}
