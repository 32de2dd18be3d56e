// storefront/src/state.rs

use crate::checkout::CheckoutLocks;
use crate::config::AppConfig;
use crate::service::StorefrontService;
use crate::services::{CartStore, CatalogStore, OrderStore, PaymentGateway};
use std::sync::Arc;

/// The collaborators every workflow runs against. Cloned into each
/// pipeline context.
#[derive(Clone)]
pub struct Backends {
  pub catalog: Arc<dyn CatalogStore>,
  pub carts: Arc<dyn CartStore>,
  pub orders: Arc<dyn OrderStore>,
  pub gateway: Arc<dyn PaymentGateway>,
  pub locks: Arc<dyn CheckoutLocks>,
  /// ISO-4217 code every charge is made in.
  pub currency: String,
}

impl Backends {
  /// Uses one store value for catalog, carts and orders.
  pub fn from_store<S>(
    store: Arc<S>,
    gateway: Arc<dyn PaymentGateway>,
    locks: Arc<dyn CheckoutLocks>,
    currency: impl Into<String>,
  ) -> Self
  where
    S: CatalogStore + CartStore + OrderStore + 'static,
  {
    Self {
      catalog: store.clone(),
      carts: store.clone(),
      orders: store,
      gateway,
      locks,
      currency: currency.into(),
    }
  }
}

impl std::fmt::Debug for Backends {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Backends").field("currency", &self.currency).finish_non_exhaustive()
  }
}

#[derive(Clone)]
pub struct AppState {
  pub service: Arc<StorefrontService>,
  pub config: Arc<AppConfig>,
}
