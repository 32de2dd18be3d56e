// storefront/src/pipelines/contexts.rs

//! Data structs the storefront pipelines run on. Handlers receive them
//! wrapped in `stagehand::ContextData`.

use crate::checkout::{CartSnapshot, CheckoutPermit, CheckoutState};
use crate::models::{CartLine, CatalogItem, Identity, NewCatalogItem, Order};
use crate::services::ChargeResult;
use crate::state::Backends;
use tracing::{event, Level};
use uuid::Uuid;

/// One checkout attempt, from authorization to cart clear.
pub struct CheckoutCtxData {
  pub backends: Backends,
  pub identity: Identity,
  pub payment_token: String,

  pub user_id: Option<Uuid>,
  /// Held from the cart read until the cart is cleared or the attempt ends.
  pub permit: Option<CheckoutPermit>,
  pub snapshot: Option<CartSnapshot>,
  pub total: Option<i64>,
  pub charge: Option<ChargeResult>,
  pub order: Option<Order>,
  pub cleared_lines: u64,

  pub state: CheckoutState,
  /// Every state the attempt has been in, oldest first.
  pub trail: Vec<CheckoutState>,
}

impl CheckoutCtxData {
  pub fn new(backends: Backends, identity: Identity, payment_token: impl Into<String>) -> Self {
    Self {
      backends,
      identity,
      payment_token: payment_token.into(),
      user_id: None,
      permit: None,
      snapshot: None,
      total: None,
      charge: None,
      order: None,
      cleared_lines: 0,
      state: CheckoutState::Unauthenticated,
      trail: vec![CheckoutState::Unauthenticated],
    }
  }

  pub fn advance(&mut self, next: CheckoutState) -> Result<(), stagehand::FlowError> {
    let next = self.state.advance(next)?;
    event!(Level::DEBUG, from = %self.state, to = %next, "Checkout state transition.");
    self.trail.push(next.clone());
    self.state = next;
    Ok(())
  }

  /// Records a terminal failure unless the attempt already ended.
  pub fn fail(&mut self, reason: &str) {
    if !self.state.is_terminal() {
      let failed = CheckoutState::Failed(reason.to_string());
      self.trail.push(failed.clone());
      self.state = failed;
    }
  }
}

pub struct AddToCartCtxData {
  pub backends: Backends,
  pub identity: Identity,
  pub item_id: Uuid,
  pub user_id: Option<Uuid>,
  /// The user's checkout permit; cart edits and checkout exclude each other.
  pub permit: Option<CheckoutPermit>,
  pub updated_line: Option<CartLine>,
}

pub struct RemoveFromCartCtxData {
  pub backends: Backends,
  pub identity: Identity,
  pub line_id: Uuid,
  pub user_id: Option<Uuid>,
  pub permit: Option<CheckoutPermit>,
  pub removed_line: Option<CartLine>,
}

pub struct CreateItemCtxData {
  pub backends: Backends,
  pub identity: Identity,
  pub item: NewCatalogItem,
  pub created: Option<CatalogItem>,
}
