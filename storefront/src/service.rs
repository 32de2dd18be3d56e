// storefront/src/service.rs

//! `StorefrontService`: the operations the storefront exposes, each taking
//! the caller's identity explicitly.

use crate::checkout::CheckoutState;
use crate::errors::CheckoutError;
use crate::models::{CartLine, CartSnapshotLine, CatalogItem, Identity, Order, Permission};
use crate::pipelines::{self, common_steps::report_interrupted_checkout, common_steps::require_user, contexts::*};
use crate::requests::{AddToCartRequest, CheckoutRequest, CreateItemRequest, RemoveFromCartRequest, Validate};
use crate::state::Backends;
use stagehand::{ContextData, FlowError, PipelineResult, Stagehand};
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub struct StorefrontService {
  registry: Stagehand<CheckoutError>,
  backends: Backends,
}

/// Outcome of one checkout attempt with the states it went through.
#[derive(Debug)]
pub struct CheckoutOutcome {
  pub result: Result<Order, CheckoutError>,
  pub trail: Vec<CheckoutState>,
}

impl StorefrontService {
  pub fn new(backends: Backends) -> Self {
    let registry = Stagehand::<CheckoutError>::new();
    pipelines::register_all_pipelines(&registry);
    Self { registry, backends }
  }

  pub fn backends(&self) -> &Backends {
    &self.backends
  }

  /// Charges the caller for their current cart and turns it into an order.
  pub async fn checkout(&self, identity: &Identity, request: CheckoutRequest) -> Result<Order, CheckoutError> {
    self.checkout_traced(identity, request).await.result
  }

  #[instrument(name = "StorefrontService::checkout", skip_all, fields(user_id = ?identity.user_id()))]
  pub async fn checkout_traced(&self, identity: &Identity, request: CheckoutRequest) -> CheckoutOutcome {
    if let Err(e) = request.validate() {
      return CheckoutOutcome {
        result: Err(e),
        trail: vec![CheckoutState::Unauthenticated],
      };
    }

    let ctx = ContextData::new(CheckoutCtxData::new(
      self.backends.clone(),
      identity.clone(),
      request.payment_token,
    ));
    let run = self.registry.run(ctx.clone()).await;

    let (order, charge, trail) = ctx.update(|c| {
      c.permit = None;
      if let Err(e) = &run {
        c.fail(e.kind());
      }
      (c.order.take(), c.charge.clone(), c.trail.clone())
    });

    if let (Err(CheckoutError::Workflow { source: FlowError::Detached { step_name, message } }), Some(charge)) =
      (&run, &charge)
    {
      report_interrupted_checkout(
        identity.user_id(),
        charge,
        order.as_ref().map(|o| o.id),
        &format!("{}: {}", step_name, message),
      );
    }

    let result = match run {
      Ok(PipelineResult::Completed) | Ok(PipelineResult::Stopped) => order.ok_or_else(|| {
        CheckoutError::from(FlowError::Internal("checkout finished without an order".to_string()))
      }),
      Err(e) => {
        warn!(kind = e.kind(), error = %e, "Checkout failed.");
        Err(e)
      }
    };
    if let Ok(order) = &result {
      info!(order_id = %order.id, total = order.total, "Checkout complete.");
    }
    CheckoutOutcome { result, trail }
  }

  #[instrument(name = "StorefrontService::add_to_cart", skip_all, fields(item_id = %request.item_id))]
  pub async fn add_to_cart(&self, identity: &Identity, request: AddToCartRequest) -> Result<CartLine, CheckoutError> {
    request.validate()?;
    let ctx = ContextData::new(AddToCartCtxData {
      backends: self.backends.clone(),
      identity: identity.clone(),
      item_id: request.item_id,
      user_id: None,
      permit: None,
      updated_line: None,
    });
    self.registry.run(ctx.clone()).await?;
    ctx
      .update(|c| {
        c.permit = None;
        c.updated_line.take()
      })
      .ok_or_else(|| CheckoutError::from(FlowError::Internal("add to cart finished without a line".to_string())))
  }

  #[instrument(name = "StorefrontService::remove_from_cart", skip_all, fields(line_id = %request.line_id))]
  pub async fn remove_from_cart(
    &self,
    identity: &Identity,
    request: RemoveFromCartRequest,
  ) -> Result<CartLine, CheckoutError> {
    request.validate()?;
    let ctx = ContextData::new(RemoveFromCartCtxData {
      backends: self.backends.clone(),
      identity: identity.clone(),
      line_id: request.line_id,
      user_id: None,
      permit: None,
      removed_line: None,
    });
    self.registry.run(ctx.clone()).await?;
    ctx
      .update(|c| {
        c.permit = None;
        c.removed_line.take()
      })
      .ok_or_else(|| CheckoutError::from(FlowError::Internal("remove from cart finished without a line".to_string())))
  }

  /// The caller's cart, including lines whose item has since been deleted.
  pub async fn cart(&self, identity: &Identity) -> Result<Vec<CartSnapshotLine>, CheckoutError> {
    let user_id = require_user(identity)?;
    Ok(self.backends.carts.load_by_user(user_id).await?)
  }

  /// The caller's orders, newest first.
  pub async fn orders(&self, identity: &Identity) -> Result<Vec<Order>, CheckoutError> {
    let user_id = require_user(identity)?;
    Ok(self.backends.orders.list_by_user(user_id).await?)
  }

  /// One order, visible to its owner and to admins.
  pub async fn order(&self, identity: &Identity, order_id: Uuid) -> Result<Order, CheckoutError> {
    let user_id = require_user(identity)?;
    let order = self
      .backends
      .orders
      .find(order_id)
      .await?
      .ok_or_else(|| CheckoutError::NotFound(format!("No order found for ID {}", order_id)))?;
    if order.user_id != user_id && !identity.has_permission(Permission::Admin) {
      warn!(%order_id, %user_id, "Order requested by someone who does not own it.");
      return Err(CheckoutError::Forbidden("You can't see this order.".to_string()));
    }
    Ok(order)
  }

  /// Adds an item to the catalog. Needs `ItemCreate` or `Admin`.
  #[instrument(name = "StorefrontService::create_item", skip_all, fields(user_id = ?identity.user_id()))]
  pub async fn create_item(&self, identity: &Identity, request: CreateItemRequest) -> Result<CatalogItem, CheckoutError> {
    request.validate()?;
    let ctx = ContextData::new(CreateItemCtxData {
      backends: self.backends.clone(),
      identity: identity.clone(),
      item: request.into_new_item(),
      created: None,
    });
    self.registry.run(ctx.clone()).await?;
    ctx
      .update(|c| c.created.take())
      .ok_or_else(|| CheckoutError::from(FlowError::Internal("create item finished without an item".to_string())))
  }

  pub async fn items(&self) -> Result<Vec<CatalogItem>, CheckoutError> {
    Ok(self.backends.catalog.list_items().await?)
  }

  pub async fn item(&self, item_id: Uuid) -> Result<CatalogItem, CheckoutError> {
    self
      .backends
      .catalog
      .find_item(item_id)
      .await?
      .ok_or_else(|| CheckoutError::NotFound(format!("No item found for ID {}", item_id)))
  }
}

impl std::fmt::Debug for StorefrontService {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StorefrontService")
      .field("registry", &self.registry)
      .field("backends", &self.backends)
      .finish()
  }
}
