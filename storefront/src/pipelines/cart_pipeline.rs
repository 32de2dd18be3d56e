// storefront/src/pipelines/cart_pipeline.rs

use crate::errors::CheckoutError;
use crate::pipelines::common_steps::{acquire_user_permit, require_user};
use crate::pipelines::contexts::{AddToCartCtxData, RemoveFromCartCtxData};
use stagehand::{ContextData, FlowError, Pipeline, PipelineControl, Stagehand};
use tracing::{info, warn};

pub fn register_add_to_cart_pipeline(registry: &Stagehand<CheckoutError>) {
  let mut p = Pipeline::<AddToCartCtxData, CheckoutError>::new(&[
    ("authorize", false, None),
    ("acquire_user_lock", false, None),
    ("check_item_exists", false, None),
    ("increment_cart_line", false, None),
  ]);

  p.on_root("authorize", |ctx: ContextData<AddToCartCtxData>| {
    Box::pin(async move {
      let user_id = require_user(&ctx.read().identity)?;
      ctx.write().user_id = Some(user_id);
      Ok::<_, CheckoutError>(PipelineControl::Continue)
    })
  });

  p.on_root("acquire_user_lock", |ctx: ContextData<AddToCartCtxData>| {
    Box::pin(async move {
      let (user_id, locks) = {
        let guard = ctx.read();
        let user_id = guard
          .user_id
          .ok_or_else(|| FlowError::Internal("cart edit ran without a user".to_string()))?;
        (user_id, guard.backends.locks.clone())
      };
      let permit = acquire_user_permit(locks.as_ref(), user_id)?;
      ctx.write().permit = Some(permit);
      Ok::<_, CheckoutError>(PipelineControl::Continue)
    })
  });

  p.on_root("check_item_exists", |ctx: ContextData<AddToCartCtxData>| {
    Box::pin(async move {
      let (item_id, catalog) = {
        let guard = ctx.read();
        (guard.item_id, guard.backends.catalog.clone())
      };
      if catalog.find_item(item_id).await?.is_none() {
        warn!(%item_id, "Add to cart: item not found.");
        return Err(CheckoutError::NotFound(format!("No item found for ID {}", item_id)));
      }
      Ok::<_, CheckoutError>(PipelineControl::Continue)
    })
  });

  p.on_root("increment_cart_line", |ctx: ContextData<AddToCartCtxData>| {
    Box::pin(async move {
      let (user_id, item_id, carts) = {
        let guard = ctx.read();
        let user_id = guard
          .user_id
          .ok_or_else(|| FlowError::Internal("add to cart ran without a user".to_string()))?;
        (user_id, guard.item_id, guard.backends.carts.clone())
      };
      let line = carts.increment_quantity(user_id, item_id).await?;
      info!(%user_id, %item_id, line_id = %line.id, quantity = line.quantity, "Cart line updated.");
      ctx.write().updated_line = Some(line);
      Ok::<_, CheckoutError>(PipelineControl::Continue)
    })
  });

  registry.register_pipeline(p);
  info!("Add to Cart pipeline registered.");
}

pub fn register_remove_from_cart_pipeline(registry: &Stagehand<CheckoutError>) {
  let mut p = Pipeline::<RemoveFromCartCtxData, CheckoutError>::new(&[
    ("authorize", false, None),
    ("acquire_user_lock", false, None),
    ("load_and_check_owner", false, None),
    ("delete_cart_line", false, None),
  ]);

  p.on_root("authorize", |ctx: ContextData<RemoveFromCartCtxData>| {
    Box::pin(async move {
      let user_id = require_user(&ctx.read().identity)?;
      ctx.write().user_id = Some(user_id);
      Ok::<_, CheckoutError>(PipelineControl::Continue)
    })
  });

  p.on_root("acquire_user_lock", |ctx: ContextData<RemoveFromCartCtxData>| {
    Box::pin(async move {
      let (user_id, locks) = {
        let guard = ctx.read();
        let user_id = guard
          .user_id
          .ok_or_else(|| FlowError::Internal("cart edit ran without a user".to_string()))?;
        (user_id, guard.backends.locks.clone())
      };
      let permit = acquire_user_permit(locks.as_ref(), user_id)?;
      ctx.write().permit = Some(permit);
      Ok::<_, CheckoutError>(PipelineControl::Continue)
    })
  });

  p.on_root("load_and_check_owner", |ctx: ContextData<RemoveFromCartCtxData>| {
    Box::pin(async move {
      let (user_id, line_id, carts) = {
        let guard = ctx.read();
        (guard.user_id, guard.line_id, guard.backends.carts.clone())
      };
      let line = carts
        .find_line(line_id)
        .await?
        .ok_or_else(|| CheckoutError::NotFound(format!("No cart item found for ID {}", line_id)))?;
      if Some(line.user_id) != user_id {
        warn!(%line_id, owner = %line.user_id, caller = ?user_id, "Refusing to remove someone else's cart line.");
        return Err(CheckoutError::Forbidden("That cart item is not yours.".to_string()));
      }
      ctx.write().removed_line = Some(line);
      Ok::<_, CheckoutError>(PipelineControl::Continue)
    })
  });

  p.on_root("delete_cart_line", |ctx: ContextData<RemoveFromCartCtxData>| {
    Box::pin(async move {
      let (line_id, carts) = {
        let guard = ctx.read();
        (guard.line_id, guard.backends.carts.clone())
      };
      let deleted = carts.delete_by_ids(&[line_id]).await?;
      if deleted == 0 {
        // Cleared by a concurrent checkout between the ownership check and here.
        return Err(CheckoutError::NotFound(format!("No cart item found for ID {}", line_id)));
      }
      info!(%line_id, "Cart line removed.");
      Ok::<_, CheckoutError>(PipelineControl::Continue)
    })
  });

  registry.register_pipeline(p);
  info!("Remove from Cart pipeline registered.");
}
