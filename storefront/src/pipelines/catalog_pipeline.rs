// storefront/src/pipelines/catalog_pipeline.rs

use crate::errors::CheckoutError;
use crate::models::Permission;
use crate::pipelines::common_steps::require_user;
use crate::pipelines::contexts::CreateItemCtxData;
use stagehand::{ContextData, Pipeline, PipelineControl, Stagehand};
use tracing::{info, warn};

pub fn register_create_item_pipeline(registry: &Stagehand<CheckoutError>) {
  let mut p = Pipeline::<CreateItemCtxData, CheckoutError>::new(&[
    ("authorize", false, None),
    ("check_permission", false, None),
    ("insert_item", false, None),
  ]);

  p.on_root("authorize", |ctx: ContextData<CreateItemCtxData>| {
    Box::pin(async move {
      require_user(&ctx.read().identity)?;
      Ok::<_, CheckoutError>(PipelineControl::Continue)
    })
  });

  p.on_root("check_permission", |ctx: ContextData<CreateItemCtxData>| {
    Box::pin(async move {
      let guard = ctx.read();
      let identity = &guard.identity;
      if !identity.has_permission(Permission::ItemCreate) && !identity.has_permission(Permission::Admin) {
        warn!(user_id = ?identity.user_id(), "Create item refused: missing ITEMCREATE permission.");
        return Err(CheckoutError::Forbidden(
          "You do not have permission to create items.".to_string(),
        ));
      }
      Ok::<_, CheckoutError>(PipelineControl::Continue)
    })
  });

  p.on_root("insert_item", |ctx: ContextData<CreateItemCtxData>| {
    Box::pin(async move {
      let (item, catalog) = {
        let guard = ctx.read();
        (guard.item.clone(), guard.backends.catalog.clone())
      };
      let created = catalog.create_item(&item).await?;
      info!(item_id = %created.id, title = %created.title, price = created.price, "Catalog item created.");
      ctx.write().created = Some(created);
      Ok::<_, CheckoutError>(PipelineControl::Continue)
    })
  });

  registry.register_pipeline(p);
  info!("Create Item pipeline registered.");
}
