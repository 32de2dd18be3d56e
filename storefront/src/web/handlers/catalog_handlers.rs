// storefront/src/web/handlers/catalog_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::Result;
use crate::models::Identity;
use crate::requests::CreateItemRequest;
use crate::state::AppState;

#[instrument(name = "handler::list_items", skip(app_state))]
pub async fn list_items_handler(app_state: web::Data<AppState>) -> Result<HttpResponse> {
  let items = app_state.service.items().await?;
  Ok(HttpResponse::Ok().json(json!({ "items": items })))
}

#[instrument(name = "handler::get_item", skip(app_state, path), fields(item_id = %path.as_ref()))]
pub async fn get_item_handler(app_state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse> {
  let item = app_state.service.item(path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "item": item })))
}

#[instrument(name = "handler::create_item", skip(app_state, identity, payload), fields(user_id = ?identity.user_id()))]
pub async fn create_item_handler(
  app_state: web::Data<AppState>,
  identity: Identity,
  payload: web::Json<CreateItemRequest>,
) -> Result<HttpResponse> {
  let item = app_state.service.create_item(&identity, payload.into_inner()).await?;
  info!(item_id = %item.id, "Item created.");
  Ok(HttpResponse::Created().json(json!({ "item": item })))
}
