// storefront/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::Result;
use crate::models::Identity;
use crate::requests::{AddToCartRequest, RemoveFromCartRequest};
use crate::state::AppState;

#[instrument(name = "handler::view_cart", skip(app_state, identity))]
pub async fn view_cart_handler(app_state: web::Data<AppState>, identity: Identity) -> Result<HttpResponse> {
  let lines = app_state.service.cart(&identity).await?;
  Ok(HttpResponse::Ok().json(json!({ "cart": lines })))
}

#[instrument(
  name = "handler::add_to_cart",
  skip(app_state, identity, payload),
  fields(user_id = ?identity.user_id(), item_id = %payload.item_id)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  identity: Identity,
  payload: web::Json<AddToCartRequest>,
) -> Result<HttpResponse> {
  let line = app_state.service.add_to_cart(&identity, payload.into_inner()).await?;
  info!(line_id = %line.id, quantity = line.quantity, "Item added to cart.");
  Ok(HttpResponse::Ok().json(json!({ "cartItem": line })))
}

#[instrument(name = "handler::remove_from_cart", skip(app_state, identity, path), fields(line_id = %path.as_ref()))]
pub async fn remove_from_cart_handler(
  app_state: web::Data<AppState>,
  identity: Identity,
  path: web::Path<Uuid>,
) -> Result<HttpResponse> {
  let request = RemoveFromCartRequest {
    line_id: path.into_inner(),
  };
  let removed = app_state.service.remove_from_cart(&identity, request).await?;
  Ok(HttpResponse::Ok().json(json!({ "removed": removed })))
}
