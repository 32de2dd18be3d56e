// storefront/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::Result;
use crate::models::Identity;
use crate::state::AppState;

#[instrument(name = "handler::list_orders", skip(app_state, identity))]
pub async fn list_orders_handler(app_state: web::Data<AppState>, identity: Identity) -> Result<HttpResponse> {
  let orders = app_state.service.orders(&identity).await?;
  Ok(HttpResponse::Ok().json(json!({ "orders": orders })))
}

#[instrument(name = "handler::get_order", skip(app_state, identity, path), fields(order_id = %path.as_ref()))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  identity: Identity,
  path: web::Path<Uuid>,
) -> Result<HttpResponse> {
  let order = app_state.service.order(&identity, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "order": order })))
}
