// storefront/src/web/handlers/checkout_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::instrument;

use crate::errors::Result;
use crate::models::Identity;
use crate::requests::CheckoutRequest;
use crate::state::AppState;

#[instrument(name = "handler::checkout", skip(app_state, identity, payload), fields(user_id = ?identity.user_id()))]
pub async fn checkout_handler(
  app_state: web::Data<AppState>,
  identity: Identity,
  payload: web::Json<CheckoutRequest>,
) -> Result<HttpResponse> {
  let order = app_state.service.checkout(&identity, payload.into_inner()).await?;
  Ok(HttpResponse::Created().json(json!({ "order": order })))
}
