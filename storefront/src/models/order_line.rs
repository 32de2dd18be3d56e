// storefront/src/models/order_line.rs

use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A frozen copy of a catalog item and the purchased quantity. Later
/// catalog edits never reach it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct OrderLine {
  pub id: Uuid,
  pub order_id: Uuid,
  pub user_id: Uuid,
  pub title: String,
  pub description: String,
  pub price: i64,
  pub image: Option<String>,
  pub large_image: Option<String>,
  pub quantity: i32,
}

/// Line content without identifiers, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewOrderLine {
  pub title: String,
  pub description: String,
  pub price: i64,
  pub image: Option<String>,
  pub large_image: Option<String>,
  pub quantity: i32,
}
