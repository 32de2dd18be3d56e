// storefront/src/models/cart_line.rs

use crate::models::CatalogItem;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One (item, quantity) pairing owned by a user, pending purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CartLine {
  pub id: Uuid,
  pub user_id: Uuid,
  pub item_id: Uuid,
  pub quantity: i32,
  pub added_at: DateTime<Utc>,
}

/// A cart line joined with the catalog item it points at, as read at one
/// instant. `item` is `None` when the catalog item has been deleted since
/// the line was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSnapshotLine {
  pub line_id: Uuid,
  pub item_id: Uuid,
  pub quantity: i32,
  pub item: Option<CatalogItem>,
}
