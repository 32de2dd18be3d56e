// storefront/src/models/catalog_item.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A sellable item. Prices are integer minor currency units (cents).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CatalogItem {
  pub id: Uuid,
  pub title: String,
  pub description: String,
  pub price: i64,
  pub image: Option<String>,
  pub large_image: Option<String>,
}

/// Item content before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCatalogItem {
  pub title: String,
  pub description: String,
  pub price: i64,
  pub image: Option<String>,
  pub large_image: Option<String>,
}
