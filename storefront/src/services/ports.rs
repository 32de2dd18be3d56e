// storefront/src/services/ports.rs

//! Collaborators the storefront calls but does not implement: persistence
//! and the payment gateway.

use crate::errors::{PaymentError, StoreError};
use crate::models::{CartLine, CartSnapshotLine, CatalogItem, NewCatalogItem, NewOrder, NewOrderLine, Order};
use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

#[async_trait]
pub trait CatalogStore: Send + Sync {
  async fn list_items(&self) -> Result<Vec<CatalogItem>, StoreError>;

  async fn find_item(&self, item_id: Uuid) -> Result<Option<CatalogItem>, StoreError>;

  /// Stores a new item and returns it with its assigned id.
  async fn create_item(&self, item: &NewCatalogItem) -> Result<CatalogItem, StoreError>;
}

#[async_trait]
pub trait CartStore: Send + Sync {
  /// All of the user's lines, oldest first, joined with current catalog
  /// data. Lines whose item no longer exists come back with `item: None`.
  async fn load_by_user(&self, user_id: Uuid) -> Result<Vec<CartSnapshotLine>, StoreError>;

  async fn find_line(&self, line_id: Uuid) -> Result<Option<CartLine>, StoreError>;

  /// Adds one to the user's line for `item_id`, creating it with quantity 1
  /// if absent. Returns the line after the update.
  async fn increment_quantity(&self, user_id: Uuid, item_id: Uuid) -> Result<CartLine, StoreError>;

  /// Deletes exactly the given lines. Returns how many existed.
  async fn delete_by_ids(&self, line_ids: &[Uuid]) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
  /// Persists header and lines as one unit and returns the stored order
  /// with its assigned identifiers.
  async fn create(&self, order: &NewOrder, lines: &[NewOrderLine]) -> Result<Order, StoreError>;

  /// The user's orders, newest first.
  async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, StoreError>;

  async fn find(&self, order_id: Uuid) -> Result<Option<Order>, StoreError>;
}

/// A confirmed charge. `amount` is what the gateway actually charged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChargeResult {
  pub id: String,
  pub amount: i64,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
  async fn charge(&self, amount: i64, currency: &str, source_token: &str) -> Result<ChargeResult, PaymentError>;
}
