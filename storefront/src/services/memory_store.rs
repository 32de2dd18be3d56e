// storefront/src/services/memory_store.rs

//! In-memory implementation of the catalog, cart and order stores.
//!
//! Every call reads the current tables; nothing is cached between calls.

use crate::errors::StoreError;
use crate::models::{CartLine, CartSnapshotLine, CatalogItem, NewCatalogItem, NewOrder, NewOrderLine, Order, OrderLine};
use crate::services::ports::{CartStore, CatalogStore, OrderStore};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Default)]
struct Tables {
  items: HashMap<Uuid, CatalogItem>,
  /// Insertion order doubles as cart line order.
  cart_lines: Vec<CartLine>,
  orders: Vec<Order>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
  tables: RwLock<Tables>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert_item(&self, item: CatalogItem) {
    self.tables.write().items.insert(item.id, item);
  }

  /// Removes a catalog item. Cart lines pointing at it are kept.
  pub fn delete_item(&self, item_id: Uuid) -> Option<CatalogItem> {
    self.tables.write().items.remove(&item_id)
  }

  /// Changes an item's price; already placed orders keep their copy.
  pub fn set_item_price(&self, item_id: Uuid, price: i64) -> bool {
    match self.tables.write().items.get_mut(&item_id) {
      Some(item) => {
        item.price = price;
        true
      }
      None => false,
    }
  }

  pub fn cart_lines(&self) -> Vec<CartLine> {
    self.tables.read().cart_lines.clone()
  }

  pub fn order_count(&self) -> usize {
    self.tables.read().orders.len()
  }

  /// Loads a small demo catalog.
  pub fn seed_demo_catalog(&self) -> Vec<CatalogItem> {
    let demo = [
      ("Leather Boots", "Hand stitched, resoled twice, still going.", 12_500),
      ("Canvas Tote", "Holds more than it should.", 2_400),
      ("Enamel Mug", "Keeps coffee warm for about four minutes.", 1_100),
      ("Wool Beanie", "One size fits most heads.", 1_800),
    ];
    let items: Vec<CatalogItem> = demo
      .iter()
      .map(|(title, description, price)| CatalogItem {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: description.to_string(),
        price: *price,
        image: None,
        large_image: None,
      })
      .collect();
    {
      let mut tables = self.tables.write();
      for item in &items {
        tables.items.insert(item.id, item.clone());
      }
    }
    info!(count = items.len(), "Seeded demo catalog into memory store.");
    items
  }
}

#[async_trait]
impl CatalogStore for MemoryStore {
  async fn list_items(&self) -> Result<Vec<CatalogItem>, StoreError> {
    let mut items: Vec<CatalogItem> = self.tables.read().items.values().cloned().collect();
    items.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
    Ok(items)
  }

  async fn find_item(&self, item_id: Uuid) -> Result<Option<CatalogItem>, StoreError> {
    Ok(self.tables.read().items.get(&item_id).cloned())
  }

  async fn create_item(&self, item: &NewCatalogItem) -> Result<CatalogItem, StoreError> {
    let stored = CatalogItem {
      id: Uuid::new_v4(),
      title: item.title.clone(),
      description: item.description.clone(),
      price: item.price,
      image: item.image.clone(),
      large_image: item.large_image.clone(),
    };
    self.tables.write().items.insert(stored.id, stored.clone());
    debug!(item_id = %stored.id, "Catalog item created in memory store.");
    Ok(stored)
  }
}

#[async_trait]
impl CartStore for MemoryStore {
  async fn load_by_user(&self, user_id: Uuid) -> Result<Vec<CartSnapshotLine>, StoreError> {
    let tables = self.tables.read();
    Ok(
      tables
        .cart_lines
        .iter()
        .filter(|line| line.user_id == user_id)
        .map(|line| CartSnapshotLine {
          line_id: line.id,
          item_id: line.item_id,
          quantity: line.quantity,
          item: tables.items.get(&line.item_id).cloned(),
        })
        .collect(),
    )
  }

  async fn find_line(&self, line_id: Uuid) -> Result<Option<CartLine>, StoreError> {
    Ok(self.tables.read().cart_lines.iter().find(|l| l.id == line_id).cloned())
  }

  async fn increment_quantity(&self, user_id: Uuid, item_id: Uuid) -> Result<CartLine, StoreError> {
    let mut tables = self.tables.write();
    if let Some(line) = tables
      .cart_lines
      .iter_mut()
      .find(|l| l.user_id == user_id && l.item_id == item_id)
    {
      let line_id = line.id;
      line.quantity = line
        .quantity
        .checked_add(1)
        .ok_or_else(|| StoreError::Conflict(format!("Quantity overflow on cart line {}", line_id)))?;
      return Ok(line.clone());
    }
    let line = CartLine {
      id: Uuid::new_v4(),
      user_id,
      item_id,
      quantity: 1,
      added_at: Utc::now(),
    };
    tables.cart_lines.push(line.clone());
    Ok(line)
  }

  async fn delete_by_ids(&self, line_ids: &[Uuid]) -> Result<u64, StoreError> {
    let mut tables = self.tables.write();
    let before = tables.cart_lines.len();
    tables.cart_lines.retain(|l| !line_ids.contains(&l.id));
    let deleted = (before - tables.cart_lines.len()) as u64;
    debug!(requested = line_ids.len(), deleted, "Deleted cart lines.");
    Ok(deleted)
  }
}

#[async_trait]
impl OrderStore for MemoryStore {
  async fn create(&self, order: &NewOrder, lines: &[NewOrderLine]) -> Result<Order, StoreError> {
    let order_id = Uuid::new_v4();
    let stored = Order {
      id: order_id,
      user_id: order.user_id,
      total: order.total,
      charge_id: order.charge_id.clone(),
      currency: order.currency.clone(),
      created_at: Utc::now(),
      lines: lines
        .iter()
        .map(|line| OrderLine {
          id: Uuid::new_v4(),
          order_id,
          user_id: order.user_id,
          title: line.title.clone(),
          description: line.description.clone(),
          price: line.price,
          image: line.image.clone(),
          large_image: line.large_image.clone(),
          quantity: line.quantity,
        })
        .collect(),
    };
    self.tables.write().orders.push(stored.clone());
    Ok(stored)
  }

  async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, StoreError> {
    let tables = self.tables.read();
    // Orders are appended in creation order.
    Ok(tables.orders.iter().rev().filter(|o| o.user_id == user_id).cloned().collect())
  }

  async fn find(&self, order_id: Uuid) -> Result<Option<Order>, StoreError> {
    Ok(self.tables.read().orders.iter().find(|o| o.id == order_id).cloned())
  }
}
