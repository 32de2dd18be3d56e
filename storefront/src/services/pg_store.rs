// storefront/src/services/pg_store.rs

//! PostgreSQL implementation of the stores, using runtime-checked `sqlx`
//! queries against `schema.sql`.

use crate::errors::StoreError;
use crate::models::{CartLine, CartSnapshotLine, CatalogItem, NewCatalogItem, NewOrder, NewOrderLine, Order, OrderLine};
use crate::services::ports::{CartStore, CatalogStore, OrderStore};
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use tracing::{error, info, instrument};
use uuid::Uuid;

const ITEM_COLUMNS: &str = "id, title, description, price, image, large_image";
const CART_LINE_COLUMNS: &str = "id, user_id, item_id, quantity, added_at";
const ORDER_COLUMNS: &str = "id, user_id, total, charge_id, currency, created_at";
const ORDER_LINE_COLUMNS: &str = "id, order_id, user_id, title, description, price, image, large_image, quantity";

#[derive(Debug, Clone)]
pub struct PgStore {
  pool: PgPool,
}

/// Cart line LEFT JOINed with its catalog item.
#[derive(Debug, FromRow)]
struct CartJoinRow {
  line_id: Uuid,
  item_id: Uuid,
  quantity: i32,
  catalog_id: Option<Uuid>,
  title: Option<String>,
  description: Option<String>,
  price: Option<i64>,
  image: Option<String>,
  large_image: Option<String>,
}

impl CartJoinRow {
  fn into_snapshot_line(self) -> CartSnapshotLine {
    let item = match (self.catalog_id, self.title, self.price) {
      (Some(id), Some(title), Some(price)) => Some(CatalogItem {
        id,
        title,
        description: self.description.unwrap_or_default(),
        price,
        image: self.image,
        large_image: self.large_image,
      }),
      _ => None,
    };
    CartSnapshotLine {
      line_id: self.line_id,
      item_id: self.item_id,
      quantity: self.quantity,
      item,
    }
  }
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
    let pool = PgPool::connect(database_url).await.map_err(|e| {
      error!(error = %e, "Failed to connect to the database.");
      StoreError::Unavailable(e.to_string())
    })?;
    info!("Successfully connected to the database.");
    Ok(Self::new(pool))
  }

  async fn attach_lines(&self, mut orders: Vec<Order>) -> Result<Vec<Order>, StoreError> {
    if orders.is_empty() {
      return Ok(orders);
    }
    let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let lines: Vec<OrderLine> = sqlx::query_as(&format!(
      "SELECT {} FROM order_lines WHERE order_id = ANY($1) ORDER BY order_id, position",
      ORDER_LINE_COLUMNS
    ))
    .bind(&ids)
    .fetch_all(&self.pool)
    .await?;

    let mut by_order: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
    for line in lines {
      by_order.entry(line.order_id).or_default().push(line);
    }
    for order in &mut orders {
      order.lines = by_order.remove(&order.id).unwrap_or_default();
    }
    Ok(orders)
  }
}

#[async_trait]
impl CatalogStore for PgStore {
  async fn list_items(&self) -> Result<Vec<CatalogItem>, StoreError> {
    let items = sqlx::query_as(&format!("SELECT {} FROM catalog_items ORDER BY title ASC, id ASC", ITEM_COLUMNS))
      .fetch_all(&self.pool)
      .await?;
    Ok(items)
  }

  async fn find_item(&self, item_id: Uuid) -> Result<Option<CatalogItem>, StoreError> {
    let item = sqlx::query_as(&format!("SELECT {} FROM catalog_items WHERE id = $1", ITEM_COLUMNS))
      .bind(item_id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(item)
  }

  async fn create_item(&self, item: &NewCatalogItem) -> Result<CatalogItem, StoreError> {
    let stored = sqlx::query_as(&format!(
      "INSERT INTO catalog_items (id, title, description, price, image, large_image) \
       VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
      ITEM_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(&item.title)
    .bind(&item.description)
    .bind(item.price)
    .bind(&item.image)
    .bind(&item.large_image)
    .fetch_one(&self.pool)
    .await?;
    Ok(stored)
  }
}

#[async_trait]
impl CartStore for PgStore {
  #[instrument(name = "PgStore::load_by_user", skip(self))]
  async fn load_by_user(&self, user_id: Uuid) -> Result<Vec<CartSnapshotLine>, StoreError> {
    let rows: Vec<CartJoinRow> = sqlx::query_as(
      r#"
      SELECT c.id AS line_id, c.item_id, c.quantity,
             i.id AS catalog_id, i.title, i.description, i.price, i.image, i.large_image
      FROM cart_lines c
      LEFT JOIN catalog_items i ON i.id = c.item_id
      WHERE c.user_id = $1
      ORDER BY c.added_at ASC, c.id ASC
      "#,
    )
    .bind(user_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(rows.into_iter().map(CartJoinRow::into_snapshot_line).collect())
  }

  async fn find_line(&self, line_id: Uuid) -> Result<Option<CartLine>, StoreError> {
    let line = sqlx::query_as(&format!("SELECT {} FROM cart_lines WHERE id = $1", CART_LINE_COLUMNS))
      .bind(line_id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(line)
  }

  async fn increment_quantity(&self, user_id: Uuid, item_id: Uuid) -> Result<CartLine, StoreError> {
    let line = sqlx::query_as(&format!(
      r#"
      INSERT INTO cart_lines (id, user_id, item_id, quantity, added_at)
      VALUES ($1, $2, $3, 1, NOW())
      ON CONFLICT (user_id, item_id) DO UPDATE SET quantity = cart_lines.quantity + 1
      RETURNING {}
      "#,
      CART_LINE_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(item_id)
    .fetch_one(&self.pool)
    .await?;
    Ok(line)
  }

  async fn delete_by_ids(&self, line_ids: &[Uuid]) -> Result<u64, StoreError> {
    if line_ids.is_empty() {
      return Ok(0);
    }
    let result = sqlx::query("DELETE FROM cart_lines WHERE id = ANY($1)")
      .bind(line_ids)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected())
  }
}

#[async_trait]
impl OrderStore for PgStore {
  #[instrument(name = "PgStore::create_order", skip(self, order, lines), fields(user_id = %order.user_id, charge_id = %order.charge_id))]
  async fn create(&self, order: &NewOrder, lines: &[NewOrderLine]) -> Result<Order, StoreError> {
    let mut tx = self.pool.begin().await?;

    let order_id = Uuid::new_v4();
    let mut stored: Order = sqlx::query_as(&format!(
      "INSERT INTO orders (id, user_id, total, charge_id, currency, created_at) \
       VALUES ($1, $2, $3, $4, $5, NOW()) RETURNING {}",
      ORDER_COLUMNS
    ))
    .bind(order_id)
    .bind(order.user_id)
    .bind(order.total)
    .bind(&order.charge_id)
    .bind(&order.currency)
    .fetch_one(&mut *tx)
    .await?;

    for (position, line) in lines.iter().enumerate() {
      let stored_line: OrderLine = sqlx::query_as(&format!(
        "INSERT INTO order_lines \
         (id, order_id, user_id, title, description, price, image, large_image, quantity, position) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {}",
        ORDER_LINE_COLUMNS
      ))
      .bind(Uuid::new_v4())
      .bind(order_id)
      .bind(order.user_id)
      .bind(&line.title)
      .bind(&line.description)
      .bind(line.price)
      .bind(&line.image)
      .bind(&line.large_image)
      .bind(line.quantity)
      .bind(position as i32)
      .fetch_one(&mut *tx)
      .await?;
      stored.lines.push(stored_line);
    }

    tx.commit().await?;
    info!(order_id = %stored.id, lines = stored.lines.len(), "Order persisted.");
    Ok(stored)
  }

  async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, StoreError> {
    let orders: Vec<Order> = sqlx::query_as(&format!(
      "SELECT {} FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
      ORDER_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(&self.pool)
    .await?;
    self.attach_lines(orders).await
  }

  async fn find(&self, order_id: Uuid) -> Result<Option<Order>, StoreError> {
    let order: Option<Order> = sqlx::query_as(&format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS))
      .bind(order_id)
      .fetch_optional(&self.pool)
      .await?;
    match order {
      Some(order) => Ok(self.attach_lines(vec![order]).await?.pop()),
      None => Ok(None),
    }
  }
}
