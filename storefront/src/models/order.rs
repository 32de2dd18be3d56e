// storefront/src/models/order.rs

use crate::models::order_line::{NewOrderLine, OrderLine};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A completed purchase. Created once per successful checkout and never
/// updated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Order {
  pub id: Uuid,
  pub user_id: Uuid,
  /// Amount confirmed by the payment gateway, in minor units.
  pub total: i64,
  pub charge_id: String,
  pub currency: String,
  pub created_at: DateTime<Utc>,
  #[sqlx(skip)]
  pub lines: Vec<OrderLine>,
}

impl Order {
  /// Sum of `price * quantity` over the frozen lines.
  pub fn lines_total(&self) -> i64 {
    self.lines.iter().map(|l| l.price * i64::from(l.quantity)).sum()
  }
}

/// Order header as assembled before persistence; the store assigns `id`
/// and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewOrder {
  pub user_id: Uuid,
  pub total: i64,
  pub charge_id: String,
  pub currency: String,
}

/// Header plus lines, the output of the order assembler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssembledOrder {
  pub order: NewOrder,
  pub lines: Vec<NewOrderLine>,
}
