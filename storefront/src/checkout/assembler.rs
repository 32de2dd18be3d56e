// storefront/src/checkout/assembler.rs

use crate::checkout::snapshot::CartSnapshot;
use crate::models::{AssembledOrder, NewOrder, NewOrderLine};
use crate::services::ports::ChargeResult;
use uuid::Uuid;

/// Builds the order header and frozen lines for a charged snapshot.
///
/// The total and charge id come from the gateway's confirmation. Cart line
/// and catalog identifiers are not carried over; the order store assigns
/// new ones.
pub fn assemble(snapshot: &CartSnapshot, charge: &ChargeResult, user_id: Uuid, currency: &str) -> AssembledOrder {
  let lines = snapshot
    .lines
    .iter()
    .map(|line| NewOrderLine {
      title: line.item.title.clone(),
      description: line.item.description.clone(),
      price: line.item.price,
      image: line.item.image.clone(),
      large_image: line.item.large_image.clone(),
      quantity: line.quantity,
    })
    .collect();

  AssembledOrder {
    order: NewOrder {
      user_id,
      total: charge.amount,
      charge_id: charge.id.clone(),
      currency: currency.to_string(),
    },
    lines,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::checkout::snapshot::SnapshotLine;
  use crate::models::CatalogItem;

  fn snapshot() -> CartSnapshot {
    let item = |title: &str, price| CatalogItem {
      id: Uuid::new_v4(),
      title: title.to_string(),
      description: format!("{} description", title),
      price,
      image: Some(format!("{}.jpg", title)),
      large_image: None,
    };
    CartSnapshot {
      user_id: Uuid::new_v4(),
      lines: vec![
        SnapshotLine {
          line_id: Uuid::new_v4(),
          quantity: 2,
          item: item("mug", 500),
        },
        SnapshotLine {
          line_id: Uuid::new_v4(),
          quantity: 1,
          item: item("poster", 1000),
        },
      ],
      skipped_line_ids: vec![Uuid::new_v4()],
    }
  }

  #[test]
  fn copies_catalog_data_and_quantities() {
    let snap = snapshot();
    let charge = ChargeResult {
      id: "ch_1".to_string(),
      amount: 2000,
    };
    let assembled = assemble(&snap, &charge, snap.user_id, "USD");

    assert_eq!(assembled.order.total, 2000);
    assert_eq!(assembled.order.charge_id, "ch_1");
    assert_eq!(assembled.order.user_id, snap.user_id);
    assert_eq!(assembled.order.currency, "USD");
    let summary: Vec<(&str, i64, i32)> = assembled
      .lines
      .iter()
      .map(|l| (l.title.as_str(), l.price, l.quantity))
      .collect();
    assert_eq!(summary, vec![("mug", 500, 2), ("poster", 1000, 1)]);
    assert_eq!(assembled.lines[0].image.as_deref(), Some("mug.jpg"));
  }

  #[test]
  fn leaves_snapshot_untouched_and_is_deterministic() {
    let snap = snapshot();
    let before = snap.clone();
    let charge = ChargeResult {
      id: "ch_2".to_string(),
      amount: 2000,
    };
    let first = assemble(&snap, &charge, snap.user_id, "USD");
    let second = assemble(&snap, &charge, snap.user_id, "USD");
    assert_eq!(snap, before);
    assert_eq!(first, second);
  }

  #[test]
  fn uses_gateway_amount_as_total() {
    let snap = snapshot();
    let charge = ChargeResult {
      id: "ch_3".to_string(),
      amount: 1999,
    };
    assert_eq!(assemble(&snap, &charge, snap.user_id, "USD").order.total, 1999);
  }
}
