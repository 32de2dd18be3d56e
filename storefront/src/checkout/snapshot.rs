// storefront/src/checkout/snapshot.rs

use crate::models::{CartSnapshotLine, CatalogItem};
use serde::Serialize;
use uuid::Uuid;

/// A cart line whose catalog item still exists, with the item data as read
/// when the snapshot was taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotLine {
  pub line_id: Uuid,
  pub quantity: i32,
  pub item: CatalogItem,
}

/// The authoritative basis of one checkout attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSnapshot {
  pub user_id: Uuid,
  pub lines: Vec<SnapshotLine>,
  /// Lines whose catalog item was deleted. They are neither charged nor
  /// cleared.
  pub skipped_line_ids: Vec<Uuid>,
}

impl CartSnapshot {
  pub fn from_lines(user_id: Uuid, lines: Vec<CartSnapshotLine>) -> Self {
    let mut included = Vec::with_capacity(lines.len());
    let mut skipped_line_ids = Vec::new();
    for line in lines {
      match line.item {
        Some(item) => included.push(SnapshotLine {
          line_id: line.line_id,
          quantity: line.quantity,
          item,
        }),
        None => skipped_line_ids.push(line.line_id),
      }
    }
    Self {
      user_id,
      lines: included,
      skipped_line_ids,
    }
  }

  pub fn is_empty(&self) -> bool {
    self.lines.is_empty()
  }

  /// Ids of the lines that will be bought, and therefore cleared.
  pub fn line_ids(&self) -> Vec<Uuid> {
    self.lines.iter().map(|l| l.line_id).collect()
  }
}
