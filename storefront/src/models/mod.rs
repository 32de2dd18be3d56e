// storefront/src/models/mod.rs

//! Storefront entities and the values passed between checkout stages.

pub mod cart_line;
pub mod catalog_item;
pub mod identity;
pub mod order;
pub mod order_line;

pub use cart_line::{CartLine, CartSnapshotLine};
pub use catalog_item::{CatalogItem, NewCatalogItem};
pub use identity::{Identity, Permission};
pub use order::{AssembledOrder, NewOrder, Order};
pub use order_line::{NewOrderLine, OrderLine};
