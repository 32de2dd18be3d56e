// storefront/src/services/mod.rs

//! External collaborators: store and gateway traits plus their in-memory,
//! PostgreSQL and mock implementations.

pub mod memory_store;
pub mod payment_mock;
pub mod pg_store;
pub mod ports;

pub use memory_store::MemoryStore;
pub use payment_mock::MockPaymentGateway;
pub use pg_store::PgStore;
pub use ports::{CartStore, CatalogStore, ChargeResult, OrderStore, PaymentGateway};
