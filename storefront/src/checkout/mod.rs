// storefront/src/checkout/mod.rs

//! The checkout core: snapshot, pricing, order assembly, per-user locking
//! and the state the workflow moves through.

pub mod assembler;
pub mod locks;
pub mod pricing;
pub mod snapshot;
pub mod state;

pub use assembler::assemble;
pub use locks::{CheckoutLocks, CheckoutPermit, KeyedCheckoutLocks};
pub use pricing::{compute_total, PriceLine, Priced};
pub use snapshot::{CartSnapshot, SnapshotLine};
pub use state::CheckoutState;
