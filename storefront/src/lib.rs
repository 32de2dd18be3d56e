// storefront/src/lib.rs

//! A storefront backend built around a cancellation-safe checkout
//! workflow: cart snapshot, server-side pricing, charge, order persistence
//! and cart clear, serialized per user.

pub mod checkout;
pub mod config;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod requests;
pub mod service;
pub mod services;
pub mod state;
pub mod web;

pub use errors::{AppError, CheckoutError, PaymentError, StoreError};
pub use service::{CheckoutOutcome, StorefrontService};
pub use state::{AppState, Backends};
