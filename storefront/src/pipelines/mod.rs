// storefront/src/pipelines/mod.rs

//! Defines and registers the storefront's workflow pipelines.

use crate::errors::CheckoutError;
use stagehand::Stagehand;

pub mod cart_pipeline;
pub mod catalog_pipeline;
pub mod checkout_pipeline;
pub mod common_steps;
pub mod contexts;

/// Registers every storefront pipeline. Called once per registry.
pub fn register_all_pipelines(registry: &Stagehand<CheckoutError>) {
  tracing::info!("Registering storefront pipelines...");

  checkout_pipeline::register_checkout_pipeline(registry);
  cart_pipeline::register_add_to_cart_pipeline(registry);
  cart_pipeline::register_remove_from_cart_pipeline(registry);
  catalog_pipeline::register_create_item_pipeline(registry);

  tracing::info!("All storefront pipelines registered.");
}
