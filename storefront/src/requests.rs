// storefront/src/requests.rs

//! Typed request bodies, validated at the boundary before any workflow
//! runs.

use crate::errors::CheckoutError;
use crate::models::NewCatalogItem;
use serde::Deserialize;
use uuid::Uuid;

pub trait Validate {
  fn validate(&self) -> Result<(), CheckoutError>;
}

/// Starts a checkout. Carries no amount: the total is recomputed from the
/// stored cart, and unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
  pub payment_token: String,
}

impl Validate for CheckoutRequest {
  fn validate(&self) -> Result<(), CheckoutError> {
    let token = self.payment_token.as_str();
    if token.is_empty() {
      return Err(CheckoutError::Validation("payment_token is required".to_string()));
    }
    if token.len() > 255 || token.chars().any(|c| c.is_whitespace() || c.is_control()) {
      return Err(CheckoutError::Validation("payment_token is malformed".to_string()));
    }
    Ok(())
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddToCartRequest {
  pub item_id: Uuid,
}

impl Validate for AddToCartRequest {
  fn validate(&self) -> Result<(), CheckoutError> {
    if self.item_id.is_nil() {
      return Err(CheckoutError::Validation("item_id must not be nil".to_string()));
    }
    Ok(())
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoveFromCartRequest {
  pub line_id: Uuid,
}

impl Validate for RemoveFromCartRequest {
  fn validate(&self) -> Result<(), CheckoutError> {
    if self.line_id.is_nil() {
      return Err(CheckoutError::Validation("line_id must not be nil".to_string()));
    }
    Ok(())
  }
}

/// Adds an item to the catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateItemRequest {
  pub title: String,
  #[serde(default)]
  pub description: String,
  /// Minor currency units.
  pub price: i64,
  #[serde(default)]
  pub image: Option<String>,
  #[serde(default)]
  pub large_image: Option<String>,
}

impl Validate for CreateItemRequest {
  fn validate(&self) -> Result<(), CheckoutError> {
    if self.title.trim().is_empty() {
      return Err(CheckoutError::Validation("title is required".to_string()));
    }
    if self.price < 0 {
      return Err(CheckoutError::Validation("price must not be negative".to_string()));
    }
    Ok(())
  }
}

impl CreateItemRequest {
  pub fn into_new_item(self) -> NewCatalogItem {
    NewCatalogItem {
      title: self.title.trim().to_string(),
      description: self.description,
      price: self.price,
      image: self.image,
      large_image: self.large_image,
    }
  }
}
