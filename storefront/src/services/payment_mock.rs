// storefront/src/services/payment_mock.rs

use crate::errors::PaymentError;
use crate::services::ports::{ChargeResult, PaymentGateway};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub const DECLINED_TOKEN: &str = "tok_chargeDeclined";
pub const ERROR_TOKEN: &str = "tok_error";

/// Stand-in payment processor.
///
/// Declines `tok_chargeDeclined`, fails `tok_error` as a processing error,
/// rejects a zero amount and approves everything else.
#[derive(Debug, Clone)]
pub struct MockPaymentGateway {
  account_id: String,
  latency: Duration,
}

impl MockPaymentGateway {
  pub fn new(account_id: impl Into<String>) -> Self {
    Self {
      account_id: account_id.into(),
      latency: Duration::from_millis(50),
    }
  }

  pub fn with_latency(mut self, latency: Duration) -> Self {
    self.latency = latency;
    self
  }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
  #[instrument(name = "MockPaymentGateway::charge", skip(self, source_token), fields(account_id = %self.account_id))]
  async fn charge(&self, amount: i64, currency: &str, source_token: &str) -> Result<ChargeResult, PaymentError> {
    if amount <= 0 {
      return Err(PaymentError::new("invalid_amount", "Amount must be greater than zero"));
    }
    tokio::time::sleep(self.latency).await;

    match source_token {
      DECLINED_TOKEN => {
        warn!("Mock charge declined.");
        Err(PaymentError::new("card_declined", "Your card was declined."))
      }
      ERROR_TOKEN => {
        warn!("Mock charge failed with a processing error.");
        Err(PaymentError::new("processing_error", "An error occurred while processing your card."))
      }
      _ => {
        let charge = ChargeResult {
          id: format!("ch_mock_{}", Uuid::new_v4().simple()),
          amount,
        };
        info!(charge_id = %charge.id, amount, currency, "Mock charge succeeded.");
        Ok(charge)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn gateway() -> MockPaymentGateway {
    MockPaymentGateway::new("acct_test").with_latency(Duration::ZERO)
  }

  #[tokio::test]
  async fn approves_and_echoes_amount() {
    let charge = gateway().charge(2000, "USD", "tok_visa").await.unwrap();
    assert_eq!(charge.amount, 2000);
    assert!(charge.id.starts_with("ch_mock_"));
  }

  #[tokio::test]
  async fn declines_test_tokens_and_zero_amounts() {
    assert_eq!(gateway().charge(100, "USD", DECLINED_TOKEN).await.unwrap_err().code, "card_declined");
    assert_eq!(gateway().charge(100, "USD", ERROR_TOKEN).await.unwrap_err().code, "processing_error");
    assert_eq!(gateway().charge(0, "USD", "tok_visa").await.unwrap_err().code, "invalid_amount");
  }
}
