// storefront/src/checkout/state.rs

use stagehand::FlowError;
use std::fmt;

/// Progress of one checkout attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutState {
  Unauthenticated,
  Authorized,
  CartLoaded,
  Priced,
  Charged,
  Persisted,
  CartCleared,
  Failed(String),
}

impl CheckoutState {
  pub fn is_terminal(&self) -> bool {
    matches!(self, CheckoutState::CartCleared | CheckoutState::Failed(_))
  }

  fn successor(&self) -> Option<CheckoutState> {
    use CheckoutState::*;
    match self {
      Unauthenticated => Some(Authorized),
      Authorized => Some(CartLoaded),
      CartLoaded => Some(Priced),
      Priced => Some(Charged),
      Charged => Some(Persisted),
      Persisted => Some(CartCleared),
      CartCleared | Failed(_) => None,
    }
  }

  /// Checked transition. `Failed` is reachable from every non-terminal
  /// state; otherwise only the next state in sequence is.
  pub fn advance(&self, next: CheckoutState) -> Result<CheckoutState, FlowError> {
    let allowed = match &next {
      CheckoutState::Failed(_) => !self.is_terminal(),
      other => self.successor().as_ref() == Some(other),
    };
    if allowed {
      Ok(next)
    } else {
      Err(FlowError::Internal(format!(
        "illegal checkout transition {} -> {}",
        self, next
      )))
    }
  }
}

impl fmt::Display for CheckoutState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CheckoutState::Failed(reason) => write!(f, "Failed({})", reason),
      other => write!(f, "{:?}", other),
    }
  }
}
