// storefront/src/checkout/pricing.rs

//! Server-side price computation. Pure and synchronous.

use crate::checkout::snapshot::SnapshotLine;
use crate::errors::CheckoutError;

/// Anything with a unit price and a quantity.
pub trait Priced {
  fn unit_price(&self) -> i64;
  fn quantity(&self) -> i64;
}

/// A bare `(price, quantity)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceLine {
  pub price: i64,
  pub quantity: i64,
}

impl Priced for PriceLine {
  fn unit_price(&self) -> i64 {
    self.price
  }

  fn quantity(&self) -> i64 {
    self.quantity
  }
}

impl Priced for SnapshotLine {
  fn unit_price(&self) -> i64 {
    self.item.price
  }

  fn quantity(&self) -> i64 {
    i64::from(self.quantity)
  }
}

/// Sum of `price * quantity` in minor units. An empty slice totals 0.
///
/// Fails with `CheckoutError::Validation` on a negative price or quantity,
/// or if the total does not fit in an `i64`.
pub fn compute_total<L: Priced>(lines: &[L]) -> Result<i64, CheckoutError> {
  lines.iter().try_fold(0i64, |total, line| {
    let (price, quantity) = (line.unit_price(), line.quantity());
    if price < 0 {
      return Err(CheckoutError::Validation(format!("Negative price {} in cart", price)));
    }
    if quantity < 0 {
      return Err(CheckoutError::Validation(format!("Negative quantity {} in cart", quantity)));
    }
    price
      .checked_mul(quantity)
      .and_then(|subtotal| total.checked_add(subtotal))
      .ok_or_else(|| CheckoutError::Validation("Cart total is too large".to_string()))
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn line(price: i64, quantity: i64) -> PriceLine {
    PriceLine { price, quantity }
  }

  #[test]
  fn empty_cart_totals_zero() {
    assert_eq!(compute_total::<PriceLine>(&[]).unwrap(), 0);
  }

  #[test]
  fn sums_price_times_quantity() {
    assert_eq!(compute_total(&[line(500, 2), line(1000, 1)]).unwrap(), 2000);
    assert_eq!(compute_total(&[line(0, 7), line(199, 0), line(1, 1)]).unwrap(), 1);
  }

  #[test]
  fn matches_naive_sum_over_many_shapes() {
    for n in 0..20i64 {
      let lines: Vec<PriceLine> = (0..n).map(|i| line(i * 37 + 1, i % 5)).collect();
      let expected: i64 = lines.iter().map(|l| l.price * l.quantity).sum();
      assert_eq!(compute_total(&lines).unwrap(), expected);
    }
  }

  #[test]
  fn rejects_negative_values() {
    assert!(matches!(compute_total(&[line(-1, 1)]), Err(CheckoutError::Validation(_))));
    assert!(matches!(compute_total(&[line(100, 1), line(10, -2)]), Err(CheckoutError::Validation(_))));
  }

  #[test]
  fn rejects_overflow() {
    assert!(matches!(compute_total(&[line(i64::MAX, 2)]), Err(CheckoutError::Validation(_))));
    assert!(matches!(
      compute_total(&[line(i64::MAX, 1), line(1, 1)]),
      Err(CheckoutError::Validation(_))
    ));
  }
}
