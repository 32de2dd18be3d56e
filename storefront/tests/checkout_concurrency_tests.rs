// tests/checkout_concurrency_tests.rs
mod common;

use common::*;
use serial_test::serial;
use std::time::Duration;
use stagehand::FlowError;
use storefront::requests::{AddToCartRequest, RemoveFromCartRequest};
use storefront::CheckoutError;

#[tokio::test]
#[serial]
async fn test_concurrent_checkouts_for_one_user_charge_once() {
  let h = Harness::new();
  let (user_id, me) = signed_in();
  let mug = h.add_item("Mug", 500);
  h.put_in_cart(&me, &mug, 2).await;
  h.gateway.set_delay(Duration::from_millis(20));

  let (first, second) = tokio::join!(
    h.service.checkout(&me, token("tok_visa")),
    h.service.checkout(&me, token("tok_visa"))
  );

  let results = [first, second];
  let succeeded = results.iter().filter(|r| r.is_ok()).count();
  let conflicted = results
    .iter()
    .filter(|r| matches!(r, Err(CheckoutError::ConcurrencyConflict { user_id: id }) if *id == user_id))
    .count();
  assert_eq!(succeeded, 1);
  assert_eq!(conflicted, 1);
  assert_eq!(h.gateway.call_count(), 1);
  assert_eq!(h.store.order_count(), 1);
  assert!(h.lines_of(user_id).is_empty());
  assert!(!h.locks.is_held(user_id));
}

#[tokio::test]
#[serial]
async fn test_different_users_check_out_in_parallel() {
  let h = Harness::new();
  let (_, alice) = signed_in();
  let (_, bob) = signed_in();
  let mug = h.add_item("Mug", 500);
  h.put_in_cart(&alice, &mug, 1).await;
  h.put_in_cart(&bob, &mug, 3).await;
  h.gateway.set_delay(Duration::from_millis(20));

  let (a, b) = tokio::join!(
    h.service.checkout(&alice, token("tok_visa")),
    h.service.checkout(&bob, token("tok_visa"))
  );

  assert_eq!(a.unwrap().total, 500);
  assert_eq!(b.unwrap().total, 1_500);
  assert_eq!(h.store.order_count(), 2);
}

#[tokio::test]
#[serial]
async fn test_cancelled_caller_after_charge_still_gets_order_recorded() {
  let h = Harness::new();
  let (user_id, me) = signed_in();
  let tote = h.add_item("Tote", 2_400);
  h.put_in_cart(&me, &tote, 1).await;
  h.gateway.set_delay(Duration::from_millis(50));

  let cancelled = tokio::time::timeout(Duration::from_millis(10), h.service.checkout(&me, token("tok_visa"))).await;
  assert!(cancelled.is_err(), "caller should have timed out while the charge was in flight");

  tokio::time::sleep(Duration::from_millis(200)).await;

  assert_eq!(h.gateway.call_count(), 1);
  assert_eq!(h.store.order_count(), 1);
  assert!(h.lines_of(user_id).is_empty());
  assert!(!h.locks.is_held(user_id));

  let orders = h.service.orders(&me).await.unwrap();
  assert_eq!(orders[0].total, 2_400);
}

#[tokio::test]
#[serial]
async fn test_cancelled_caller_before_charge_leaves_no_trace() {
  let h = Harness::new();
  let (user_id, me) = signed_in();
  let tote = h.add_item("Tote", 2_400);
  h.put_in_cart(&me, &tote, 1).await;
  *h.carts.load_delay.lock() = Duration::from_millis(50);

  let cancelled = tokio::time::timeout(Duration::from_millis(10), h.service.checkout(&me, token("tok_visa"))).await;
  assert!(cancelled.is_err());
  assert!(!h.locks.is_held(user_id));

  tokio::time::sleep(Duration::from_millis(100)).await;

  assert_eq!(h.gateway.call_count(), 0);
  assert_eq!(h.store.order_count(), 0);
  assert_eq!(h.lines_of(user_id).len(), 1);

  *h.carts.load_delay.lock() = Duration::ZERO;
  let order = h.service.checkout(&me, token("tok_visa")).await.unwrap();
  assert_eq!(order.total, 2_400);
}

#[tokio::test]
#[serial]
async fn test_retry_after_decline_succeeds_with_one_order() {
  let h = Harness::new();
  let (user_id, me) = signed_in();
  let boots = h.add_item("Boots", 12_500);
  h.put_in_cart(&me, &boots, 1).await;

  h.gateway.decline_with("insufficient_funds");
  assert!(matches!(
    h.service.checkout(&me, token("tok_visa")).await,
    Err(CheckoutError::Payment { .. })
  ));
  assert!(!h.locks.is_held(user_id));

  h.gateway.approve();
  let order = h.service.checkout(&me, token("tok_visa")).await.unwrap();

  assert_eq!(order.total, 12_500);
  assert_eq!(h.gateway.call_count(), 2);
  assert_eq!(*h.gateway.charged.lock(), vec![12_500]);
  assert_eq!(h.store.order_count(), 1);
  assert!(h.lines_of(user_id).is_empty());
}

#[tokio::test]
#[serial]
async fn test_adding_a_snapshot_item_during_checkout_loses_no_units() {
  let h = Harness::new();
  let (user_id, me) = signed_in();
  let mug = h.add_item("Mug", 500);
  h.put_in_cart(&me, &mug, 1).await;
  h.gateway.set_delay(Duration::from_millis(50));

  let service = h.service.clone();
  let checkout_me = me.clone();
  let checkout = tokio::spawn(async move { service.checkout(&checkout_me, token("tok_visa")).await });

  tokio::time::sleep(Duration::from_millis(10)).await;
  let during = h.service.add_to_cart(&me, AddToCartRequest { item_id: mug.id }).await;
  assert!(matches!(during, Err(CheckoutError::ConcurrencyConflict { .. })));

  let order = checkout.await.unwrap().unwrap();
  let charged: i32 = order.lines.iter().map(|l| l.quantity).sum();
  let remaining: i32 = h.lines_of(user_id).iter().map(|l| l.quantity).sum();
  assert_eq!(charged + remaining, 1);
  assert_eq!(order.total, 500);

  h.put_in_cart(&me, &mug, 1).await;
  let remaining: i32 = h.lines_of(user_id).iter().map(|l| l.quantity).sum();
  assert_eq!(remaining, 1);
}

#[tokio::test]
#[serial]
async fn test_removing_a_snapshot_line_during_checkout_is_refused() {
  let h = Harness::new();
  let (user_id, me) = signed_in();
  let mug = h.add_item("Mug", 500);
  let poster = h.add_item("Poster", 1_000);
  h.put_in_cart(&me, &mug, 1).await;
  h.put_in_cart(&me, &poster, 1).await;
  let poster_line = h.lines_of(user_id).into_iter().find(|l| l.item_id == poster.id).unwrap().id;
  h.gateway.set_delay(Duration::from_millis(50));

  let service = h.service.clone();
  let checkout_me = me.clone();
  let checkout = tokio::spawn(async move { service.checkout(&checkout_me, token("tok_visa")).await });

  tokio::time::sleep(Duration::from_millis(10)).await;
  let during = h
    .service
    .remove_from_cart(&me, RemoveFromCartRequest { line_id: poster_line })
    .await;
  assert!(matches!(during, Err(CheckoutError::ConcurrencyConflict { .. })));

  let order = checkout.await.unwrap().unwrap();
  assert_eq!(order.total, 1_500);
  assert!(h.lines_of(user_id).is_empty());
  assert!(!h.locks.is_held(user_id));
}

#[tokio::test]
#[serial]
async fn test_cart_edits_before_and_after_checkout_are_allowed() {
  let h = Harness::new();
  let (user_id, me) = signed_in();
  let mug = h.add_item("Mug", 500);
  let poster = h.add_item("Poster", 1_000);
  h.put_in_cart(&me, &mug, 1).await;

  h.service.checkout(&me, token("tok_visa")).await.unwrap();
  assert!(!h.locks.is_held(user_id));

  h.put_in_cart(&me, &poster, 1).await;
  let line_id = h.lines_of(user_id)[0].id;
  assert!(!h.locks.is_held(user_id));
  h.service
    .remove_from_cart(&me, RemoveFromCartRequest { line_id })
    .await
    .unwrap();
  assert!(h.lines_of(user_id).is_empty());
  assert!(!h.locks.is_held(user_id));
}

#[tokio::test]
#[serial]
async fn test_crash_after_charge_is_reported_for_reconciliation() {
  let h = Harness::with_panicking_orders();
  let (user_id, me) = signed_in();
  let tote = h.add_item("Tote", 2_400);
  h.put_in_cart(&me, &tote, 1).await;
  let (events, _guard) = capture_events();

  let result = h.service.checkout(&me, token("tok_visa")).await;

  assert!(matches!(
    result,
    Err(CheckoutError::Workflow {
      source: FlowError::Detached { .. }
    })
  ));
  assert_eq!(*h.gateway.charged.lock(), vec![2_400]);
  let reports = events.on_target("reconciliation");
  assert!(
    reports.iter().any(|r| r.contains("ch_test_") && r.contains("amount=2400")),
    "no reconciliation event carries the charge: {:?}",
    reports
  );
  assert_eq!(h.lines_of(user_id).len(), 1);
  assert!(!h.locks.is_held(user_id));
}
