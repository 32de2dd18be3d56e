// tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use storefront::checkout::KeyedCheckoutLocks;
use storefront::models::{CartLine, CartSnapshotLine, CatalogItem, Identity, NewOrder, NewOrderLine, Order};
use storefront::requests::AddToCartRequest;
use storefront::services::{CartStore, ChargeResult, MemoryStore, OrderStore, PaymentGateway};
use storefront::{Backends, PaymentError, StoreError, StorefrontService};
use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context as LayerContext, Layer, SubscriberExt};
use uuid::Uuid;

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

/// Payment gateway that records every charge and can be told to decline,
/// stall, or charge a different amount.
#[derive(Default)]
pub struct ScriptedGateway {
  pub charged: Mutex<Vec<i64>>,
  pub calls: AtomicUsize,
  pub delay: Mutex<Duration>,
  pub decline: Mutex<Option<PaymentError>>,
  pub charge_override: Mutex<Option<i64>>,
}

impl ScriptedGateway {
  pub fn call_count(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }

  pub fn set_delay(&self, delay: Duration) {
    *self.delay.lock() = delay;
  }

  pub fn decline_with(&self, code: &str) {
    *self.decline.lock() = Some(PaymentError::new(code, "scripted decline"));
  }

  pub fn approve(&self) {
    *self.decline.lock() = None;
  }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
  async fn charge(&self, amount: i64, _currency: &str, _source_token: &str) -> Result<ChargeResult, PaymentError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    let delay = *self.delay.lock();
    if !delay.is_zero() {
      tokio::time::sleep(delay).await;
    }
    if let Some(err) = self.decline.lock().clone() {
      return Err(err);
    }
    let charged = self.charge_override.lock().unwrap_or(amount);
    self.charged.lock().push(charged);
    Ok(ChargeResult {
      id: format!("ch_test_{}", Uuid::new_v4().simple()),
      amount: charged,
    })
  }
}

/// Cart store over `MemoryStore` that counts reads and can stall or fail.
pub struct ProbeCartStore {
  pub inner: Arc<MemoryStore>,
  pub loads: AtomicUsize,
  pub load_delay: Mutex<Duration>,
  pub fail_deletes: AtomicBool,
}

impl ProbeCartStore {
  pub fn new(inner: Arc<MemoryStore>) -> Self {
    Self {
      inner,
      loads: AtomicUsize::new(0),
      load_delay: Mutex::new(Duration::ZERO),
      fail_deletes: AtomicBool::new(false),
    }
  }

  pub fn load_count(&self) -> usize {
    self.loads.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl CartStore for ProbeCartStore {
  async fn load_by_user(&self, user_id: Uuid) -> Result<Vec<CartSnapshotLine>, StoreError> {
    self.loads.fetch_add(1, Ordering::SeqCst);
    let delay = *self.load_delay.lock();
    if !delay.is_zero() {
      tokio::time::sleep(delay).await;
    }
    self.inner.load_by_user(user_id).await
  }

  async fn find_line(&self, line_id: Uuid) -> Result<Option<CartLine>, StoreError> {
    self.inner.find_line(line_id).await
  }

  async fn increment_quantity(&self, user_id: Uuid, item_id: Uuid) -> Result<CartLine, StoreError> {
    self.inner.increment_quantity(user_id, item_id).await
  }

  async fn delete_by_ids(&self, line_ids: &[Uuid]) -> Result<u64, StoreError> {
    if self.fail_deletes.load(Ordering::SeqCst) {
      return Err(StoreError::Unavailable("cart table locked".to_string()));
    }
    self.inner.delete_by_ids(line_ids).await
  }
}

/// Order store whose writes always fail; reads go to `MemoryStore`.
pub struct FailingOrderStore {
  pub inner: Arc<MemoryStore>,
}

#[async_trait]
impl OrderStore for FailingOrderStore {
  async fn create(&self, _order: &NewOrder, _lines: &[NewOrderLine]) -> Result<Order, StoreError> {
    Err(StoreError::Unavailable("orders table unreachable".to_string()))
  }

  async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, StoreError> {
    self.inner.list_by_user(user_id).await
  }

  async fn find(&self, order_id: Uuid) -> Result<Option<Order>, StoreError> {
    self.inner.find(order_id).await
  }
}

/// Order store that panics on write; reads go to `MemoryStore`.
pub struct PanickingOrderStore {
  pub inner: Arc<MemoryStore>,
}

#[async_trait]
impl OrderStore for PanickingOrderStore {
  async fn create(&self, _order: &NewOrder, _lines: &[NewOrderLine]) -> Result<Order, StoreError> {
    panic!("order store crashed mid-write");
  }

  async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, StoreError> {
    self.inner.list_by_user(user_id).await
  }

  async fn find(&self, order_id: Uuid) -> Result<Option<Order>, StoreError> {
    self.inner.find(order_id).await
  }
}

/// Events recorded by `capture_events`, as `(target, fields)`.
#[derive(Clone, Default)]
pub struct CapturedEvents(Arc<Mutex<Vec<(String, String)>>>);

impl CapturedEvents {
  pub fn on_target(&self, target: &str) -> Vec<String> {
    self
      .0
      .lock()
      .iter()
      .filter(|(t, _)| t == target)
      .map(|(_, fields)| fields.clone())
      .collect()
  }
}

struct FieldText(String);

impl Visit for FieldText {
  fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
    self.0.push_str(&format!("{}={:?} ", field.name(), value));
  }
}

struct CaptureLayer(CapturedEvents);

impl<S: Subscriber> Layer<S> for CaptureLayer {
  fn on_event(&self, event: &Event<'_>, _ctx: LayerContext<'_, S>) {
    let mut fields = FieldText(String::new());
    event.record(&mut fields);
    self.0 .0.lock().push((event.metadata().target().to_string(), fields.0));
  }
}

/// Records every event emitted on this thread while the guard lives.
/// Only meaningful on a current-thread runtime.
pub fn capture_events() -> (CapturedEvents, DefaultGuard) {
  let events = CapturedEvents::default();
  let subscriber = tracing_subscriber::registry().with(CaptureLayer(events.clone()));
  let guard = tracing::subscriber::set_default(subscriber);
  (events, guard)
}

pub struct Harness {
  pub store: Arc<MemoryStore>,
  pub carts: Arc<ProbeCartStore>,
  pub gateway: Arc<ScriptedGateway>,
  pub locks: KeyedCheckoutLocks,
  pub service: Arc<StorefrontService>,
}

impl Harness {
  pub fn new() -> Self {
    Self::build(|store| store)
  }

  /// Every order write fails.
  pub fn with_failing_orders() -> Self {
    Self::build(|store| Arc::new(FailingOrderStore { inner: store }))
  }

  /// Every order write panics.
  pub fn with_panicking_orders() -> Self {
    Self::build(|store| Arc::new(PanickingOrderStore { inner: store }))
  }

  fn build(orders_for: impl FnOnce(Arc<MemoryStore>) -> Arc<dyn OrderStore>) -> Self {
    setup_tracing();
    let store = Arc::new(MemoryStore::new());
    let carts = Arc::new(ProbeCartStore::new(store.clone()));
    let gateway = Arc::new(ScriptedGateway::default());
    let locks = KeyedCheckoutLocks::new();
    let orders = orders_for(store.clone());
    let backends = Backends {
      catalog: store.clone(),
      carts: carts.clone(),
      orders,
      gateway: gateway.clone(),
      locks: Arc::new(locks.clone()),
      currency: "USD".to_string(),
    };
    Self {
      store,
      carts,
      gateway,
      locks,
      service: Arc::new(StorefrontService::new(backends)),
    }
  }

  pub fn add_item(&self, title: &str, price: i64) -> CatalogItem {
    let item = CatalogItem {
      id: Uuid::new_v4(),
      title: title.to_string(),
      description: format!("A {}", title),
      price,
      image: Some(format!("{}.jpg", title.to_lowercase())),
      large_image: None,
    };
    self.store.insert_item(item.clone());
    item
  }

  /// Adds `quantity` units of `item` to the identity's cart.
  pub async fn put_in_cart(&self, identity: &Identity, item: &CatalogItem, quantity: usize) {
    for _ in 0..quantity {
      self
        .service
        .add_to_cart(identity, AddToCartRequest { item_id: item.id })
        .await
        .expect("add to cart");
    }
  }

  pub fn lines_of(&self, user_id: Uuid) -> Vec<CartLine> {
    self.store.cart_lines().into_iter().filter(|l| l.user_id == user_id).collect()
  }
}

pub fn signed_in() -> (Uuid, Identity) {
  let user_id = Uuid::new_v4();
  (user_id, Identity::user(user_id))
}

pub fn token(t: &str) -> storefront::requests::CheckoutRequest {
  storefront::requests::CheckoutRequest {
    payment_token: t.to_string(),
  }
}
