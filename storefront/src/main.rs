// storefront/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use storefront::checkout::KeyedCheckoutLocks;
use storefront::config::{AppConfig, LogFormat};
use storefront::services::{MemoryStore, MockPaymentGateway, PgStore};
use storefront::{AppState, Backends, StorefrontService};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_span_events(FmtSpan::CLOSE);
  match format {
    LogFormat::Json => builder.json().init(),
    LogFormat::Pretty => builder.init(),
  }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  let app_config = Arc::new(AppConfig::from_env().context("Failed to load application configuration")?);
  init_tracing(app_config.log_format);
  tracing::info!("Starting storefront server...");

  let gateway = Arc::new(MockPaymentGateway::new(app_config.mock_payment_account_id.clone()));
  let locks = Arc::new(KeyedCheckoutLocks::new());

  let backends = match &app_config.database_url {
    Some(url) => {
      let store = PgStore::connect(url).await.context("Database connection error")?;
      if app_config.seed_db {
        tracing::warn!("SEED_DB only applies to the in-memory backend; ignoring it.");
      }
      Backends::from_store(Arc::new(store), gateway, locks, app_config.checkout_currency.clone())
    }
    None => {
      tracing::warn!("DATABASE_URL not set; using in-memory stores. Data is lost on restart.");
      let store = Arc::new(MemoryStore::new());
      if app_config.seed_db {
        store.seed_demo_catalog();
      }
      Backends::from_store(store, gateway, locks, app_config.checkout_currency.clone())
    }
  };

  let app_state = AppState {
    service: Arc::new(StorefrontService::new(backends)),
    config: app_config.clone(),
  };
  tracing::info!("Storefront pipelines registered.");

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Binding server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(storefront::web::configure_app_routes)
  })
  .bind(&server_address)
  .with_context(|| format!("Failed to bind {}", server_address))?
  .run()
  .await
  .context("Server terminated with an error")?;

  Ok(())
}
