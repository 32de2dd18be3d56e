// storefront/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Pretty,
  Json,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  /// `None` runs the storefront on in-memory stores.
  pub database_url: Option<String>,
  /// ISO-4217 code every checkout is charged in.
  pub checkout_currency: String,
  pub mock_payment_account_id: String,
  /// Seeds a demo catalog into the in-memory stores.
  pub seed_db: bool,
  pub log_format: LogFormat,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the configuration from an arbitrary variable source.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

    let server_host = get("SERVER_HOST", "127.0.0.1");
    let server_port = get("SERVER_PORT", "8080")
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

    let checkout_currency = get("CHECKOUT_CURRENCY", "USD").to_ascii_uppercase();
    if checkout_currency.len() != 3 || !checkout_currency.chars().all(|c| c.is_ascii_alphabetic()) {
      return Err(AppError::Config(format!(
        "Invalid CHECKOUT_CURRENCY '{}': expected a 3-letter ISO-4217 code",
        checkout_currency
      )));
    }

    let mock_payment_account_id = get("MOCK_PAYMENT_ACCOUNT_ID", "mock_main_acct");

    let seed_db = get("SEED_DB", "false")
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid SEED_DB value: {}", e)))?;

    let log_format = match get("LOG_FORMAT", "pretty").to_ascii_lowercase().as_str() {
      "pretty" => LogFormat::Pretty,
      "json" => LogFormat::Json,
      other => return Err(AppError::Config(format!("Invalid LOG_FORMAT '{}'", other))),
    };

    tracing::info!(
      server_host = %server_host,
      server_port,
      persistence = if database_url.is_some() { "postgres" } else { "memory" },
      currency = %checkout_currency,
      "Application configuration loaded."
    );

    Ok(Self {
      server_host,
      server_port,
      database_url,
      checkout_currency,
      mock_payment_account_id,
      seed_db,
      log_format,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig> {
    let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    AppConfig::from_lookup(|name| map.get(name).cloned())
  }

  #[test]
  fn defaults_select_memory_backend() {
    let cfg = config_from(&[]).unwrap();
    assert_eq!(cfg.server_host, "127.0.0.1");
    assert_eq!(cfg.server_port, 8080);
    assert!(cfg.database_url.is_none());
    assert_eq!(cfg.checkout_currency, "USD");
    assert_eq!(cfg.mock_payment_account_id, "mock_main_acct");
    assert!(!cfg.seed_db);
    assert_eq!(cfg.log_format, LogFormat::Pretty);
  }

  #[test]
  fn rejects_malformed_values() {
    assert!(matches!(config_from(&[("SERVER_PORT", "http")]), Err(AppError::Config(_))));
    assert!(matches!(config_from(&[("CHECKOUT_CURRENCY", "EURO")]), Err(AppError::Config(_))));
    assert!(matches!(config_from(&[("SEED_DB", "yes")]), Err(AppError::Config(_))));
    assert!(matches!(config_from(&[("LOG_FORMAT", "xml")]), Err(AppError::Config(_))));
  }

  #[test]
  fn currency_is_normalised() {
    let cfg = config_from(&[("CHECKOUT_CURRENCY", "eur"), ("DATABASE_URL", "postgres://localhost/shop")]).unwrap();
    assert_eq!(cfg.checkout_currency, "EUR");
    assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/shop"));
  }
}
