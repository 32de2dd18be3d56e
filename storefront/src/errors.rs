// storefront/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use stagehand::FlowError;
use thiserror::Error;
use uuid::Uuid;

/// Failures of the cart, order and catalog stores.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("Store unavailable: {0}")]
  Unavailable(String),

  #[error("Store conflict: {0}")]
  Conflict(String),

  #[error("Database error: {0}")]
  Sqlx(#[from] sqlx::Error),
}

/// A declined or failed charge, as reported by the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Payment failed ({code}): {message}")]
pub struct PaymentError {
  pub code: String,
  pub message: String,
}

impl PaymentError {
  pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
    Self {
      code: code.into(),
      message: message.into(),
    }
  }
}

/// Every way a storefront operation can fail. Callers match on the kind;
/// nothing is retried on their behalf.
#[derive(Debug, Error)]
pub enum CheckoutError {
  #[error("You must be signed in to do that.")]
  Unauthenticated,

  #[error("Your cart is empty.")]
  EmptyCart,

  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Payment Error ({code}): {message}")]
  Payment { code: String, message: String },

  /// The order could not be written after the charge went through.
  #[error("Order could not be saved after charge {charge_id}: {message}")]
  Persistence { message: String, charge_id: String },

  #[error("Another checkout is already running for user {user_id}.")]
  ConcurrencyConflict { user_id: Uuid },

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Store Error: {0}")]
  Store(#[from] StoreError),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },
}

impl From<PaymentError> for CheckoutError {
  fn from(err: PaymentError) -> Self {
    CheckoutError::Payment {
      code: err.code,
      message: err.message,
    }
  }
}

impl CheckoutError {
  /// Stable machine-readable name of the error kind.
  pub fn kind(&self) -> &'static str {
    match self {
      CheckoutError::Unauthenticated => "unauthenticated",
      CheckoutError::EmptyCart => "empty_cart",
      CheckoutError::Validation(_) => "validation",
      CheckoutError::Payment { .. } => "payment",
      CheckoutError::Persistence { .. } => "persistence",
      CheckoutError::ConcurrencyConflict { .. } => "concurrency_conflict",
      CheckoutError::NotFound(_) => "not_found",
      CheckoutError::Forbidden(_) => "forbidden",
      CheckoutError::Store(_) => "store",
      CheckoutError::Workflow { .. } => "workflow",
    }
  }
}

/// Errors at the HTTP edge.
#[derive(Debug, Error)]
pub enum AppError {
  #[error(transparent)]
  Checkout(#[from] CheckoutError),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Bad Request: {0}")]
  BadRequest(String),
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Checkout(err) => match err {
        CheckoutError::Unauthenticated => StatusCode::UNAUTHORIZED,
        CheckoutError::EmptyCart | CheckoutError::Validation(_) => StatusCode::BAD_REQUEST,
        CheckoutError::Payment { .. } => StatusCode::PAYMENT_REQUIRED,
        CheckoutError::Forbidden(_) => StatusCode::FORBIDDEN,
        CheckoutError::NotFound(_) => StatusCode::NOT_FOUND,
        CheckoutError::ConcurrencyConflict { .. } => StatusCode::CONFLICT,
        CheckoutError::Persistence { .. } | CheckoutError::Store(_) | CheckoutError::Workflow { .. } => {
          StatusCode::INTERNAL_SERVER_ERROR
        }
      },
      AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
      AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    let (kind, message) = match self {
      // Internal details stay in the logs.
      AppError::Checkout(err @ (CheckoutError::Store(_) | CheckoutError::Workflow { .. })) => {
        (err.kind(), "An internal error occurred.".to_string())
      }
      AppError::Checkout(err @ CheckoutError::Persistence { .. }) => (
        err.kind(),
        "Your payment was taken but the order could not be saved. Support has been notified.".to_string(),
      ),
      AppError::Checkout(err) => (err.kind(), err.to_string()),
      AppError::Config(_) => ("config", "Configuration issue".to_string()),
      AppError::BadRequest(m) => ("bad_request", m.clone()),
    };
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, "Responding with error");
    }
    HttpResponse::build(status).json(json!({ "error": message, "kind": kind }))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
