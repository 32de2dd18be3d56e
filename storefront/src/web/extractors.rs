// storefront/src/web/extractors.rs

//! Request identity, standing in for an external identity provider.
//!
//! `X-User-ID` carries the signed-in user's id and `X-User-Permissions` an
//! optional comma-separated permission list. No `X-User-ID` header means
//! an anonymous caller.

use crate::errors::AppError;
use crate::models::{Identity, Permission};
use actix_web::{FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::warn;
use uuid::Uuid;

pub const USER_ID_HEADER: &str = "X-User-ID";
pub const PERMISSIONS_HEADER: &str = "X-User-Permissions";

fn identity_from_request(req: &HttpRequest) -> Result<Identity, AppError> {
  let Some(raw_user_id) = req.headers().get(USER_ID_HEADER) else {
    return Ok(Identity::Anonymous);
  };
  let user_id = raw_user_id
    .to_str()
    .ok()
    .and_then(|s| Uuid::parse_str(s.trim()).ok())
    .ok_or_else(|| {
      warn!("Malformed {} header.", USER_ID_HEADER);
      AppError::BadRequest(format!("Malformed {} header", USER_ID_HEADER))
    })?;

  let mut permissions = vec![Permission::User];
  if let Some(raw) = req.headers().get(PERMISSIONS_HEADER).and_then(|v| v.to_str().ok()) {
    for name in raw.split(',').filter(|s| !s.trim().is_empty()) {
      match name.parse::<Permission>() {
        Ok(p) if !permissions.contains(&p) => permissions.push(p),
        Ok(_) => {}
        Err(e) => warn!(error = %e, "Ignoring unknown permission."),
      }
    }
  }
  Ok(Identity::with_permissions(user_id, permissions))
}

impl FromRequest for Identity {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    ready(identity_from_request(req))
  }
}
