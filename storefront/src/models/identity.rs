// storefront/src/models/identity.rs

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Permission {
  Admin,
  User,
  ItemCreate,
}

impl FromStr for Permission {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_uppercase().as_str() {
      "ADMIN" => Ok(Permission::Admin),
      "USER" => Ok(Permission::User),
      "ITEMCREATE" => Ok(Permission::ItemCreate),
      other => Err(format!("unknown permission '{}'", other)),
    }
  }
}

/// Who is making a call. Supplied by the identity provider and passed
/// explicitly to every storefront operation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Identity {
  #[default]
  Anonymous,
  User { user_id: Uuid, permissions: Vec<Permission> },
}

impl Identity {
  pub fn user(user_id: Uuid) -> Self {
    Identity::User {
      user_id,
      permissions: vec![Permission::User],
    }
  }

  pub fn with_permissions(user_id: Uuid, permissions: Vec<Permission>) -> Self {
    Identity::User { user_id, permissions }
  }

  pub fn user_id(&self) -> Option<Uuid> {
    match self {
      Identity::Anonymous => None,
      Identity::User { user_id, .. } => Some(*user_id),
    }
  }

  pub fn has_permission(&self, permission: Permission) -> bool {
    match self {
      Identity::Anonymous => false,
      Identity::User { permissions, .. } => permissions.contains(&permission),
    }
  }
}
