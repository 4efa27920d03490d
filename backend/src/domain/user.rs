//! User records as seen by the credential store and user-management flows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Role;

/// A persisted user account, minus the password hash.
///
/// The hash never leaves the persistence layer; handlers and responses work
/// with this shape only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique, immutable account id.
    pub id: i32,
    /// Unique login name, matched case-sensitively.
    pub username: String,
    /// Display name.
    pub full_name: String,
    /// Access role.
    pub role: Role,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Input for creating an account via registration.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub full_name: String,
    pub role: Role,
    /// Plaintext password, hashed by the credential store before persisting.
    pub password: String,
}

/// Partial update applied to an existing account.
///
/// `None` fields are left untouched. Role changes are restricted to admins
/// by the HTTP layer before this reaches a repository.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub full_name: Option<String>,
    pub role: Option<Role>,
    /// Plaintext replacement password, hashed before persisting.
    pub password: Option<String>,
}

impl UserUpdate {
    /// True when the update would touch nothing.
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.role.is_none() && self.password.is_none()
    }
}
