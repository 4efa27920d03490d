//! Authenticated actor identity and role-based authorization.
//!
//! An [`Identity`] is the snapshot of user fields embedded in a bearer token
//! at issue time. It can go stale relative to the credential store until the
//! token expires or is refreshed; handlers that need fresh data re-read the
//! user repository instead.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Error;

/// Workshop user role. Authorization is exact-match: `Admin` does not
/// implicitly satisfy a `Tech` requirement, there is no hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access including user management and audit views.
    Admin,
    /// Front-desk staff booking jobs in and notifying customers.
    Staff,
    /// Bench engineer writing repair reports.
    Tech,
}

impl Role {
    /// Canonical lowercase tag stored in the database and token payload.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Staff => "staff",
            Self::Tech => "tech",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stored or supplied role tag is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "staff" => Ok(Self::Staff),
            "tech" => Ok(Self::Tech),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}

/// The authenticated actor attached to a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Credential-store user id.
    pub id: i32,
    /// Unique login name.
    pub username: String,
    /// Display name shown in the UI and audit summaries.
    pub full_name: String,
    /// Role snapshot taken at token issue time.
    pub role: Role,
}

impl Identity {
    /// Enforce an exact-match role requirement.
    ///
    /// # Errors
    /// Returns [`ErrorCode::Forbidden`](super::ErrorCode::Forbidden) when the
    /// actor's role differs from `required`.
    pub fn require_role(&self, required: Role) -> Result<(), Error> {
        if self.role == required {
            Ok(())
        } else {
            Err(Error::forbidden("access denied: insufficient privileges"))
        }
    }

    /// Allow the actor when they are the referenced user or hold `Admin`.
    ///
    /// # Errors
    /// Returns a `Forbidden` error otherwise.
    pub fn require_self_or_admin(&self, user_id: i32) -> Result<(), Error> {
        if self.id == user_id || self.role == Role::Admin {
            Ok(())
        } else {
            Err(Error::forbidden("access denied: insufficient privileges"))
        }
    }
}
