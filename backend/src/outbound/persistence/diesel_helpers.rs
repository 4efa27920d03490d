//! Shared error mapping for Diesel repository implementations.

use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind};
use tracing::debug;

use crate::domain::Error;

use super::pool::PoolError;

/// Unique constraint on `users.username`.
const USERNAME_CONSTRAINT: &str = "users_username_key";

/// Map a pool failure onto the domain: the database is unreachable or the
/// pool is exhausted, so callers should treat the service as degraded rather
/// than broken.
pub fn map_pool_error(error: PoolError) -> Error {
    Error::service_unavailable(error.to_string())
}

/// Map a Diesel failure onto the domain, logging the raw error server-side.
///
/// Only the username constraint maps to a client-facing validation message;
/// any other unique violation (the report-per-job index included) is an
/// internal error, so its message never claims a username conflict. The HTTP
/// adapter redacts internal messages before they reach a client.
pub fn map_diesel_error(error: diesel::result::Error, operation: &str) -> Error {
    debug!(error = %error, operation, "diesel operation failed");
    match &error {
        diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            match info.constraint_name() {
                Some(USERNAME_CONSTRAINT) => Error::invalid_request("username already exists"),
                _ => Error::internal(format!("{operation} failed: {error}")),
            }
        }
        diesel::result::Error::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            Error::service_unavailable(info.message().to_owned())
        }
        _ => Error::internal(format!("{operation} failed: {error}")),
    }
}
