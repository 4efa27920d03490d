//! Port for user account persistence.

use async_trait::async_trait;

use crate::domain::{Error, NewUser, User, UserUpdate};

/// Credential-store CRUD used by registration and user management.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All accounts, oldest first.
    async fn list(&self) -> Result<Vec<User>, Error>;

    /// Look up an account by id.
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, Error>;

    /// Create an account, hashing the password, returning the new id.
    ///
    /// Fails with `InvalidRequest` when the username is already taken.
    async fn create(&self, new_user: NewUser) -> Result<i32, Error>;

    /// Apply a partial update; `None` fields are untouched.
    ///
    /// Fails with `NotFound` when the id does not exist.
    async fn update(&self, id: i32, update: UserUpdate) -> Result<(), Error>;

    /// Delete an account and scrub its references in one transaction:
    /// the user's own activity rows are removed, while job and report
    /// actor columns are nulled rather than cascade-deleted to preserve
    /// job history. Returns the deleted username for audit purposes.
    async fn delete_cascading(&self, id: i32) -> Result<String, Error>;
}
