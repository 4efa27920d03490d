//! Driving port for credential verification.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, PasswordChange, User};

/// Domain use-case port for authentication against the credential store.
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user snapshot.
    ///
    /// An unknown username and a wrong password must fail with the same
    /// error category and message so a caller cannot enumerate accounts.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error>;

    /// Replace the user's password after verifying the current one.
    async fn change_password(&self, user_id: i32, change: &PasswordChange) -> Result<(), Error>;
}
