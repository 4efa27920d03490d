//! Diesel-backed `LoginService` verifying argon2id credentials.

use async_trait::async_trait;
use diesel::OptionalExtension;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::LoginService;
use crate::domain::{Error, LoginCredentials, PasswordChange, User};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::UserRow;
use super::password::{hash_password, verify_password};
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed credential verifier.
#[derive(Clone)]
pub struct DieselLoginService {
    pool: DbPool,
}

impl DieselLoginService {
    /// Create a new service with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn row_by_username(&self, username: &str) -> Result<Option<UserRow>, Error> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .filter(users::username.eq(username))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "credential lookup"))
    }
}

fn invalid_credentials() -> Error {
    // Unknown username and wrong password must be indistinguishable.
    Error::unauthorized("invalid username or password")
}

#[async_trait]
impl LoginService for DieselLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let row = self
            .row_by_username(credentials.username())
            .await?
            .ok_or_else(invalid_credentials)?;

        if !verify_password(credentials.password(), &row.password_hash) {
            return Err(invalid_credentials());
        }
        row.into_user()
    }

    async fn change_password(&self, user_id: i32, change: &PasswordChange) -> Result<(), Error> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let current_hash: Option<String> = users::table
            .find(user_id)
            .select(users::password_hash)
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "password change lookup"))?;
        let current_hash = current_hash.ok_or_else(|| Error::not_found("user not found"))?;

        if !verify_password(change.current(), &current_hash) {
            return Err(Error::unauthorized("current password is incorrect"));
        }

        let new_hash = hash_password(change.new_password())?;
        diesel::update(users::table.find(user_id))
            .set(users::password_hash.eq(new_hash))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "password change"))?;
        Ok(())
    }
}
