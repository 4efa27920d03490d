//! PostgreSQL-backed user account adapter.

use async_trait::async_trait;
use diesel::OptionalExtension;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::info;

use crate::domain::ports::UserRepository;
use crate::domain::{Error, NewUser, Role, User, UserUpdate};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserRow};
use super::password::hash_password;
use super::pool::DbPool;
use super::schema::{activity_logs, engineer_reports, jobs, users};

/// Diesel-backed implementation of the user port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

enum TxError {
    NotFound,
    Db(diesel::result::Error),
}

impl From<diesel::result::Error> for TxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Db(error)
    }
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create the bootstrap `admin` account when no account holds that
    /// username yet. Idempotent across restarts.
    pub async fn ensure_default_admin(&self, password: &str) -> Result<(), Error> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let existing: Option<i32> = users::table
            .filter(users::username.eq("admin"))
            .select(users::id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "admin bootstrap lookup"))?;
        if existing.is_some() {
            return Ok(());
        }

        let password_hash = hash_password(password)?;
        diesel::insert_into(users::table)
            .values(NewUserRow {
                username: "admin",
                password_hash: &password_hash,
                full_name: "Administrator",
                role: Role::Admin.as_str(),
            })
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "admin bootstrap insert"))?;
        info!("created default admin account");
        Ok(())
    }
}

#[derive(AsChangeset)]
#[diesel(table_name = users)]
struct UserChanges<'a> {
    full_name: Option<&'a str>,
    role: Option<&'a str>,
    password_hash: Option<&'a str>,
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn list(&self) -> Result<Vec<User>, Error> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = users::table
            .order(users::created_at.asc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "user listing"))?;
        rows.into_iter().map(UserRow::into_user).collect()
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, Error> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .find(id)
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "user lookup"))?;
        row.map(UserRow::into_user).transpose()
    }

    async fn create(&self, new_user: NewUser) -> Result<i32, Error> {
        let password_hash = hash_password(&new_user.password)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = diesel::insert_into(users::table)
            .values(NewUserRow {
                username: &new_user.username,
                password_hash: &password_hash,
                full_name: &new_user.full_name,
                role: new_user.role.as_str(),
            })
            .returning(users::id)
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "user creation"))?;
        Ok(id)
    }

    async fn update(&self, id: i32, update: UserUpdate) -> Result<(), Error> {
        if update.is_empty() {
            return Ok(());
        }
        let password_hash = update
            .password
            .as_deref()
            .map(hash_password)
            .transpose()?;
        let changes = UserChanges {
            full_name: update.full_name.as_deref(),
            role: update.role.map(Role::as_str),
            password_hash: password_hash.as_deref(),
        };

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::update(users::table.find(id))
            .set(changes)
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "user update"))?;
        if affected == 0 {
            return Err(Error::not_found("user not found"));
        }
        Ok(())
    }

    async fn delete_cascading(&self, id: i32) -> Result<String, Error> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // One transaction: the user's audit rows go with the account, while
        // job and report actor columns are nulled so job history survives.
        let username = conn
            .transaction::<String, TxError, _>(|conn| {
                async move {
                    let username: String = users::table
                        .find(id)
                        .select(users::username)
                        .first(conn)
                        .await
                        .optional()?
                        .ok_or(TxError::NotFound)?;

                    diesel::delete(activity_logs::table.filter(activity_logs::user_id.eq(id)))
                        .execute(conn)
                        .await?;
                    diesel::update(jobs::table.filter(jobs::created_by.eq(id)))
                        .set(jobs::created_by.eq(None::<i32>))
                        .execute(conn)
                        .await?;
                    diesel::update(jobs::table.filter(jobs::updated_by.eq(id)))
                        .set(jobs::updated_by.eq(None::<i32>))
                        .execute(conn)
                        .await?;
                    diesel::update(
                        engineer_reports::table.filter(engineer_reports::updated_by.eq(id)),
                    )
                    .set(engineer_reports::updated_by.eq(None::<i32>))
                    .execute(conn)
                    .await?;
                    diesel::delete(users::table.find(id)).execute(conn).await?;

                    Ok(username)
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| match err {
                TxError::NotFound => Error::not_found("user not found"),
                TxError::Db(err) => map_diesel_error(err, "user deletion"),
            })?;

        Ok(username)
    }
}
