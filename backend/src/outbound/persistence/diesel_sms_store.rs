//! PostgreSQL-backed SMS attempt history.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::SmsNotificationStore;
use crate::domain::{Error, SmsAttempt, SmsNotification, SmsStatus};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{NewSmsRow, SmsRow};
use super::pool::DbPool;
use super::schema::sms_notifications;

/// Diesel-backed implementation of the SMS history port.
#[derive(Clone)]
pub struct DieselSmsNotificationStore {
    pool: DbPool,
}

impl DieselSmsNotificationStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SmsNotificationStore for DieselSmsNotificationStore {
    async fn record(&self, attempt: &SmsAttempt) -> Result<SmsNotification, Error> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: SmsRow = diesel::insert_into(sms_notifications::table)
            .values(NewSmsRow {
                job_ref: attempt.job_ref,
                sent_by: &attempt.sent_by,
                recipient: &attempt.recipient,
                message: &attempt.message,
                status: attempt.status.as_str(),
            })
            .returning(SmsRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "sms record"))?;
        row.try_into()
    }

    async fn history_for_job(&self, job_ref: i32) -> Result<Vec<SmsNotification>, Error> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = sms_notifications::table
            .filter(sms_notifications::job_ref.eq(job_ref))
            .order(sms_notifications::sent_at.desc())
            .select(SmsRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "sms history"))?;
        rows.into_iter().map(SmsNotification::try_from).collect()
    }

    async fn sent_counts(&self, job_refs: &[i32]) -> Result<HashMap<i32, i64>, Error> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(i32, i64)> = sms_notifications::table
            .filter(sms_notifications::job_ref.eq_any(job_refs.iter().copied()))
            .filter(sms_notifications::status.eq(SmsStatus::Sent.as_str()))
            .group_by(sms_notifications::job_ref)
            .select((sms_notifications::job_ref, count_star()))
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "sms counts"))?;
        Ok(rows.into_iter().collect())
    }
}
