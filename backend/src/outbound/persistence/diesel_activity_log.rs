//! PostgreSQL-backed audit trail adapter.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::ActivityLog;
use crate::domain::{
    ActivityEntry, ActivityEntryWithUser, ActivityFilter, Error, UserActivityStats,
};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{ActivityRow, NewActivityRow};
use super::pool::DbPool;
use super::schema::{activity_logs, users};

/// Diesel-backed implementation of the audit-trail port.
#[derive(Clone)]
pub struct DieselActivityLog {
    pool: DbPool,
}

impl DieselActivityLog {
    /// Create a new log with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn tally(stats: &mut UserActivityStats, activity_type: &str) {
    match activity_type {
        "login" => stats.login_count += 1,
        "job_create" => stats.jobs_created += 1,
        "job_update" => stats.jobs_updated += 1,
        "report_update" => stats.reports_updated += 1,
        _ => {}
    }
    stats.total_activities += 1;
}

#[async_trait]
impl ActivityLog for DieselActivityLog {
    async fn append(&self, user_id: i32, activity_type: &str, details: &str) -> Result<(), Error> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(activity_logs::table)
            .values(NewActivityRow {
                user_id,
                activity_type,
                details,
            })
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "activity append"))?;
        Ok(())
    }

    async fn recent_for_user(
        &self,
        user_id: i32,
        limit: i64,
    ) -> Result<Vec<ActivityEntry>, Error> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = activity_logs::table
            .filter(activity_logs::user_id.eq(user_id))
            .order(activity_logs::timestamp.desc())
            .limit(limit)
            .select(ActivityRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "own activity listing"))?;
        Ok(rows.into_iter().map(ActivityEntry::from).collect())
    }

    async fn recent(
        &self,
        filter: &ActivityFilter,
        limit: i64,
    ) -> Result<Vec<ActivityEntryWithUser>, Error> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = activity_logs::table
            .inner_join(users::table)
            .into_boxed();
        if let Some(user_id) = filter.user_id {
            query = query.filter(activity_logs::user_id.eq(user_id));
        }
        if let Some(activity_type) = filter.activity_type.as_deref() {
            query = query.filter(activity_logs::activity_type.eq(activity_type.to_owned()));
        }

        let rows: Vec<(ActivityRow, String, String)> = query
            .order(activity_logs::timestamp.desc())
            .limit(limit)
            .select((
                ActivityRow::as_select(),
                users::username,
                users::full_name,
            ))
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "activity listing"))?;

        Ok(rows
            .into_iter()
            .map(|(row, username, full_name)| ActivityEntryWithUser {
                entry: ActivityEntry::from(row),
                username,
                full_name,
            })
            .collect())
    }

    async fn user_stats(&self) -> Result<Vec<UserActivityStats>, Error> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let accounts: Vec<(i32, String, String)> = users::table
            .select((users::id, users::username, users::full_name))
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "user listing for stats"))?;
        let tags: Vec<(i32, String)> = activity_logs::table
            .select((activity_logs::user_id, activity_logs::activity_type))
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "activity tags for stats"))?;

        let mut stats: Vec<UserActivityStats> = accounts
            .into_iter()
            .map(|(id, username, full_name)| UserActivityStats {
                id,
                username,
                full_name,
                ..UserActivityStats::default()
            })
            .collect();
        for (user_id, activity_type) in tags {
            if let Some(entry) = stats.iter_mut().find(|s| s.id == user_id) {
                tally(entry, &activity_type);
            }
        }
        stats.sort_by(|a, b| b.total_activities.cmp(&a.total_activities));
        Ok(stats)
    }
}
