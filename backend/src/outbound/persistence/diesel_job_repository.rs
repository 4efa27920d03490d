//! PostgreSQL-backed repair-job adapter.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::OptionalExtension;
use diesel::dsl::{count_star, sql, sum};
use diesel::prelude::*;
use diesel::sql_types::Bool;
use diesel_async::RunQueryDsl;

use crate::domain::ports::JobRepository;
use crate::domain::{Error, Job, JobIntake, JobStatistics};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{JobRow, NewJobRow};
use super::pool::DbPool;
use super::schema::jobs;

/// Diesel-backed implementation of the job port.
#[derive(Clone)]
pub struct DieselJobRepository {
    pool: DbPool,
}

impl DieselJobRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Jobs checked in on the current date, evaluated against the database
/// clock so the day boundary follows the server's timezone setting.
fn checked_in_today() -> diesel::expression::SqlLiteral<Bool> {
    sql::<Bool>("checked_in_date::date = CURRENT_DATE")
}

fn to_insert_row<'a>(intake: &'a JobIntake, actor: i32) -> NewJobRow<'a> {
    NewJobRow {
        customer_name: &intake.customer_name,
        contact_number: &intake.contact_number,
        job_details: &intake.job_details,
        booked_in_by: &intake.booked_in_by,
        deposit_paid: intake.deposit_paid,
        manufacturer: &intake.manufacturer,
        device_type: &intake.device_type,
        serial_number: intake.serial_number.as_deref(),
        additional_notes: &intake.additional_notes,
        status: intake.status.as_str(),
        created_by: Some(actor),
        updated_by: Some(actor),
    }
}

#[async_trait]
impl JobRepository for DieselJobRepository {
    async fn list(&self) -> Result<Vec<Job>, Error> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = jobs::table
            .order(jobs::checked_in_date.desc())
            .select(JobRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "job listing"))?;
        rows.into_iter().map(Job::try_from).collect()
    }

    async fn latest(&self, count: i64) -> Result<Vec<Job>, Error> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = jobs::table
            .order(jobs::checked_in_date.desc())
            .limit(count)
            .select(JobRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "latest jobs"))?;
        rows.into_iter().map(Job::try_from).collect()
    }

    async fn latest_ref(&self) -> Result<i32, Error> {
        use diesel::dsl::max;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let latest: Option<i32> = jobs::table
            .select(max(jobs::job_ref))
            .first(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "latest job reference"))?;
        Ok(latest.unwrap_or(0))
    }

    async fn find(&self, job_ref: i32) -> Result<Option<Job>, Error> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = jobs::table
            .find(job_ref)
            .select(JobRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "job lookup"))?;
        row.map(Job::try_from).transpose()
    }

    async fn create(&self, intake: &JobIntake, actor: i32) -> Result<i32, Error> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let job_ref = diesel::insert_into(jobs::table)
            .values(to_insert_row(intake, actor))
            .returning(jobs::job_ref)
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "job creation"))?;
        Ok(job_ref)
    }

    async fn update(&self, job_ref: i32, intake: &JobIntake, actor: i32) -> Result<(), Error> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::update(jobs::table.find(job_ref))
            .set((
                jobs::customer_name.eq(&intake.customer_name),
                jobs::contact_number.eq(&intake.contact_number),
                jobs::job_details.eq(&intake.job_details),
                jobs::booked_in_by.eq(&intake.booked_in_by),
                jobs::deposit_paid.eq(intake.deposit_paid),
                jobs::manufacturer.eq(&intake.manufacturer),
                jobs::device_type.eq(&intake.device_type),
                jobs::serial_number.eq(intake.serial_number.as_deref()),
                jobs::additional_notes.eq(&intake.additional_notes),
                jobs::status.eq(intake.status.as_str()),
                jobs::updated_by.eq(Some(actor)),
            ))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "job update"))?;
        if affected == 0 {
            return Err(Error::not_found("job not found"));
        }
        Ok(())
    }

    async fn statistics(&self) -> Result<JobStatistics, Error> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let counts: Vec<(String, i64)> = jobs::table
            .group_by(jobs::status)
            .select((jobs::status, count_star()))
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "status counts"))?;
        let status_counts: HashMap<String, i64> = counts.into_iter().collect();

        let today_jobs: i64 = jobs::table
            .filter(checked_in_today())
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "today's job count"))?;
        let today_deposits: Option<i64> = jobs::table
            .filter(checked_in_today())
            .select(sum(jobs::deposit_paid))
            .first(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "today's deposit total"))?;

        Ok(JobStatistics {
            status_counts,
            today_jobs,
            today_deposits: today_deposits.unwrap_or(0),
        })
    }
}
