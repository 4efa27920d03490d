//! PostgreSQL-backed engineer-report adapter.
//!
//! `submit` carries the workflow's central invariant: the job-status move
//! and the report upsert commit together or not at all.

use async_trait::async_trait;
use diesel::OptionalExtension;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::EngineerReportRepository;
use crate::domain::{EngineerReport, EngineerWorkload, Error, ReportDraft, ReportOutcome};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{NewReportRow, ReportRow};
use super::pool::DbPool;
use super::schema::{engineer_reports, jobs};

/// Diesel-backed implementation of the report port.
#[derive(Clone)]
pub struct DieselEngineerReportRepository {
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

impl DieselEngineerReportRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EngineerReportRepository for DieselEngineerReportRepository {
    async fn find_by_job(&self, job_ref: i32) -> Result<Option<EngineerReport>, Error> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = engineer_reports::table
            .filter(engineer_reports::job_ref.eq(job_ref))
            .select(ReportRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "report lookup"))?;
        Ok(row.map(EngineerReport::from))
    }

    async fn submit(&self, draft: &ReportDraft, actor: i32) -> Result<ReportOutcome, Error> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // The status update doubles as the existence check: zero affected
        // rows means the job reference is unknown and nothing commits.
        let outcome = conn
            .transaction::<ReportOutcome, TxError, _>(|conn| {
                async move {
                    let affected = diesel::update(jobs::table.find(draft.job_ref))
                        .set((
                            jobs::status.eq(draft.status.as_str()),
                            jobs::updated_by.eq(Some(actor)),
                        ))
                        .execute(conn)
                        .await?;
                    if affected == 0 {
                        return Err(TxError::NotFound);
                    }

                    let existing: Option<i32> = engineer_reports::table
                        .filter(engineer_reports::job_ref.eq(draft.job_ref))
                        .select(engineer_reports::id)
                        .first(conn)
                        .await
                        .optional()?;

                    match existing {
                        Some(id) => {
                            diesel::update(engineer_reports::table.find(id))
                                .set((
                                    engineer_reports::engineer_name.eq(&draft.engineer_name),
                                    engineer_reports::time_spent.eq(&draft.time_spent),
                                    engineer_reports::repair_notes.eq(&draft.repair_notes),
                                    engineer_reports::updated_by.eq(Some(actor)),
                                ))
                                .execute(conn)
                                .await?;
                            Ok(ReportOutcome::Updated)
                        }
                        None => {
                            diesel::insert_into(engineer_reports::table)
                                .values(NewReportRow {
                                    job_ref: draft.job_ref,
                                    engineer_name: &draft.engineer_name,
                                    time_spent: &draft.time_spent,
                                    repair_notes: &draft.repair_notes,
                                    updated_by: Some(actor),
                                })
                                .execute(conn)
                                .await?;
                            Ok(ReportOutcome::Created)
                        }
                    }
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| match err {
                TxError::NotFound => Error::not_found("job not found"),
                TxError::Db(err) => map_diesel_error(err, "report submission"),
            })?;

        Ok(outcome)
    }

    async fn workload(&self) -> Result<Vec<EngineerWorkload>, Error> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(String, i64)> = engineer_reports::table
            .inner_join(jobs::table)
            .filter(jobs::status.eq_any(["Queued", "On Bench"]))
            .group_by(engineer_reports::engineer_name)
            .select((engineer_reports::engineer_name, count_star()))
            .order(count_star().desc())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "engineer workload"))?;
        Ok(rows
            .into_iter()
            .map(|(engineer_name, job_count)| EngineerWorkload {
                engineer_name,
                job_count,
            })
            .collect())
    }
}
