//! Port for engineer-report persistence, including the transactional
//! job-status + report upsert at the heart of the workflow.

use async_trait::async_trait;

use crate::domain::{EngineerReport, EngineerWorkload, Error, ReportDraft, ReportOutcome};

/// Engineer-report store.
#[async_trait]
pub trait EngineerReportRepository: Send + Sync {
    /// The report for a job, if one has been filed.
    async fn find_by_job(&self, job_ref: i32) -> Result<Option<EngineerReport>, Error>;

    /// Apply the draft atomically: move the job to `draft.status` and
    /// insert-or-update the job's single report row, all in one
    /// transaction.
    ///
    /// ## Invariants
    /// - A failed report write never leaves the job status changed, and
    ///   vice versa: either both land or neither does.
    /// - At most one report row exists per `job_ref` afterwards.
    ///
    /// # Errors
    /// `NotFound` when `draft.job_ref` references no job (nothing is
    /// persisted); `ServiceUnavailable`/`InternalError` on persistence
    /// failure after rollback.
    async fn submit(&self, draft: &ReportDraft, actor: i32) -> Result<ReportOutcome, Error>;

    /// Open-bench report counts per engineer (jobs currently Queued or
    /// On Bench).
    async fn workload(&self) -> Result<Vec<EngineerWorkload>, Error>;
}
