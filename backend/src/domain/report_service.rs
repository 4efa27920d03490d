//! Report submission use-case: the transactional core plus its audit entry.
//!
//! The repository performs the job-status update and report upsert in one
//! database transaction; this service appends the matching audit entry only
//! after that transaction has committed, so an audit failure can never
//! affect commit semantics.

use std::sync::Arc;

use tracing::warn;

use crate::domain::ports::{ActivityLog, EngineerReportRepository};
use crate::domain::{Error, Identity, ReportDraft, ReportOutcome};

/// Orchestrates engineer-report submission.
#[derive(Clone)]
pub struct ReportSubmissionService {
    reports: Arc<dyn EngineerReportRepository>,
    activity: Arc<dyn ActivityLog>,
}

impl ReportSubmissionService {
    /// Create the service over a report store and audit sink.
    pub fn new(reports: Arc<dyn EngineerReportRepository>, activity: Arc<dyn ActivityLog>) -> Self {
        Self { reports, activity }
    }

    /// Submit the engineer's findings, moving the job to `draft.status` and
    /// upserting its report atomically, then audit the outcome.
    ///
    /// # Errors
    /// Propagates the repository's `NotFound`/persistence errors untouched;
    /// an audit-append failure is logged and swallowed.
    pub async fn submit(
        &self,
        draft: &ReportDraft,
        actor: &Identity,
    ) -> Result<ReportOutcome, Error> {
        let outcome = self.reports.submit(draft, actor.id).await?;

        let verb = match outcome {
            ReportOutcome::Created => "Created",
            ReportOutcome::Updated => "Updated",
        };
        let details = format!("{verb} engineer report for job #{}", draft.job_ref);
        if let Err(err) = self
            .activity
            .append(actor.id, outcome.activity_type(), &details)
            .await
        {
            warn!(error = %err, job_ref = draft.job_ref, "audit append failed after report commit");
        }

        Ok(outcome)
    }
}
