//! Engineer reports: the technician's findings for a job.
//!
//! At most one report exists per `job_ref`; the upsert inside the report
//! submission transaction enforces this rather than a database constraint.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::JobStatus;

/// A persisted engineer report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EngineerReport {
    pub id: i32,
    pub job_ref: i32,
    pub engineer_name: String,
    /// Free text, e.g. "45m" or "2h on bench".
    pub time_spent: String,
    pub repair_notes: String,
    pub updated_by: Option<i32>,
}

/// Report fields submitted alongside a job-status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDraft {
    pub job_ref: i32,
    pub engineer_name: String,
    pub time_spent: String,
    pub repair_notes: String,
    /// Status the job moves to as part of the same transaction.
    pub status: JobStatus,
}

/// Whether submission created the job's first report or updated it in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportOutcome {
    Created,
    Updated,
}

impl ReportOutcome {
    /// Activity-log tag for this outcome.
    pub fn activity_type(self) -> &'static str {
        match self {
            Self::Created => "report_create",
            Self::Updated => "report_update",
        }
    }
}

/// An engineer report joined with the owning job's current status.
///
/// When a job has no report yet, the shell carries empty fields plus the job
/// status so the bench UI can prefill its form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReportView {
    pub job_ref: i32,
    pub engineer_name: String,
    pub time_spent: String,
    pub repair_notes: String,
    pub status: JobStatus,
}

impl ReportView {
    /// Combine a stored report with the job's current status.
    pub fn from_report(report: EngineerReport, status: JobStatus) -> Self {
        Self {
            job_ref: report.job_ref,
            engineer_name: report.engineer_name,
            time_spent: report.time_spent,
            repair_notes: report.repair_notes,
            status,
        }
    }

    /// Empty shell for a job that has not been on the bench yet.
    pub fn empty(job_ref: i32, status: JobStatus) -> Self {
        Self {
            job_ref,
            engineer_name: String::new(),
            time_spent: String::new(),
            repair_notes: String::new(),
            status,
        }
    }
}
