//! Engineer-report API handlers.
//!
//! Submission is the transactional heart of the workflow: one request moves
//! the job's status and upserts its single report row atomically.

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, Identity, JobStatus, ReportDraft, ReportOutcome, ReportView};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Submission body for `POST /api/engineer-reports`.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ReportRequest {
    pub job_ref: i32,
    #[serde(default)]
    pub engineer_name: String,
    #[serde(default)]
    pub time_spent: String,
    #[serde(default)]
    pub repair_notes: String,
    /// Omitted means the job stays on the bench.
    #[serde(default)]
    pub status: Option<String>,
}

/// Submission verdict.
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct ReportResponse {
    pub operation: ReportOutcome,
}

/// A job's report joined with its current status, or an empty shell when
/// nothing has been filed yet.
#[utoipa::path(
    get,
    path = "/api/engineer-reports/{job_ref}",
    params(("job_ref" = i32, Path, description = "Job reference")),
    responses(
        (status = 200, description = "Report view", body = ReportView),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "No such job", body = Error)
    ),
    tags = ["reports"],
    operation_id = "getReport"
)]
#[get("/engineer-reports/{job_ref}")]
pub async fn get_report(
    state: web::Data<HttpState>,
    _identity: Identity,
    path: web::Path<i32>,
) -> ApiResult<web::Json<ReportView>> {
    let job_ref = path.into_inner();
    let job = state
        .jobs
        .find(job_ref)
        .await?
        .ok_or_else(|| Error::not_found("job not found"))?;
    let view = match state.reports.find_by_job(job_ref).await? {
        Some(report) => ReportView::from_report(report, job.status),
        None => ReportView::empty(job_ref, job.status),
    };
    Ok(web::Json(view))
}

/// Submit findings: move the job to the given status and insert-or-update
/// its report in one transaction.
#[utoipa::path(
    post,
    path = "/api/engineer-reports",
    request_body = ReportRequest,
    responses(
        (status = 200, description = "Report stored", body = ReportResponse),
        (status = 400, description = "Validation failure", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "No such job", body = Error)
    ),
    tags = ["reports"],
    operation_id = "submitReport"
)]
#[post("/engineer-reports")]
pub async fn submit_report(
    state: web::Data<HttpState>,
    identity: Identity,
    payload: web::Json<ReportRequest>,
) -> ApiResult<web::Json<ReportResponse>> {
    let payload = payload.into_inner();
    let status = JobStatus::parse_or_bench(payload.status.as_deref())?;
    let draft = ReportDraft {
        job_ref: payload.job_ref,
        engineer_name: payload.engineer_name,
        time_spent: payload.time_spent,
        repair_notes: payload.repair_notes,
        status,
    };
    let operation = state.report_submission.submit(&draft, &identity).await?;
    Ok(web::Json(ReportResponse { operation }))
}
