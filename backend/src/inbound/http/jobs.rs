//! Job API handlers: intake, listing, editing, and dashboard aggregates.
//!
//! Job payloads keep the snake_case field names the front desk already
//! sends; only the envelope types differ from the user endpoints.

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::domain::{
    EngineerWorkload, Error, Identity, Job, JobIntakeDraft, JobStatistics,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Deposit as entered: the front desk sends either a bare number or a text
/// amount that may carry a currency symbol.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum DepositField {
    Number(i64),
    Text(String),
}

impl Default for DepositField {
    fn default() -> Self {
        Self::Number(0)
    }
}

impl DepositField {
    fn into_raw(self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s,
        }
    }
}

/// Intake/edit body shared by `POST /api/jobs` and `PUT /api/jobs/{job_ref}`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct JobRequest {
    pub customer_name: String,
    pub contact_number: String,
    #[serde(default)]
    pub job_details: String,
    #[serde(default)]
    pub booked_in_by: String,
    #[serde(default)]
    pub deposit_paid: DepositField,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub device_type: String,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub additional_notes: String,
    /// Omitted at intake means `Queued`.
    #[serde(default)]
    pub status: Option<String>,
}

impl From<JobRequest> for JobIntakeDraft {
    fn from(value: JobRequest) -> Self {
        Self {
            customer_name: value.customer_name,
            contact_number: value.contact_number,
            job_details: value.job_details,
            booked_in_by: value.booked_in_by,
            deposit_paid: value.deposit_paid.into_raw(),
            manufacturer: value.manufacturer,
            device_type: value.device_type,
            serial_number: value.serial_number,
            additional_notes: value.additional_notes,
            status: value.status,
        }
    }
}

async fn audit(state: &HttpState, user_id: i32, activity_type: &str, details: &str) {
    if let Err(err) = state.activity.append(user_id, activity_type, details).await {
        warn!(error = %err, activity_type, "audit append failed");
    }
}

/// All jobs, most recently checked in first.
#[utoipa::path(
    get,
    path = "/api/jobs",
    responses(
        (status = 200, description = "Jobs", body = [Job]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["jobs"],
    operation_id = "listJobs"
)]
#[get("/jobs")]
pub async fn list_jobs(
    state: web::Data<HttpState>,
    _identity: Identity,
) -> ApiResult<web::Json<Vec<Job>>> {
    Ok(web::Json(state.jobs.list().await?))
}

/// Highest job reference issued so far; 0 before the first booking.
#[utoipa::path(
    get,
    path = "/api/jobs/latest",
    responses(
        (status = 200, description = "Latest reference"),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["jobs"],
    operation_id = "latestJobRef"
)]
#[get("/jobs/latest")]
pub async fn latest_job_ref(
    state: web::Data<HttpState>,
    _identity: Identity,
) -> ApiResult<HttpResponse> {
    let latest = state.jobs.latest_ref().await?;
    Ok(HttpResponse::Ok().json(json!({ "latestJobRef": latest })))
}

/// The `count` most recently checked-in jobs.
#[utoipa::path(
    get,
    path = "/api/jobs/latest/{count}",
    params(("count" = i64, Path, description = "Number of jobs to return")),
    responses(
        (status = 200, description = "Jobs", body = [Job]),
        (status = 400, description = "Invalid count", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["jobs"],
    operation_id = "latestJobs"
)]
#[get("/jobs/latest/{count}")]
pub async fn latest_jobs(
    state: web::Data<HttpState>,
    _identity: Identity,
    path: web::Path<i64>,
) -> ApiResult<web::Json<Vec<Job>>> {
    let count = path.into_inner();
    if count <= 0 {
        return Err(Error::invalid_request("count must be positive"));
    }
    Ok(web::Json(state.jobs.latest(count).await?))
}

/// Look up one job.
#[utoipa::path(
    get,
    path = "/api/jobs/{job_ref}",
    params(("job_ref" = i32, Path, description = "Job reference")),
    responses(
        (status = 200, description = "Job", body = Job),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "No such job", body = Error)
    ),
    tags = ["jobs"],
    operation_id = "getJob"
)]
#[get("/jobs/{job_ref}")]
pub async fn get_job(
    state: web::Data<HttpState>,
    _identity: Identity,
    path: web::Path<i32>,
) -> ApiResult<web::Json<Job>> {
    let job = state
        .jobs
        .find(path.into_inner())
        .await?
        .ok_or_else(|| Error::not_found("job not found"))?;
    Ok(web::Json(job))
}

/// Book a device in. The store assigns the job reference.
#[utoipa::path(
    post,
    path = "/api/jobs",
    request_body = JobRequest,
    responses(
        (status = 201, description = "Job created"),
        (status = 400, description = "Validation failure", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["jobs"],
    operation_id = "createJob"
)]
#[post("/jobs")]
pub async fn create_job(
    state: web::Data<HttpState>,
    identity: Identity,
    payload: web::Json<JobRequest>,
) -> ApiResult<HttpResponse> {
    let intake = JobIntakeDraft::from(payload.into_inner()).validate()?;
    let job_ref = state.jobs.create(&intake, identity.id).await?;
    audit(
        &state,
        identity.id,
        "job_create",
        &format!("Created job #{job_ref} for {}", intake.customer_name),
    )
    .await;
    Ok(HttpResponse::Created().json(json!({ "job_ref": job_ref })))
}

/// Replace a job's editable fields.
#[utoipa::path(
    put,
    path = "/api/jobs/{job_ref}",
    params(("job_ref" = i32, Path, description = "Job reference")),
    request_body = JobRequest,
    responses(
        (status = 200, description = "Job updated"),
        (status = 400, description = "Validation failure", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "No such job", body = Error)
    ),
    tags = ["jobs"],
    operation_id = "updateJob"
)]
#[put("/jobs/{job_ref}")]
pub async fn update_job(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<i32>,
    payload: web::Json<JobRequest>,
) -> ApiResult<HttpResponse> {
    let job_ref = path.into_inner();
    let intake = JobIntakeDraft::from(payload.into_inner()).validate()?;
    state.jobs.update(job_ref, &intake, identity.id).await?;
    audit(
        &state,
        identity.id,
        "job_update",
        &format!("Updated job #{job_ref}"),
    )
    .await;
    Ok(HttpResponse::Ok().finish())
}

/// Dashboard aggregates: per-status counts plus today's intake totals.
#[utoipa::path(
    get,
    path = "/api/statistics",
    responses(
        (status = 200, description = "Aggregates", body = JobStatistics),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["jobs"],
    operation_id = "jobStatistics"
)]
#[get("/statistics")]
pub async fn statistics(
    state: web::Data<HttpState>,
    _identity: Identity,
) -> ApiResult<web::Json<JobStatistics>> {
    Ok(web::Json(state.jobs.statistics().await?))
}

/// Open-bench report counts per engineer.
#[utoipa::path(
    get,
    path = "/api/engineers/workload",
    responses(
        (status = 200, description = "Workload", body = [EngineerWorkload]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["jobs"],
    operation_id = "engineerWorkload"
)]
#[get("/engineers/workload")]
pub async fn engineer_workload(
    state: web::Data<HttpState>,
    _identity: Identity,
) -> ApiResult<web::Json<Vec<EngineerWorkload>>> {
    Ok(web::Json(state.reports.workload().await?))
}
