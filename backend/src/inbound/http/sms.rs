//! Customer SMS API handlers.
//!
//! Every send attempt is recorded, success or failure; a gateway failure is
//! surfaced to the caller but never disturbs already-committed job state.

use std::collections::HashMap;

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::domain::ports::SmsDelivery;
use crate::domain::{
    Error, Identity, SmsAttempt, SmsNotification, SmsStatus, normalise_uk_number,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Body for `POST /api/send-sms`.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct SendSmsRequest {
    /// Recipient as typed; UK numbers with a leading 0 are normalised.
    pub to: String,
    pub message: String,
    pub job_ref: i32,
}

/// Body for `POST /api/sms-counts`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SmsCountsRequest {
    pub job_refs: Vec<i32>,
}

async fn record_attempt(state: &HttpState, attempt: &SmsAttempt) {
    if let Err(err) = state.sms_store.record(attempt).await {
        warn!(error = %err, job_ref = attempt.job_ref, "failed to record sms attempt");
    }
}

/// Send a customer notification and record the attempt.
#[utoipa::path(
    post,
    path = "/api/send-sms",
    request_body = SendSmsRequest,
    responses(
        (status = 200, description = "Message accepted by the gateway"),
        (status = 400, description = "Validation failure", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 502, description = "Gateway rejected or unreachable", body = Error)
    ),
    tags = ["sms"],
    operation_id = "sendSms"
)]
#[post("/send-sms")]
pub async fn send_sms(
    state: web::Data<HttpState>,
    identity: Identity,
    payload: web::Json<SendSmsRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    if payload.to.trim().is_empty() || payload.message.trim().is_empty() {
        return Err(Error::invalid_request("recipient and message are required"));
    }
    state
        .jobs
        .find(payload.job_ref)
        .await?
        .ok_or_else(|| Error::not_found("job not found"))?;

    let normalised = normalise_uk_number(&payload.to);
    let mut attempt = SmsAttempt {
        job_ref: payload.job_ref,
        sent_by: identity.username.clone(),
        recipient: payload.to.clone(),
        message: payload.message.clone(),
        status: SmsStatus::Failed,
    };

    let delivery = match state.sms_gateway.send(&normalised, &payload.message).await {
        Ok(delivery) => delivery,
        Err(err) => {
            record_attempt(&state, &attempt).await;
            return Err(err);
        }
    };

    match delivery {
        SmsDelivery::Accepted { message_id } => {
            attempt.status = SmsStatus::Sent;
            record_attempt(&state, &attempt).await;
            if let Err(err) = state
                .activity
                .append(
                    identity.id,
                    "send_sms",
                    &format!("Sent SMS for job #{}", payload.job_ref),
                )
                .await
            {
                warn!(error = %err, "audit append failed");
            }
            Ok(HttpResponse::Ok().json(json!({ "messageId": message_id })))
        }
        SmsDelivery::Rejected { reason } => {
            record_attempt(&state, &attempt).await;
            Err(Error::external_service(format!(
                "sms gateway rejected message: {reason}"
            )))
        }
    }
}

/// Send history for one job, newest first.
#[utoipa::path(
    get,
    path = "/api/sms-notifications/{job_ref}",
    params(("job_ref" = i32, Path, description = "Job reference")),
    responses(
        (status = 200, description = "History", body = [SmsNotification]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["sms"],
    operation_id = "smsHistory"
)]
#[get("/sms-notifications/{job_ref}")]
pub async fn sms_history(
    state: web::Data<HttpState>,
    _identity: Identity,
    path: web::Path<i32>,
) -> ApiResult<web::Json<Vec<SmsNotification>>> {
    Ok(web::Json(
        state.sms_store.history_for_job(path.into_inner()).await?,
    ))
}

/// Successfully-sent message counts for a set of jobs, keyed by reference.
#[utoipa::path(
    post,
    path = "/api/sms-counts",
    request_body = SmsCountsRequest,
    responses(
        (status = 200, description = "Counts keyed by job reference"),
        (status = 400, description = "Empty reference list", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["sms"],
    operation_id = "smsCounts"
)]
#[post("/sms-counts")]
pub async fn sms_counts(
    state: web::Data<HttpState>,
    _identity: Identity,
    payload: web::Json<SmsCountsRequest>,
) -> ApiResult<web::Json<HashMap<i32, i64>>> {
    let job_refs = payload.into_inner().job_refs;
    if job_refs.is_empty() {
        return Err(Error::invalid_request("job references are required"));
    }
    Ok(web::Json(state.sms_store.sent_counts(&job_refs).await?))
}
