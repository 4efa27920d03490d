//! Audit-trail API handlers.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{
    ActivityEntry, ActivityEntryWithUser, ActivityFilter, Error, Identity, Role,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

const ADMIN_LISTING_LIMIT: i64 = 100;
const OWN_LISTING_LIMIT: i64 = 50;

/// Client-originated audit entry for `POST /api/activity`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRequest {
    pub activity_type: String,
    #[serde(default)]
    pub details: String,
}

/// Admin listing filters.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ActivityQuery {
    /// Restrict to one acting user.
    pub user_id: Option<i32>,
    /// Restrict to one activity tag, e.g. `login`.
    #[serde(rename = "type")]
    pub activity_type: Option<String>,
}

/// Record a client-side action against the calling user.
///
/// Fire-and-forget from the client's perspective: a failed write is logged
/// server-side and still acknowledged, matching every other audit append.
#[utoipa::path(
    post,
    path = "/api/activity",
    request_body = ActivityRequest,
    responses(
        (status = 201, description = "Logged"),
        (status = 400, description = "Validation failure", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["activity"],
    operation_id = "logActivity"
)]
#[post("/activity")]
pub async fn log_activity(
    state: web::Data<HttpState>,
    identity: Identity,
    payload: web::Json<ActivityRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    if payload.activity_type.trim().is_empty() {
        return Err(Error::invalid_request("activity type is required"));
    }
    if let Err(err) = state
        .activity
        .append(identity.id, &payload.activity_type, &payload.details)
        .await
    {
        warn!(error = %err, activity_type = %payload.activity_type, "audit append failed");
    }
    Ok(HttpResponse::Created().finish())
}

/// Recent entries across all users with acting-user details. Admin only.
#[utoipa::path(
    get,
    path = "/api/activity",
    params(ActivityQuery),
    responses(
        (status = 200, description = "Entries", body = [ActivityEntryWithUser]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["activity"],
    operation_id = "listActivity"
)]
#[get("/activity")]
pub async fn list_activity(
    state: web::Data<HttpState>,
    identity: Identity,
    query: web::Query<ActivityQuery>,
) -> ApiResult<web::Json<Vec<ActivityEntryWithUser>>> {
    identity.require_role(Role::Admin)?;
    let query = query.into_inner();
    let filter = ActivityFilter {
        user_id: query.user_id,
        activity_type: query.activity_type,
    };
    Ok(web::Json(
        state.activity.recent(&filter, ADMIN_LISTING_LIMIT).await?,
    ))
}

/// The calling user's own recent entries.
#[utoipa::path(
    get,
    path = "/api/activity/me",
    responses(
        (status = 200, description = "Entries", body = [ActivityEntry]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["activity"],
    operation_id = "myActivity"
)]
#[get("/activity/me")]
pub async fn my_activity(
    state: web::Data<HttpState>,
    identity: Identity,
) -> ApiResult<web::Json<Vec<ActivityEntry>>> {
    Ok(web::Json(
        state
            .activity
            .recent_for_user(identity.id, OWN_LISTING_LIMIT)
            .await?,
    ))
}
