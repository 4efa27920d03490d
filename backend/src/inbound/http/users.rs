//! User and authentication API handlers.
//!
//! ```text
//! POST /api/users/login {"username":"admin","password":"password"}
//! GET  /api/users/me
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::domain::{
    CredentialValidationError, Error, Identity, LoginCredentials, NewUser, PasswordChange, Role,
    User, UserActivityStats, UserUpdate,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Login request body for `POST /api/users/login`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful login payload: the bearer token plus the identity snapshot it
/// embeds.
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: Identity,
}

/// Fresh token from `POST /api/users/refresh-token`.
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct RefreshResponse {
    pub token: String,
}

/// Registration body. Role defaults to `staff` when omitted.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub role: Option<String>,
}

/// Partial user update for `PUT /api/users/{id}`.
#[derive(Deserialize, Serialize, Default, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub password: Option<String>,
}

/// Body for `PUT /api/users/profile`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub full_name: String,
}

/// Body for `POST /api/users/change-password`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

fn map_credential_validation_error(err: CredentialValidationError) -> Error {
    match err {
        CredentialValidationError::EmptyUsername => {
            Error::invalid_request("username must not be empty")
                .with_details(json!({ "field": "username", "code": "empty_username" }))
        }
        CredentialValidationError::EmptyPassword => {
            Error::invalid_request("password must not be empty")
                .with_details(json!({ "field": "password", "code": "empty_password" }))
        }
    }
}

fn parse_role(raw: &str) -> Result<Role, Error> {
    raw.parse::<Role>()
        .map_err(|err| Error::invalid_request(err.to_string()))
}

fn identity_of(user: &User) -> Identity {
    Identity {
        id: user.id,
        username: user.username.clone(),
        full_name: user.full_name.clone(),
        role: user.role,
    }
}

async fn audit(state: &HttpState, user_id: i32, activity_type: &str, details: &str) {
    if let Err(err) = state.activity.append(user_id, activity_type, details).await {
        warn!(error = %err, activity_type, "audit append failed");
    }
}

/// Authenticate and issue a bearer token.
///
/// Bad username and bad password fail identically so accounts cannot be
/// enumerated.
#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = LoginResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error")
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/users/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let payload = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&payload.username, &payload.password)
        .map_err(map_credential_validation_error)?;
    let user = state.login.authenticate(&credentials).await?;
    let identity = identity_of(&user);
    let token = state.tokens.issue(&identity)?;

    audit(&state, user.id, "login", "User logged in").await;

    Ok(web::Json(LoginResponse {
        token,
        user: identity,
    }))
}

/// Re-issue a token from a still-valid one, resetting the validity window.
///
/// The new token carries the snapshot embedded in the presented token; the
/// credential store is not re-read.
#[utoipa::path(
    post,
    path = "/api/users/refresh-token",
    responses(
        (status = 200, description = "Fresh token", body = RefreshResponse),
        (status = 401, description = "Missing, invalid, or expired token", body = Error)
    ),
    tags = ["users"],
    operation_id = "refreshToken"
)]
#[post("/users/refresh-token")]
pub async fn refresh_token(
    state: web::Data<HttpState>,
    identity: Identity,
) -> ApiResult<web::Json<RefreshResponse>> {
    let token = state.tokens.issue(&identity)?;
    Ok(web::Json(RefreshResponse { token }))
}

/// Create an account. Open endpoint; role defaults to `staff`.
#[utoipa::path(
    post,
    path = "/api/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created"),
        (status = 400, description = "Validation failure or duplicate username", body = Error)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/users/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    if payload.username.trim().is_empty() || payload.password.is_empty() {
        return Err(Error::invalid_request("username and password are required"));
    }
    let role = match payload.role.as_deref() {
        None => Role::Staff,
        Some(raw) => parse_role(raw)?,
    };
    let id = state
        .users
        .create(NewUser {
            username: payload.username.trim().to_owned(),
            full_name: payload.full_name,
            role,
            password: payload.password,
        })
        .await?;
    Ok(HttpResponse::Created().json(json!({ "id": id })))
}

/// The calling user's account, freshly read from the store.
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Account no longer exists", body = Error)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn me(state: web::Data<HttpState>, identity: Identity) -> ApiResult<web::Json<User>> {
    let user = state
        .users
        .find_by_id(identity.id)
        .await?
        .ok_or_else(|| Error::not_found("user not found"))?;
    Ok(web::Json(user))
}

/// Profile view; same fresh read as `/users/me`.
#[utoipa::path(
    get,
    path = "/api/users/profile",
    responses(
        (status = 200, description = "Profile", body = User),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Account no longer exists", body = Error)
    ),
    tags = ["users"],
    operation_id = "getProfile"
)]
#[get("/users/profile")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    identity: Identity,
) -> ApiResult<web::Json<User>> {
    let user = state
        .users
        .find_by_id(identity.id)
        .await?
        .ok_or_else(|| Error::not_found("user not found"))?;
    Ok(web::Json(user))
}

/// Update the caller's own display name.
#[utoipa::path(
    put,
    path = "/api/users/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated"),
        (status = 400, description = "Validation failure", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateProfile"
)]
#[put("/users/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    identity: Identity,
    payload: web::Json<UpdateProfileRequest>,
) -> ApiResult<HttpResponse> {
    let full_name = payload.into_inner().full_name;
    if full_name.trim().is_empty() {
        return Err(Error::invalid_request("full name must not be empty"));
    }
    state
        .users
        .update(
            identity.id,
            UserUpdate {
                full_name: Some(full_name),
                ..UserUpdate::default()
            },
        )
        .await?;
    audit(&state, identity.id, "profile_update", "Updated profile details").await;
    Ok(HttpResponse::Ok().finish())
}

/// Replace the caller's password after verifying the current one.
#[utoipa::path(
    post,
    path = "/api/users/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Validation failure", body = Error),
        (status = 401, description = "Current password incorrect", body = Error)
    ),
    tags = ["users"],
    operation_id = "changePassword"
)]
#[post("/users/change-password")]
pub async fn change_password(
    state: web::Data<HttpState>,
    identity: Identity,
    payload: web::Json<ChangePasswordRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let change = PasswordChange::try_from_parts(&payload.current_password, &payload.new_password)
        .map_err(map_credential_validation_error)?;
    state.login.change_password(identity.id, &change).await?;
    audit(&state, identity.id, "password_change", "Changed account password").await;
    Ok(HttpResponse::Ok().finish())
}

/// List all accounts. Admin only.
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Users", body = [User]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    identity: Identity,
) -> ApiResult<web::Json<Vec<User>>> {
    identity.require_role(Role::Admin)?;
    Ok(web::Json(state.users.list().await?))
}

/// Per-user activity aggregates for the admin dashboard.
#[utoipa::path(
    get,
    path = "/api/users/activity-stats",
    responses(
        (status = 200, description = "Aggregates", body = [UserActivityStats]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["users"],
    operation_id = "userActivityStats"
)]
#[get("/users/activity-stats")]
pub async fn activity_stats(
    state: web::Data<HttpState>,
    identity: Identity,
) -> ApiResult<web::Json<Vec<UserActivityStats>>> {
    identity.require_role(Role::Admin)?;
    Ok(web::Json(state.activity.user_stats().await?))
}

/// Update an account. Self-service for names and passwords; role changes
/// require admin.
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "Account id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Validation failure", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "No such user", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<i32>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = path.into_inner();
    identity.require_self_or_admin(user_id)?;

    let payload = payload.into_inner();
    let role = match payload.role.as_deref() {
        None => None,
        Some(raw) => {
            identity.require_role(Role::Admin)?;
            Some(parse_role(raw)?)
        }
    };
    let update = UserUpdate {
        full_name: payload.full_name,
        role,
        password: payload.password,
    };
    if update.is_empty() {
        return Err(Error::invalid_request("no fields to update"));
    }
    state.users.update(user_id, update).await?;
    Ok(HttpResponse::Ok().finish())
}

/// Delete an account and scrub its references. Admin only; self-deletion is
/// rejected.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "Account id")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 400, description = "Attempted self-deletion", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "No such user", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let user_id = path.into_inner();
    identity.require_role(Role::Admin)?;
    if user_id == identity.id {
        return Err(Error::invalid_request("cannot delete your own account"));
    }
    let username = state.users.delete_cascading(user_id).await?;
    audit(
        &state,
        identity.id,
        "user_delete",
        &format!("Deleted user account: {username}"),
    )
    .await;
    Ok(HttpResponse::Ok().finish())
}
