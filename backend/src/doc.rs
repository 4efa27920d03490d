//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] aggregates every REST endpoint plus the request and response
//! schemas they reference. Swagger UI serves the generated document in
//! debug builds at `/docs`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Token issued by POST /api/users/login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Workshop backend API",
        description = "HTTP interface for repair-job tracking, engineer reports, \
                       customer SMS notifications, and user administration."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::refresh_token,
        crate::inbound::http::users::register,
        crate::inbound::http::users::me,
        crate::inbound::http::users::get_profile,
        crate::inbound::http::users::update_profile,
        crate::inbound::http::users::change_password,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::activity_stats,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::jobs::list_jobs,
        crate::inbound::http::jobs::latest_job_ref,
        crate::inbound::http::jobs::latest_jobs,
        crate::inbound::http::jobs::get_job,
        crate::inbound::http::jobs::create_job,
        crate::inbound::http::jobs::update_job,
        crate::inbound::http::jobs::statistics,
        crate::inbound::http::jobs::engineer_workload,
        crate::inbound::http::reports::get_report,
        crate::inbound::http::reports::submit_report,
        crate::inbound::http::activity::log_activity,
        crate::inbound::http::activity::list_activity,
        crate::inbound::http::activity::my_activity,
        crate::inbound::http::sms::send_sms,
        crate::inbound::http::sms::sms_history,
        crate::inbound::http::sms::sms_counts,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        crate::domain::Error,
        crate::domain::ErrorCode,
        crate::domain::Identity,
        crate::domain::Role,
        crate::domain::User,
        crate::domain::Job,
        crate::domain::JobStatus,
        crate::domain::JobStatistics,
        crate::domain::EngineerWorkload,
        crate::domain::EngineerReport,
        crate::domain::ReportView,
        crate::domain::ReportOutcome,
        crate::domain::ActivityEntry,
        crate::domain::ActivityEntryWithUser,
        crate::domain::UserActivityStats,
        crate::domain::SmsNotification,
        crate::domain::SmsStatus,
    ))
)]
pub struct ApiDoc;
