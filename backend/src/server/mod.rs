//! Server construction and route wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{activity, jobs, reports, sms, users};
use crate::middleware::RequestTrace;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    // Literal paths are registered before their parametrised siblings so
    // e.g. /users/activity-stats never binds as /users/{id}.
    let api = web::scope("/api")
        .service(users::login)
        .service(users::register)
        .service(users::refresh_token)
        .service(users::change_password)
        .service(users::me)
        .service(users::get_profile)
        .service(users::update_profile)
        .service(users::activity_stats)
        .service(users::list_users)
        .service(users::update_user)
        .service(users::delete_user)
        .service(jobs::list_jobs)
        .service(jobs::latest_job_ref)
        .service(jobs::latest_jobs)
        .service(jobs::get_job)
        .service(jobs::create_job)
        .service(jobs::update_job)
        .service(jobs::statistics)
        .service(jobs::engineer_workload)
        .service(reports::get_report)
        .service(reports::submit_report)
        .service(activity::log_activity)
        .service(activity::my_activity)
        .service(activity::list_activity)
        .service(sms::send_sms)
        .service(sms::sms_history)
        .service(sms::sms_counts);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(RequestTrace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server over the configured adapters.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config);

    let server = HttpServer::new(move || {
        build_app(server_health_state.clone(), http_state.clone())
    })
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
