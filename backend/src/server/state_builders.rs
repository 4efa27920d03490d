//! Builders assembling the HTTP state from database-backed adapters.

use std::sync::Arc;

use actix_web::web;

use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::persistence::{
    DieselActivityLog, DieselEngineerReportRepository, DieselJobRepository, DieselLoginService,
    DieselSmsNotificationStore, DieselUserRepository,
};

use super::ServerConfig;

/// Wire every port to its Diesel adapter over the shared pool.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let pool = config.db_pool.clone();
    web::Data::new(HttpState::new(HttpStatePorts {
        login: Arc::new(DieselLoginService::new(pool.clone())),
        tokens: Arc::new(config.tokens.clone()),
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        jobs: Arc::new(DieselJobRepository::new(pool.clone())),
        reports: Arc::new(DieselEngineerReportRepository::new(pool.clone())),
        activity: Arc::new(DieselActivityLog::new(pool.clone())),
        sms_gateway: config.sms_gateway.clone(),
        sms_store: Arc::new(DieselSmsNotificationStore::new(pool)),
    }))
}
