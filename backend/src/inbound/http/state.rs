//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ReportSubmissionService;
use crate::domain::ports::{
    ActivityLog, EngineerReportRepository, JobRepository, LoginService, SmsGateway,
    SmsNotificationStore, TokenService, UserRepository,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub tokens: Arc<dyn TokenService>,
    pub users: Arc<dyn UserRepository>,
    pub jobs: Arc<dyn JobRepository>,
    pub reports: Arc<dyn EngineerReportRepository>,
    pub activity: Arc<dyn ActivityLog>,
    pub sms_gateway: Arc<dyn SmsGateway>,
    pub sms_store: Arc<dyn SmsNotificationStore>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub tokens: Arc<dyn TokenService>,
    pub users: Arc<dyn UserRepository>,
    pub jobs: Arc<dyn JobRepository>,
    pub reports: Arc<dyn EngineerReportRepository>,
    pub report_submission: ReportSubmissionService,
    pub activity: Arc<dyn ActivityLog>,
    pub sms_gateway: Arc<dyn SmsGateway>,
    pub sms_store: Arc<dyn SmsNotificationStore>,
}

impl HttpState {
    /// Construct state from a ports bundle, wiring the report submission
    /// use-case over the report and activity ports.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            login,
            tokens,
            users,
            jobs,
            reports,
            activity,
            sms_gateway,
            sms_store,
        } = ports;
        let report_submission = ReportSubmissionService::new(reports.clone(), activity.clone());
        Self {
            login,
            tokens,
            users,
            jobs,
            reports,
            report_submission,
            activity,
            sms_gateway,
            sms_store,
        }
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}
