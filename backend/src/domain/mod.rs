//! Domain layer: entities, value objects, use-cases, and the ports that
//! adapters implement. Nothing in here touches HTTP or the database.

mod activity;
mod auth;
mod error;
mod identity;
mod job;
pub mod ports;
mod report;
mod report_service;
mod sms;
mod user;

pub use activity::{ActivityEntry, ActivityEntryWithUser, ActivityFilter, UserActivityStats};
pub use auth::{CredentialValidationError, LoginCredentials, PasswordChange};
pub use error::{Error, ErrorCode};
pub use identity::{Identity, Role, UnknownRole};
pub use job::{
    EngineerWorkload, Job, JobIntake, JobIntakeDraft, JobStatistics, JobStatus, parse_deposit,
};
pub use report::{EngineerReport, ReportDraft, ReportOutcome, ReportView};
pub use report_service::ReportSubmissionService;
pub use sms::{SmsAttempt, SmsNotification, SmsStatus, normalise_uk_number};
pub use user::{NewUser, User, UserUpdate};
