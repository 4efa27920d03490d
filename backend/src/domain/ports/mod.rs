//! Ports (traits) at the domain boundary.
//!
//! In hexagonal terms: inbound adapters drive these use-cases without
//! knowing the backing infrastructure, and outbound adapters implement them
//! against PostgreSQL, the JWT library, or the SMS vendor. Handler tests
//! substitute in-memory doubles instead of wiring persistence.

mod activity_log;
mod job_repository;
mod login_service;
mod report_repository;
mod sms;
mod token_service;
mod user_repository;

pub use activity_log::ActivityLog;
pub use job_repository::JobRepository;
pub use login_service::LoginService;
pub use report_repository::EngineerReportRepository;
pub use sms::{SmsDelivery, SmsGateway, SmsNotificationStore};
pub use token_service::{TokenError, TokenService};
pub use user_repository::UserRepository;
