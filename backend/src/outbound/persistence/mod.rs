//! Diesel/PostgreSQL persistence adapters.

mod diesel_activity_log;
mod diesel_helpers;
mod diesel_job_repository;
mod diesel_login_service;
mod diesel_report_repository;
mod diesel_sms_store;
mod diesel_user_repository;
mod models;
mod password;
pub mod pool;
pub mod schema;

pub use diesel_activity_log::DieselActivityLog;
pub use diesel_job_repository::DieselJobRepository;
pub use diesel_login_service::DieselLoginService;
pub use diesel_report_repository::DieselEngineerReportRepository;
pub use diesel_sms_store::DieselSmsNotificationStore;
pub use diesel_user_repository::DieselUserRepository;
