//! Row and insert types bridging the Diesel schema and the domain.
//!
//! Enum-like columns (role, job status, sms status) are stored as their
//! display strings; conversion back into the domain rejects values the
//! enums do not know, surfacing schema drift as an internal error instead
//! of silently misclassifying rows.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::{
    ActivityEntry, EngineerReport, Error, Job, JobStatus, Role, SmsNotification, SmsStatus, User,
};

use super::schema::{activity_logs, engineer_reports, jobs, sms_notifications, users};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    /// Convert into the domain user, dropping the hash.
    pub fn into_user(self) -> Result<User, Error> {
        let role: Role = self
            .role
            .parse()
            .map_err(|err| Error::internal(format!("corrupt users row {}: {err}", self.id)))?;
        Ok(User {
            id: self.id,
            username: self.username,
            full_name: self.full_name,
            role,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
    pub full_name: &'a str,
    pub role: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = jobs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct JobRow {
    pub job_ref: i32,
    pub customer_name: String,
    pub contact_number: String,
    pub job_details: String,
    pub booked_in_by: String,
    pub deposit_paid: i32,
    pub manufacturer: String,
    pub device_type: String,
    pub serial_number: Option<String>,
    pub additional_notes: String,
    pub status: String,
    pub checked_in_date: DateTime<Utc>,
    pub created_by: Option<i32>,
    pub updated_by: Option<i32>,
}

impl TryFrom<JobRow> for Job {
    type Error = Error;

    fn try_from(row: JobRow) -> Result<Self, Error> {
        let status: JobStatus = row.status.parse().map_err(|_| {
            Error::internal(format!(
                "corrupt jobs row {}: unknown status {}",
                row.job_ref, row.status
            ))
        })?;
        Ok(Self {
            job_ref: row.job_ref,
            customer_name: row.customer_name,
            contact_number: row.contact_number,
            job_details: row.job_details,
            booked_in_by: row.booked_in_by,
            deposit_paid: row.deposit_paid,
            manufacturer: row.manufacturer,
            device_type: row.device_type,
            serial_number: row.serial_number,
            additional_notes: row.additional_notes,
            status,
            checked_in_date: row.checked_in_date,
            created_by: row.created_by,
            updated_by: row.updated_by,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = jobs)]
pub struct NewJobRow<'a> {
    pub customer_name: &'a str,
    pub contact_number: &'a str,
    pub job_details: &'a str,
    pub booked_in_by: &'a str,
    pub deposit_paid: i32,
    pub manufacturer: &'a str,
    pub device_type: &'a str,
    pub serial_number: Option<&'a str>,
    pub additional_notes: &'a str,
    pub status: &'a str,
    pub created_by: Option<i32>,
    pub updated_by: Option<i32>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = engineer_reports)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReportRow {
    pub id: i32,
    pub job_ref: i32,
    pub engineer_name: String,
    pub time_spent: String,
    pub repair_notes: String,
    pub updated_by: Option<i32>,
}

impl From<ReportRow> for EngineerReport {
    fn from(row: ReportRow) -> Self {
        Self {
            id: row.id,
            job_ref: row.job_ref,
            engineer_name: row.engineer_name,
            time_spent: row.time_spent,
            repair_notes: row.repair_notes,
            updated_by: row.updated_by,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = engineer_reports)]
pub struct NewReportRow<'a> {
    pub job_ref: i32,
    pub engineer_name: &'a str,
    pub time_spent: &'a str,
    pub repair_notes: &'a str,
    pub updated_by: Option<i32>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = activity_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ActivityRow {
    pub id: i32,
    pub user_id: i32,
    pub activity_type: String,
    pub details: String,
    pub timestamp: DateTime<Utc>,
}

impl From<ActivityRow> for ActivityEntry {
    fn from(row: ActivityRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            activity_type: row.activity_type,
            details: row.details,
            timestamp: row.timestamp,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = activity_logs)]
pub struct NewActivityRow<'a> {
    pub user_id: i32,
    pub activity_type: &'a str,
    pub details: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = sms_notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SmsRow {
    pub id: i32,
    pub job_ref: i32,
    pub sent_by: String,
    pub recipient: String,
    pub message: String,
    pub status: String,
    pub sent_at: DateTime<Utc>,
}

impl TryFrom<SmsRow> for SmsNotification {
    type Error = Error;

    fn try_from(row: SmsRow) -> Result<Self, Error> {
        let status: SmsStatus = row.status.parse()?;
        Ok(Self {
            id: row.id,
            job_ref: row.job_ref,
            sent_by: row.sent_by,
            recipient: row.recipient,
            message: row.message,
            status,
            sent_at: row.sent_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = sms_notifications)]
pub struct NewSmsRow<'a> {
    pub job_ref: i32,
    pub sent_by: &'a str,
    pub recipient: &'a str,
    pub message: &'a str,
    pub status: &'a str,
}
