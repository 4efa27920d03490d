//! Repair jobs: the primary entity tracked by the system.
//!
//! A job is identified by `job_ref`, a monotonic reference assigned at
//! creation and never reused. Status is always one of five enumerated
//! values; it is never null and unknown strings are rejected at the edge.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Error;

/// Workflow position of a job on the bench.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum JobStatus {
    /// Booked in, waiting for a bench slot.
    #[serde(rename = "Queued")]
    Queued,
    /// An engineer is actively working on the device.
    #[serde(rename = "On Bench")]
    OnBench,
    /// Blocked on a customer decision (quote approval, data consent).
    #[serde(rename = "Waiting for Customer")]
    WaitingForCustomer,
    /// Repair completed successfully; customer can collect.
    #[serde(rename = "Repaired")]
    Repaired,
    /// Closed without a successful repair.
    #[serde(rename = "Unrepaired")]
    Unrepaired,
}

impl JobStatus {
    /// Display string stored in the database and shown to clients.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "Queued",
            Self::OnBench => "On Bench",
            Self::WaitingForCustomer => "Waiting for Customer",
            Self::Repaired => "Repaired",
            Self::Unrepaired => "Unrepaired",
        }
    }

    /// Resolve an optional caller-supplied status for the report flow.
    ///
    /// An omitted status falls back to `On Bench` (observed permissive
    /// behaviour, kept deliberately); an unknown string is a validation
    /// failure rather than a silent substitution.
    pub fn parse_or_bench(input: Option<&str>) -> Result<Self, Error> {
        match input {
            None => Ok(Self::OnBench),
            Some(raw) => raw.parse(),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Queued" => Ok(Self::Queued),
            "On Bench" => Ok(Self::OnBench),
            "Waiting for Customer" => Ok(Self::WaitingForCustomer),
            "Repaired" => Ok(Self::Repaired),
            "Unrepaired" => Ok(Self::Unrepaired),
            other => Err(Error::invalid_request(format!(
                "unknown job status: {other}"
            ))),
        }
    }
}

/// A persisted repair job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Job {
    /// Monotonic job reference, assigned at creation, never reused.
    pub job_ref: i32,
    pub customer_name: String,
    pub contact_number: String,
    pub job_details: String,
    /// Free-text initials of whoever booked the device in.
    pub booked_in_by: String,
    /// Deposit in whole pounds, never negative.
    pub deposit_paid: i32,
    pub manufacturer: String,
    pub device_type: String,
    pub serial_number: Option<String>,
    pub additional_notes: String,
    pub status: JobStatus,
    /// Set at creation, immutable thereafter.
    pub checked_in_date: DateTime<Utc>,
    /// Actor that created the job; nulled if that account is deleted.
    pub created_by: Option<i32>,
    /// Actor behind the most recent save.
    pub updated_by: Option<i32>,
}

/// Validated job intake/edit fields shared by create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct JobIntake {
    pub customer_name: String,
    pub contact_number: String,
    pub job_details: String,
    pub booked_in_by: String,
    pub deposit_paid: i32,
    pub manufacturer: String,
    pub device_type: String,
    pub serial_number: Option<String>,
    pub additional_notes: String,
    pub status: JobStatus,
}

/// Raw intake fields as they arrive from a client, before validation.
#[derive(Debug, Clone, Default)]
pub struct JobIntakeDraft {
    pub customer_name: String,
    pub contact_number: String,
    pub job_details: String,
    pub booked_in_by: String,
    /// As typed by the front desk: may carry a currency symbol or commas.
    pub deposit_paid: String,
    pub manufacturer: String,
    pub device_type: String,
    pub serial_number: Option<String>,
    pub additional_notes: String,
    /// Omitted status defaults to `Queued` at intake.
    pub status: Option<String>,
}

impl JobIntakeDraft {
    /// Validate the draft into a [`JobIntake`].
    ///
    /// # Errors
    /// - customer name or contact number blank,
    /// - deposit not parseable as a non-negative whole-pound amount,
    /// - unrecognised status string.
    pub fn validate(self) -> Result<JobIntake, Error> {
        if self.customer_name.trim().is_empty() || self.contact_number.trim().is_empty() {
            return Err(Error::invalid_request(
                "customer name and contact number are required",
            ));
        }

        let deposit_paid = parse_deposit(&self.deposit_paid)?;
        let status = match self.status.as_deref() {
            None => JobStatus::Queued,
            Some(raw) => raw.parse()?,
        };

        Ok(JobIntake {
            customer_name: self.customer_name,
            contact_number: self.contact_number,
            job_details: self.job_details,
            booked_in_by: self.booked_in_by,
            deposit_paid,
            manufacturer: self.manufacturer,
            device_type: self.device_type,
            serial_number: self.serial_number,
            additional_notes: self.additional_notes,
            status,
        })
    }
}

/// Parse a front-desk deposit entry into whole pounds.
///
/// Strips `£` signs and thousands separators before parsing; the result must
/// be a non-negative integer.
pub fn parse_deposit(raw: &str) -> Result<i32, Error> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '£' && *c != ',')
        .collect();

    let amount: i32 = cleaned
        .parse()
        .map_err(|_| Error::invalid_request("invalid deposit amount format"))?;

    if amount < 0 {
        return Err(Error::invalid_request("deposit amount must not be negative"));
    }
    Ok(amount)
}

/// Aggregated job counts for the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobStatistics {
    /// Job count per status display string.
    pub status_counts: std::collections::HashMap<String, i64>,
    /// Jobs checked in today.
    pub today_jobs: i64,
    /// Deposits taken today, whole pounds.
    pub today_deposits: i64,
}

/// Open-bench report count per engineer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EngineerWorkload {
    pub engineer_name: String,
    pub job_count: i64,
}
