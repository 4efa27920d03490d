//! Customer SMS notifications and phone-number normalisation.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Error;

/// Delivery status recorded for every send attempt, success or failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SmsStatus {
    Sent,
    Failed,
}

impl SmsStatus {
    /// Tag stored in the `sms_notifications.status` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for SmsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SmsStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sent" => Ok(Self::Sent),
            "failed" => Ok(Self::Failed),
            other => Err(Error::internal(format!("unknown sms status: {other}"))),
        }
    }
}

/// A recorded SMS attempt, immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SmsNotification {
    pub id: i32,
    pub job_ref: i32,
    /// Username of the actor who triggered the send.
    pub sent_by: String,
    /// Recipient as entered, before normalisation.
    pub recipient: String,
    pub message: String,
    pub status: SmsStatus,
    pub sent_at: DateTime<Utc>,
}

/// Fields captured for an attempt before the row id/timestamp exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsAttempt {
    pub job_ref: i32,
    pub sent_by: String,
    pub recipient: String,
    pub message: String,
    pub status: SmsStatus,
}

/// Normalise a UK phone number to E.164 for the gateway.
///
/// A leading `0` becomes `+44` with spaces and dashes stripped; numbers
/// already carrying `+` pass through untouched, matching what the front
/// desk actually types.
pub fn normalise_uk_number(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('+') {
        return trimmed.to_owned();
    }
    if let Some(rest) = trimmed.strip_prefix('0') {
        let digits: String = rest.chars().filter(|c| !c.is_whitespace() && *c != '-').collect();
        return format!("+44{digits}");
    }
    trimmed.to_owned()
}
