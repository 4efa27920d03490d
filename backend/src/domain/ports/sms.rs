//! Ports for the SMS collaborator: the vendor gateway and the local
//! notification history.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::{Error, SmsAttempt, SmsNotification};

/// Vendor verdict for a single message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmsDelivery {
    /// The gateway accepted the message for delivery.
    Accepted {
        /// Vendor-assigned message id.
        message_id: String,
    },
    /// The gateway refused the message.
    Rejected {
        /// Vendor-supplied reason, surfaced to the caller.
        reason: String,
    },
}

/// Outbound SMS vendor. Failures here are reported to the caller but never
/// rolled back against already-committed job/report state; the notification
/// is a side effect of a mutation, not part of it.
#[async_trait]
pub trait SmsGateway: Send + Sync {
    /// Send `body` to the E.164 number `to`.
    ///
    /// # Errors
    /// `ExternalService` when the vendor cannot be reached at all; a
    /// reachable vendor that refuses the message yields
    /// [`SmsDelivery::Rejected`] instead.
    async fn send(&self, to: &str, body: &str) -> Result<SmsDelivery, Error>;
}

/// Local, immutable history of send attempts.
#[async_trait]
pub trait SmsNotificationStore: Send + Sync {
    /// Record an attempt (sent or failed) and return the stored row.
    async fn record(&self, attempt: &SmsAttempt) -> Result<SmsNotification, Error>;

    /// All attempts for a job, newest first.
    async fn history_for_job(&self, job_ref: i32) -> Result<Vec<SmsNotification>, Error>;

    /// Count of successfully sent messages per job, for the jobs listed.
    async fn sent_counts(&self, job_refs: &[i32]) -> Result<HashMap<i32, i64>, Error>;
}
