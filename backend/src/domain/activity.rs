//! Append-only audit trail of user actions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One audit entry. Never mutated or deleted by normal operation; the only
/// exception is admin account deletion, which removes the deleted user's own
/// rows alongside the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ActivityEntry {
    pub id: i32,
    pub user_id: i32,
    /// Short machine-readable tag, e.g. "login", "job_create",
    /// "report_update".
    pub activity_type: String,
    /// Human-readable summary, e.g. "Created job #1001 for J Smith".
    pub details: String,
    pub timestamp: DateTime<Utc>,
}

/// Audit entry joined with the acting user for admin views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ActivityEntryWithUser {
    #[serde(flatten)]
    pub entry: ActivityEntry,
    pub username: String,
    pub full_name: String,
}

/// Admin filters for the audit listing. `None` means "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityFilter {
    pub user_id: Option<i32>,
    pub activity_type: Option<String>,
}

/// Per-user activity aggregate for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserActivityStats {
    pub id: i32,
    pub username: String,
    pub full_name: String,
    pub login_count: i64,
    pub jobs_created: i64,
    pub jobs_updated: i64,
    pub reports_updated: i64,
    pub total_activities: i64,
}
