//! Port for the append-only audit trail.

use async_trait::async_trait;

use crate::domain::{ActivityEntry, ActivityEntryWithUser, ActivityFilter, Error, UserActivityStats};

/// Audit-trail sink and query surface.
///
/// Appends are best-effort at every call site: a failed audit write is
/// logged and swallowed, never propagated into the caller's response, and
/// always happens outside the business transaction it describes.
#[async_trait]
pub trait ActivityLog: Send + Sync {
    /// Append one entry attributed to `user_id`.
    async fn append(&self, user_id: i32, activity_type: &str, details: &str) -> Result<(), Error>;

    /// A user's own recent entries, newest first.
    async fn recent_for_user(&self, user_id: i32, limit: i64)
        -> Result<Vec<ActivityEntry>, Error>;

    /// Recent entries across all users with acting-user details, newest
    /// first. Admin-only at the HTTP layer.
    async fn recent(
        &self,
        filter: &ActivityFilter,
        limit: i64,
    ) -> Result<Vec<ActivityEntryWithUser>, Error>;

    /// Per-user activity aggregates for the admin dashboard.
    async fn user_stats(&self) -> Result<Vec<UserActivityStats>, Error>;
}
