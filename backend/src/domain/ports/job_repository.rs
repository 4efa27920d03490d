//! Port for repair-job persistence.

use async_trait::async_trait;

use crate::domain::{Error, Job, JobIntake, JobStatistics};

/// Job store: the primary entity being tracked.
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// All jobs, most recently checked in first.
    async fn list(&self) -> Result<Vec<Job>, Error>;

    /// The `count` most recently checked-in jobs.
    async fn latest(&self, count: i64) -> Result<Vec<Job>, Error>;

    /// Highest job reference issued so far; 0 when no jobs exist.
    async fn latest_ref(&self) -> Result<i32, Error>;

    /// Look up a job by reference.
    async fn find(&self, job_ref: i32) -> Result<Option<Job>, Error>;

    /// Book a job in; the store assigns the monotonic `job_ref`.
    async fn create(&self, intake: &JobIntake, actor: i32) -> Result<i32, Error>;

    /// Replace a job's editable fields outside the report flow.
    ///
    /// Fails with `NotFound` when the reference does not exist.
    async fn update(&self, job_ref: i32, intake: &JobIntake, actor: i32) -> Result<(), Error>;

    /// Dashboard aggregates: counts per status plus today's intake totals.
    async fn statistics(&self) -> Result<JobStatistics, Error>;
}
