//! Shared in-memory port implementations for handler tests.
//!
//! One [`InMemoryWorkshop`] implements every persistence-facing port over a
//! single mutex-guarded state so handler tests observe the same cross-port
//! effects (job status moved by a report submission, audit rows, SMS
//! history) that the Diesel adapters produce, without a database.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::ports::{
    ActivityLog, EngineerReportRepository, JobRepository, LoginService, SmsDelivery, SmsGateway,
    SmsNotificationStore, TokenError, TokenService, UserRepository,
};
use crate::domain::{
    ActivityEntry, ActivityEntryWithUser, ActivityFilter, EngineerReport, EngineerWorkload,
    Error, Identity, Job, JobIntake, JobStatistics, LoginCredentials, NewUser, PasswordChange,
    ReportDraft, ReportOutcome, Role, SmsAttempt, SmsNotification, User, UserActivityStats,
    UserUpdate,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};

struct Account {
    user: User,
    password: String,
}

#[derive(Default)]
struct WorkshopData {
    accounts: Vec<Account>,
    jobs: Vec<Job>,
    reports: Vec<EngineerReport>,
    activity: Vec<ActivityEntry>,
    sms: Vec<SmsNotification>,
    next_user_id: i32,
    next_job_ref: i32,
    next_report_id: i32,
    next_activity_id: i32,
    next_sms_id: i32,
    /// When set, the next report upsert fails after the job lookup,
    /// simulating a mid-transaction failure that must roll back.
    fail_next_report_write: bool,
    /// When set, audit appends fail.
    fail_activity: bool,
}

/// In-memory stand-in for the Diesel adapters.
#[derive(Default)]
pub struct InMemoryWorkshop {
    data: Mutex<WorkshopData>,
}

impl InMemoryWorkshop {
    fn lock(&self) -> MutexGuard<'_, WorkshopData> {
        self.data.lock().expect("workshop state poisoned")
    }

    /// Seed an account with a known password; returns the stored user.
    pub fn seed_user(&self, username: &str, password: &str, full_name: &str, role: Role) -> User {
        let mut data = self.lock();
        data.next_user_id += 1;
        let user = User {
            id: data.next_user_id,
            username: username.to_owned(),
            full_name: full_name.to_owned(),
            role,
            created_at: Utc::now(),
        };
        data.accounts.push(Account {
            user: user.clone(),
            password: password.to_owned(),
        });
        user
    }

    /// Seed a job directly, bypassing intake validation.
    pub fn seed_job(&self, intake: &JobIntake, actor: i32) -> Job {
        let mut data = self.lock();
        data.next_job_ref += 1;
        let job = Job {
            job_ref: data.next_job_ref,
            customer_name: intake.customer_name.clone(),
            contact_number: intake.contact_number.clone(),
            job_details: intake.job_details.clone(),
            booked_in_by: intake.booked_in_by.clone(),
            deposit_paid: intake.deposit_paid,
            manufacturer: intake.manufacturer.clone(),
            device_type: intake.device_type.clone(),
            serial_number: intake.serial_number.clone(),
            additional_notes: intake.additional_notes.clone(),
            status: intake.status,
            checked_in_date: Utc::now(),
            created_by: Some(actor),
            updated_by: Some(actor),
        };
        data.jobs.push(job.clone());
        job
    }

    /// Arrange for the next report submission to fail mid-write.
    pub fn fail_next_report_write(&self) {
        self.lock().fail_next_report_write = true;
    }

    /// Make audit appends fail until cleared.
    pub fn fail_activity_appends(&self, fail: bool) {
        self.lock().fail_activity = fail;
    }

    /// Snapshot of a job's current state.
    pub fn job(&self, job_ref: i32) -> Option<Job> {
        self.lock().jobs.iter().find(|j| j.job_ref == job_ref).cloned()
    }

    /// Number of report rows held for a job.
    pub fn report_rows_for(&self, job_ref: i32) -> usize {
        self.lock()
            .reports
            .iter()
            .filter(|r| r.job_ref == job_ref)
            .count()
    }

    /// Append an audit entry synchronously, bypassing the port.
    pub fn append_entry_for_tests(&self, user_id: i32, activity_type: &str, details: &str) {
        let mut data = self.lock();
        data.next_activity_id += 1;
        let entry = ActivityEntry {
            id: data.next_activity_id,
            user_id,
            activity_type: activity_type.to_owned(),
            details: details.to_owned(),
            timestamp: Utc::now(),
        };
        data.activity.push(entry);
    }

    /// Audit entries with the given tag, oldest first.
    pub fn activity_with_type(&self, activity_type: &str) -> Vec<ActivityEntry> {
        self.lock()
            .activity
            .iter()
            .filter(|e| e.activity_type == activity_type)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl LoginService for InMemoryWorkshop {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let data = self.lock();
        data.accounts
            .iter()
            .find(|a| a.user.username == credentials.username())
            .filter(|a| a.password == credentials.password())
            .map(|a| a.user.clone())
            .ok_or_else(|| Error::unauthorized("invalid username or password"))
    }

    async fn change_password(&self, user_id: i32, change: &PasswordChange) -> Result<(), Error> {
        let mut data = self.lock();
        let account = data
            .accounts
            .iter_mut()
            .find(|a| a.user.id == user_id)
            .ok_or_else(|| Error::not_found("user not found"))?;
        if account.password != change.current() {
            return Err(Error::unauthorized("current password is incorrect"));
        }
        account.password = change.new_password().to_owned();
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryWorkshop {
    async fn list(&self) -> Result<Vec<User>, Error> {
        Ok(self.lock().accounts.iter().map(|a| a.user.clone()).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, Error> {
        Ok(self
            .lock()
            .accounts
            .iter()
            .find(|a| a.user.id == id)
            .map(|a| a.user.clone()))
    }

    async fn create(&self, new_user: NewUser) -> Result<i32, Error> {
        let mut data = self.lock();
        if data
            .accounts
            .iter()
            .any(|a| a.user.username == new_user.username)
        {
            return Err(Error::invalid_request("username already exists"));
        }
        data.next_user_id += 1;
        let id = data.next_user_id;
        data.accounts.push(Account {
            user: User {
                id,
                username: new_user.username,
                full_name: new_user.full_name,
                role: new_user.role,
                created_at: Utc::now(),
            },
            password: new_user.password,
        });
        Ok(id)
    }

    async fn update(&self, id: i32, update: UserUpdate) -> Result<(), Error> {
        let mut data = self.lock();
        let account = data
            .accounts
            .iter_mut()
            .find(|a| a.user.id == id)
            .ok_or_else(|| Error::not_found("user not found"))?;
        if let Some(full_name) = update.full_name {
            account.user.full_name = full_name;
        }
        if let Some(role) = update.role {
            account.user.role = role;
        }
        if let Some(password) = update.password {
            account.password = password;
        }
        Ok(())
    }

    async fn delete_cascading(&self, id: i32) -> Result<String, Error> {
        let mut data = self.lock();
        let index = data
            .accounts
            .iter()
            .position(|a| a.user.id == id)
            .ok_or_else(|| Error::not_found("user not found"))?;
        let username = data.accounts.remove(index).user.username;
        data.activity.retain(|e| e.user_id != id);
        for job in &mut data.jobs {
            if job.created_by == Some(id) {
                job.created_by = None;
            }
            if job.updated_by == Some(id) {
                job.updated_by = None;
            }
        }
        for report in &mut data.reports {
            if report.updated_by == Some(id) {
                report.updated_by = None;
            }
        }
        Ok(username)
    }
}

#[async_trait]
impl JobRepository for InMemoryWorkshop {
    async fn list(&self) -> Result<Vec<Job>, Error> {
        let mut jobs = self.lock().jobs.clone();
        jobs.sort_by(|a, b| b.job_ref.cmp(&a.job_ref));
        Ok(jobs)
    }

    async fn latest(&self, count: i64) -> Result<Vec<Job>, Error> {
        let mut jobs = JobRepository::list(self).await?;
        jobs.truncate(usize::try_from(count).unwrap_or(0));
        Ok(jobs)
    }

    async fn latest_ref(&self) -> Result<i32, Error> {
        Ok(self.lock().jobs.iter().map(|j| j.job_ref).max().unwrap_or(0))
    }

    async fn find(&self, job_ref: i32) -> Result<Option<Job>, Error> {
        Ok(self.job(job_ref))
    }

    async fn create(&self, intake: &JobIntake, actor: i32) -> Result<i32, Error> {
        Ok(self.seed_job(intake, actor).job_ref)
    }

    async fn update(&self, job_ref: i32, intake: &JobIntake, actor: i32) -> Result<(), Error> {
        let mut data = self.lock();
        let job = data
            .jobs
            .iter_mut()
            .find(|j| j.job_ref == job_ref)
            .ok_or_else(|| Error::not_found("job not found"))?;
        job.customer_name = intake.customer_name.clone();
        job.contact_number = intake.contact_number.clone();
        job.job_details = intake.job_details.clone();
        job.booked_in_by = intake.booked_in_by.clone();
        job.deposit_paid = intake.deposit_paid;
        job.manufacturer = intake.manufacturer.clone();
        job.device_type = intake.device_type.clone();
        job.serial_number = intake.serial_number.clone();
        job.additional_notes = intake.additional_notes.clone();
        job.status = intake.status;
        job.updated_by = Some(actor);
        Ok(())
    }

    async fn statistics(&self) -> Result<JobStatistics, Error> {
        let data = self.lock();
        let mut status_counts = HashMap::new();
        let today = Utc::now().date_naive();
        let mut today_jobs = 0;
        let mut today_deposits = 0;
        for job in &data.jobs {
            *status_counts.entry(job.status.as_str().to_owned()).or_insert(0) += 1;
            if job.checked_in_date.date_naive() == today {
                today_jobs += 1;
                today_deposits += i64::from(job.deposit_paid);
            }
        }
        Ok(JobStatistics {
            status_counts,
            today_jobs,
            today_deposits,
        })
    }
}

#[async_trait]
impl EngineerReportRepository for InMemoryWorkshop {
    async fn find_by_job(&self, job_ref: i32) -> Result<Option<EngineerReport>, Error> {
        Ok(self
            .lock()
            .reports
            .iter()
            .find(|r| r.job_ref == job_ref)
            .cloned())
    }

    async fn submit(&self, draft: &ReportDraft, actor: i32) -> Result<ReportOutcome, Error> {
        let mut data = self.lock();
        if !data.jobs.iter().any(|j| j.job_ref == draft.job_ref) {
            return Err(Error::not_found("job not found"));
        }
        // Atomic in memory: nothing is mutated before the failure check.
        if std::mem::take(&mut data.fail_next_report_write) {
            return Err(Error::service_unavailable("simulated write failure"));
        }
        if let Some(job) = data.jobs.iter_mut().find(|j| j.job_ref == draft.job_ref) {
            job.status = draft.status;
            job.updated_by = Some(actor);
        }
        if let Some(report) = data.reports.iter_mut().find(|r| r.job_ref == draft.job_ref) {
            report.engineer_name = draft.engineer_name.clone();
            report.time_spent = draft.time_spent.clone();
            report.repair_notes = draft.repair_notes.clone();
            report.updated_by = Some(actor);
            return Ok(ReportOutcome::Updated);
        }
        data.next_report_id += 1;
        let report = EngineerReport {
            id: data.next_report_id,
            job_ref: draft.job_ref,
            engineer_name: draft.engineer_name.clone(),
            time_spent: draft.time_spent.clone(),
            repair_notes: draft.repair_notes.clone(),
            updated_by: Some(actor),
        };
        data.reports.push(report);
        Ok(ReportOutcome::Created)
    }

    async fn workload(&self) -> Result<Vec<EngineerWorkload>, Error> {
        let data = self.lock();
        let open: HashSet<i32> = data
            .jobs
            .iter()
            .filter(|j| {
                matches!(
                    j.status,
                    crate::domain::JobStatus::Queued | crate::domain::JobStatus::OnBench
                )
            })
            .map(|j| j.job_ref)
            .collect();
        let mut counts: HashMap<String, i64> = HashMap::new();
        for report in data.reports.iter().filter(|r| open.contains(&r.job_ref)) {
            *counts.entry(report.engineer_name.clone()).or_insert(0) += 1;
        }
        let mut workload: Vec<EngineerWorkload> = counts
            .into_iter()
            .map(|(engineer_name, job_count)| EngineerWorkload {
                engineer_name,
                job_count,
            })
            .collect();
        workload.sort_by(|a, b| b.job_count.cmp(&a.job_count));
        Ok(workload)
    }
}

#[async_trait]
impl ActivityLog for InMemoryWorkshop {
    async fn append(&self, user_id: i32, activity_type: &str, details: &str) -> Result<(), Error> {
        let mut data = self.lock();
        if data.fail_activity {
            return Err(Error::service_unavailable("audit store down"));
        }
        data.next_activity_id += 1;
        let entry = ActivityEntry {
            id: data.next_activity_id,
            user_id,
            activity_type: activity_type.to_owned(),
            details: details.to_owned(),
            timestamp: Utc::now(),
        };
        data.activity.push(entry);
        Ok(())
    }

    async fn recent_for_user(
        &self,
        user_id: i32,
        limit: i64,
    ) -> Result<Vec<ActivityEntry>, Error> {
        let data = self.lock();
        Ok(data
            .activity
            .iter()
            .rev()
            .filter(|e| e.user_id == user_id)
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect())
    }

    async fn recent(
        &self,
        filter: &ActivityFilter,
        limit: i64,
    ) -> Result<Vec<ActivityEntryWithUser>, Error> {
        let data = self.lock();
        Ok(data
            .activity
            .iter()
            .rev()
            .filter(|e| filter.user_id.is_none_or(|id| e.user_id == id))
            .filter(|e| {
                filter
                    .activity_type
                    .as_deref()
                    .is_none_or(|t| e.activity_type == t)
            })
            .take(usize::try_from(limit).unwrap_or(0))
            .filter_map(|entry| {
                data.accounts
                    .iter()
                    .find(|a| a.user.id == entry.user_id)
                    .map(|a| ActivityEntryWithUser {
                        entry: entry.clone(),
                        username: a.user.username.clone(),
                        full_name: a.user.full_name.clone(),
                    })
            })
            .collect())
    }

    async fn user_stats(&self) -> Result<Vec<UserActivityStats>, Error> {
        let data = self.lock();
        let mut stats: Vec<UserActivityStats> = data
            .accounts
            .iter()
            .map(|a| {
                let mut row = UserActivityStats {
                    id: a.user.id,
                    username: a.user.username.clone(),
                    full_name: a.user.full_name.clone(),
                    ..UserActivityStats::default()
                };
                for entry in data.activity.iter().filter(|e| e.user_id == a.user.id) {
                    match entry.activity_type.as_str() {
                        "login" => row.login_count += 1,
                        "job_create" => row.jobs_created += 1,
                        "job_update" => row.jobs_updated += 1,
                        "report_update" => row.reports_updated += 1,
                        _ => {}
                    }
                    row.total_activities += 1;
                }
                row
            })
            .collect();
        stats.sort_by(|a, b| b.total_activities.cmp(&a.total_activities));
        Ok(stats)
    }
}

#[async_trait]
impl SmsNotificationStore for InMemoryWorkshop {
    async fn record(&self, attempt: &SmsAttempt) -> Result<SmsNotification, Error> {
        let mut data = self.lock();
        data.next_sms_id += 1;
        let row = SmsNotification {
            id: data.next_sms_id,
            job_ref: attempt.job_ref,
            sent_by: attempt.sent_by.clone(),
            recipient: attempt.recipient.clone(),
            message: attempt.message.clone(),
            status: attempt.status,
            sent_at: Utc::now(),
        };
        data.sms.push(row.clone());
        Ok(row)
    }

    async fn history_for_job(&self, job_ref: i32) -> Result<Vec<SmsNotification>, Error> {
        Ok(self
            .lock()
            .sms
            .iter()
            .rev()
            .filter(|n| n.job_ref == job_ref)
            .cloned()
            .collect())
    }

    async fn sent_counts(&self, job_refs: &[i32]) -> Result<HashMap<i32, i64>, Error> {
        let data = self.lock();
        let mut counts = HashMap::new();
        for n in &data.sms {
            if n.status == crate::domain::SmsStatus::Sent && job_refs.contains(&n.job_ref) {
                *counts.entry(n.job_ref).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }
}

/// Deterministic token service: issued tokens validate back to the identity
/// they embedded; tokens can be registered as expired or treated as invalid.
#[derive(Default)]
pub struct StubTokenService {
    issued: Mutex<HashMap<String, Identity>>,
    expired: Mutex<HashSet<String>>,
    counter: AtomicUsize,
}

impl StubTokenService {
    /// Register a token that validates as expired.
    pub fn expired_token(&self) -> String {
        let token = format!("expired-{}", self.counter.fetch_add(1, Ordering::Relaxed));
        self.expired.lock().expect("lock").insert(token.clone());
        token
    }
}

impl TokenService for StubTokenService {
    fn issue(&self, identity: &Identity) -> Result<String, Error> {
        let token = format!(
            "tok-{}-{}",
            identity.id,
            self.counter.fetch_add(1, Ordering::Relaxed)
        );
        self.issued
            .lock()
            .expect("lock")
            .insert(token.clone(), identity.clone());
        Ok(token)
    }

    fn validate(&self, token: &str) -> Result<Identity, TokenError> {
        if self.expired.lock().expect("lock").contains(token) {
            return Err(TokenError::Expired);
        }
        self.issued
            .lock()
            .expect("lock")
            .get(token)
            .cloned()
            .ok_or(TokenError::Invalid)
    }
}

/// Scripted SMS gateway.
pub struct StubSmsGateway {
    outcomes: Mutex<Vec<Result<SmsDelivery, Error>>>,
    pub sent: Mutex<Vec<(String, String)>>,
}

impl Default for StubSmsGateway {
    fn default() -> Self {
        Self {
            outcomes: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
        }
    }
}

impl StubSmsGateway {
    /// Queue the outcome for the next send; unscripted sends succeed.
    pub fn push_outcome(&self, outcome: Result<SmsDelivery, Error>) {
        self.outcomes.lock().expect("lock").push(outcome);
    }
}

#[async_trait]
impl SmsGateway for StubSmsGateway {
    async fn send(&self, to: &str, body: &str) -> Result<SmsDelivery, Error> {
        self.sent
            .lock()
            .expect("lock")
            .push((to.to_owned(), body.to_owned()));
        let scripted = self.outcomes.lock().expect("lock").pop();
        scripted.unwrap_or_else(|| {
            Ok(SmsDelivery::Accepted {
                message_id: "stub-message".into(),
            })
        })
    }
}

/// Everything a handler test needs: the store, the token stub, the gateway,
/// and the assembled `HttpState`.
pub struct TestHarness {
    pub workshop: Arc<InMemoryWorkshop>,
    pub tokens: Arc<StubTokenService>,
    pub gateway: Arc<StubSmsGateway>,
    pub state: actix_web::web::Data<HttpState>,
}

/// Build an `HttpState` over fresh in-memory adapters.
pub fn harness() -> TestHarness {
    let workshop = Arc::new(InMemoryWorkshop::default());
    let tokens = Arc::new(StubTokenService::default());
    let gateway = Arc::new(StubSmsGateway::default());
    let state = actix_web::web::Data::new(HttpState::new(HttpStatePorts {
        login: workshop.clone(),
        tokens: tokens.clone(),
        users: workshop.clone(),
        jobs: workshop.clone(),
        reports: workshop.clone(),
        activity: workshop.clone(),
        sms_gateway: gateway.clone(),
        sms_store: workshop.clone(),
    }));
    TestHarness {
        workshop,
        tokens,
        gateway,
        state,
    }
}

impl TestHarness {
    /// Issue a bearer token for a seeded user.
    pub fn token_for(&self, user: &User) -> String {
        self.tokens
            .issue(&Identity {
                id: user.id,
                username: user.username.clone(),
                full_name: user.full_name.clone(),
                role: user.role,
            })
            .expect("stub issue never fails")
    }
}

/// A plausible intake used across job tests.
pub fn sample_intake() -> JobIntake {
    JobIntake {
        customer_name: "J Smith".into(),
        contact_number: "07911123456".into(),
        job_details: "Laptop will not boot".into(),
        booked_in_by: "KL".into(),
        deposit_paid: 20,
        manufacturer: "Lenovo".into(),
        device_type: "Laptop".into(),
        serial_number: Some("SN-1234".into()),
        additional_notes: String::new(),
        status: crate::domain::JobStatus::Queued,
    }
}
