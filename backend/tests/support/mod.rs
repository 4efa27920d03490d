//! Shared fixtures for integration suites: an in-memory store standing in
//! for the Diesel adapters, a permissive SMS gateway, and the assembled
//! HTTP state over the real JWT token service.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use actix_web::{Scope, web};
use async_trait::async_trait;
use chrono::Utc;

use backend::domain::ports::{
    ActivityLog, EngineerReportRepository, JobRepository, LoginService, SmsDelivery, SmsGateway,
    SmsNotificationStore, TokenService,
};
use backend::domain::{
    ActivityEntry, ActivityEntryWithUser, ActivityFilter, EngineerReport, EngineerWorkload, Error,
    Identity, Job, JobIntake, JobStatistics, JobStatus, LoginCredentials, NewUser, PasswordChange,
    ReportDraft, ReportOutcome, Role, SmsAttempt, SmsNotification, SmsStatus, User,
    UserActivityStats, UserUpdate,
};
use backend::inbound::http::state::{HttpState, HttpStatePorts};
use backend::inbound::http::{activity, jobs, reports, sms, users};
use backend::outbound::token::JwtTokenService;

pub const JWT_SECRET: &[u8] = b"integration-test-secret";

struct Account {
    user: User,
    password: String,
}

#[derive(Default)]
struct StoreData {
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
}

/// One mutex-guarded store behind every persistence port, so a report
/// submission is observed by subsequent job reads just as it would be
/// against the database.
#[derive(Default)]
pub struct InMemoryStore {
    data: Mutex<StoreData>,
}

impl InMemoryStore {
    fn lock(&self) -> MutexGuard<'_, StoreData> {
        self.data.lock().expect("store state poisoned")
    }

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

    pub fn job(&self, job_ref: i32) -> Option<Job> {
        self.lock().jobs.iter().find(|j| j.job_ref == job_ref).cloned()
    }

    pub fn report_for(&self, job_ref: i32) -> Option<EngineerReport> {
        self.lock()
            .reports
            .iter()
            .find(|r| r.job_ref == job_ref)
            .cloned()
    }

    pub fn report_rows_for(&self, job_ref: i32) -> usize {
        self.lock()
            .reports
            .iter()
            .filter(|r| r.job_ref == job_ref)
            .count()
    }

    pub fn activity_types_for(&self, user_id: i32) -> Vec<String> {
        self.lock()
            .activity
            .iter()
            .filter(|e| e.user_id == user_id)
            .map(|e| e.activity_type.clone())
            .collect()
    }
}

#[async_trait]
impl LoginService for InMemoryStore {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        self.lock()
            .accounts
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
impl backend::domain::ports::UserRepository for InMemoryStore {
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
        Ok(username)
    }
}

#[async_trait]
impl JobRepository for InMemoryStore {
    async fn list(&self) -> Result<Vec<Job>, Error> {
        let mut jobs = self.lock().jobs.clone();
        jobs.sort_by(|a, b| b.job_ref.cmp(&a.job_ref));
        Ok(jobs)
    }

    async fn latest(&self, count: i64) -> Result<Vec<Job>, Error> {
        let mut jobs = self.list().await?;
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
        let mut data = self.lock();
        data.next_job_ref += 1;
        let job_ref = data.next_job_ref;
        data.jobs.push(Job {
            job_ref,
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
        });
        Ok(job_ref)
    }

    async fn update(&self, job_ref: i32, intake: &JobIntake, actor: i32) -> Result<(), Error> {
        let mut data = self.lock();
        let job = data
            .jobs
            .iter_mut()
            .find(|j| j.job_ref == job_ref)
            .ok_or_else(|| Error::not_found("job not found"))?;
        job.customer_name = intake.customer_name.clone();
        job.status = intake.status;
        job.deposit_paid = intake.deposit_paid;
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
            *status_counts
                .entry(job.status.as_str().to_owned())
                .or_insert(0) += 1;
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
impl EngineerReportRepository for InMemoryStore {
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
        let mut counts: HashMap<String, i64> = HashMap::new();
        for report in &data.reports {
            let open = data.jobs.iter().any(|j| {
                j.job_ref == report.job_ref
                    && matches!(j.status, JobStatus::Queued | JobStatus::OnBench)
            });
            if open {
                *counts.entry(report.engineer_name.clone()).or_insert(0) += 1;
            }
        }
        Ok(counts
            .into_iter()
            .map(|(engineer_name, job_count)| EngineerWorkload {
                engineer_name,
                job_count,
            })
            .collect())
    }
}

#[async_trait]
impl ActivityLog for InMemoryStore {
    async fn append(&self, user_id: i32, activity_type: &str, details: &str) -> Result<(), Error> {
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
        Ok(())
    }

    async fn recent_for_user(
        &self,
        user_id: i32,
        limit: i64,
    ) -> Result<Vec<ActivityEntry>, Error> {
        Ok(self
            .lock()
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
impl SmsNotificationStore for InMemoryStore {
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
            if n.status == SmsStatus::Sent && job_refs.contains(&n.job_ref) {
                *counts.entry(n.job_ref).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }
}

/// Gateway that accepts every message.
pub struct AcceptAllGateway;

#[async_trait]
impl SmsGateway for AcceptAllGateway {
    async fn send(&self, _to: &str, _body: &str) -> Result<SmsDelivery, Error> {
        Ok(SmsDelivery::Accepted {
            message_id: "itest-message".into(),
        })
    }
}

/// Store, real token service, and the assembled HTTP state.
pub struct Fixture {
    pub store: Arc<InMemoryStore>,
    pub tokens: JwtTokenService,
    pub state: web::Data<HttpState>,
}

pub fn fixture() -> Fixture {
    let store = Arc::new(InMemoryStore::default());
    let tokens = JwtTokenService::new(JWT_SECRET, 365);
    let state = web::Data::new(HttpState::new(HttpStatePorts {
        login: store.clone(),
        tokens: Arc::new(tokens.clone()),
        users: store.clone(),
        jobs: store.clone(),
        reports: store.clone(),
        activity: store.clone(),
        sms_gateway: Arc::new(AcceptAllGateway),
        sms_store: store.clone(),
    }));
    Fixture {
        store,
        tokens,
        state,
    }
}

impl Fixture {
    /// Issue a real bearer token for a seeded user.
    pub fn token_for(&self, user: &User) -> String {
        self.tokens
            .issue(&Identity {
                id: user.id,
                username: user.username.clone(),
                full_name: user.full_name.clone(),
                role: user.role,
            })
            .expect("token issue never fails in tests")
    }
}

/// The full `/api` route table, registered in the same order as the server.
pub fn api_scope() -> Scope {
    web::scope("/api")
        .service(users::login)
        .service(users::register)
        .service(users::refresh_token)
        .service(users::change_password)
        .service(users::me)
        .service(users::get_profile)
        .service(users::update_profile)
        .service(users::activity_stats)
        .service(users::list_users)
        .service(users::update_user)
        .service(users::delete_user)
        .service(jobs::list_jobs)
        .service(jobs::latest_job_ref)
        .service(jobs::latest_jobs)
        .service(jobs::get_job)
        .service(jobs::create_job)
        .service(jobs::update_job)
        .service(jobs::statistics)
        .service(jobs::engineer_workload)
        .service(reports::get_report)
        .service(reports::submit_report)
        .service(activity::log_activity)
        .service(activity::my_activity)
        .service(activity::list_activity)
        .service(sms::send_sms)
        .service(sms::sms_history)
        .service(sms::sms_counts)
}
