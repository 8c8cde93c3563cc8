//! Persistence seams for the marketplace tables.
//!
//! Services only see these traits; `PgStore` backs them with PostgreSQL and
//! `InMemoryStore` keeps everything in process for tests and local runs.

pub mod memory;
pub mod pool;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::application::{
    Application, ApplicationFilter, EmployerApplicationRow, FreelancerApplicationRow,
    NewApplication, ReviewUpdate,
};
use crate::models::job::{ApplicationCounts, Job, JobFilter, JobStatus, JobWithEmployer, NewJob, Page};
use crate::models::notification::{NewNotification, Notification};
use crate::models::profile::{NewProfile, Profile, ProfileUpdate};

#[async_trait]
pub trait JobStore: Send + Sync {
    async fn insert_job(&self, job: NewJob) -> Result<Job>;

    async fn get_job(&self, id: Uuid) -> Result<Option<Job>>;

    /// Open jobs matching `filter`, newest first, plus the total match count.
    async fn list_open_jobs(&self, filter: &JobFilter, page: Page) -> Result<(Vec<JobWithEmployer>, i64)>;

    async fn list_jobs_by_employer(&self, employer_id: Uuid) -> Result<Vec<Job>>;

    /// Tallies for every id in `job_ids`; jobs with no applications are omitted.
    async fn application_counts(&self, job_ids: &[Uuid]) -> Result<Vec<ApplicationCounts>>;

    async fn set_job_status(&self, id: Uuid, status: JobStatus) -> Result<Job>;
}

#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Fails with `Error::Conflict` when the freelancer already applied to the job.
    async fn insert_application(&self, application: NewApplication) -> Result<Application>;

    async fn get_application(&self, id: Uuid) -> Result<Option<Application>>;

    async fn find_application(&self, job_id: Uuid, freelancer_id: Uuid) -> Result<Option<Application>>;

    async fn update_review(&self, id: Uuid, update: &ReviewUpdate) -> Result<Application>;

    async fn list_for_employer(
        &self,
        employer_id: Uuid,
        filter: &ApplicationFilter,
    ) -> Result<Vec<EmployerApplicationRow>>;

    async fn list_for_freelancer(&self, freelancer_id: Uuid) -> Result<Vec<FreelancerApplicationRow>>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert_notification(&self, notification: NewNotification) -> Result<Notification>;

    async fn list_recent_notifications(&self, user_id: Uuid, limit: i64) -> Result<Vec<Notification>>;

    /// Flips `read` on a single row owned by `user_id`; `None` if no such row.
    async fn mark_notification_read(&self, id: Uuid, user_id: Uuid) -> Result<Option<Notification>>;

    async fn mark_all_notifications_read(&self, user_id: Uuid) -> Result<u64>;

    async fn unread_notification_count(&self, user_id: Uuid) -> Result<i64>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>>;

    /// Inserts the profile unless one already exists, returning the stored row.
    async fn ensure_profile(&self, profile: NewProfile) -> Result<Profile>;

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<Profile>;

    /// Batched loader keyed by id set; missing ids are skipped.
    async fn get_profiles(&self, ids: &[Uuid]) -> Result<Vec<Profile>>;

    async fn list_freelancers(&self, search: Option<&str>) -> Result<Vec<Profile>>;
}

/// Everything the services need from persistence.
pub trait MarketplaceStore: JobStore + ApplicationStore + NotificationStore + ProfileStore {}

impl<T> MarketplaceStore for T where T: JobStore + ApplicationStore + NotificationStore + ProfileStore {}

pub type DynStore = Arc<dyn MarketplaceStore>;
