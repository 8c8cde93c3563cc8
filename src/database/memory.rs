//! In-process implementation of the store traits.
//!
//! Rows live in insertion-ordered vectors behind a single `RwLock`, so
//! "newest first" is simply reverse iteration. Nothing survives a restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ApplicationStore, JobStore, NotificationStore, ProfileStore};
use crate::error::{Error, Result};
use crate::models::application::{
    Application, ApplicationFilter, ApplicationStatus, EmployerApplicationRow,
    FreelancerApplicationRow, NewApplication, ReviewUpdate,
};
use crate::models::job::{ApplicationCounts, Job, JobFilter, JobStatus, JobWithEmployer, NewJob, Page};
use crate::models::notification::{NewNotification, Notification};
use crate::models::profile::{NewProfile, Profile, ProfileUpdate, UserRole};

#[derive(Default)]
struct Tables {
    profiles: HashMap<Uuid, Profile>,
    jobs: Vec<Job>,
    applications: Vec<Application>,
    notifications: Vec<Notification>,
}

impl Tables {
    fn job(&self, id: Uuid) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for InMemoryStore {
    async fn insert_job(&self, job: NewJob) -> Result<Job> {
        let row = Job {
            id: Uuid::new_v4(),
            employer_id: job.employer_id,
            title: job.title,
            description: job.description,
            budget_min: job.budget_min,
            budget_max: job.budget_max,
            location: job.location,
            job_type: job.job_type,
            experience_level: job.experience_level,
            skills_required: job.skills_required,
            status: JobStatus::Open,
            created_at: Utc::now(),
        };
        self.tables.write().await.jobs.push(row.clone());
        Ok(row)
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<Job>> {
        Ok(self.tables.read().await.job(id).cloned())
    }

    async fn list_open_jobs(&self, filter: &JobFilter, page: Page) -> Result<(Vec<JobWithEmployer>, i64)> {
        let tables = self.tables.read().await;
        let matching: Vec<&Job> = tables
            .jobs
            .iter()
            .rev()
            .filter(|j| j.status == JobStatus::Open && filter.matches(j))
            .collect();
        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.per_page as usize)
            .map(|job| JobWithEmployer {
                employer_name: tables
                    .profiles
                    .get(&job.employer_id)
                    .and_then(|p| p.full_name.clone()),
                job: job.clone(),
            })
            .collect();
        Ok((items, total))
    }

    async fn list_jobs_by_employer(&self, employer_id: Uuid) -> Result<Vec<Job>> {
        let tables = self.tables.read().await;
        Ok(tables
            .jobs
            .iter()
            .rev()
            .filter(|j| j.employer_id == employer_id)
            .cloned()
            .collect())
    }

    async fn application_counts(&self, job_ids: &[Uuid]) -> Result<Vec<ApplicationCounts>> {
        let tables = self.tables.read().await;
        let mut counts: Vec<ApplicationCounts> = Vec::new();
        for job_id in job_ids {
            let mut tally = ApplicationCounts {
                job_id: *job_id,
                ..Default::default()
            };
            for app in tables.applications.iter().filter(|a| a.job_id == *job_id) {
                tally.total += 1;
                match app.status {
                    ApplicationStatus::Pending => tally.pending += 1,
                    ApplicationStatus::Shortlisted => tally.shortlisted += 1,
                    ApplicationStatus::Accepted => tally.accepted += 1,
                    ApplicationStatus::Rejected => tally.rejected += 1,
                }
            }
            if tally.total > 0 {
                counts.push(tally);
            }
        }
        Ok(counts)
    }

    async fn set_job_status(&self, id: Uuid, status: JobStatus) -> Result<Job> {
        let mut tables = self.tables.write().await;
        let job = tables
            .jobs
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or_else(|| Error::NotFound("Job not found".into()))?;
        job.status = status;
        Ok(job.clone())
    }
}

#[async_trait]
impl ApplicationStore for InMemoryStore {
    async fn insert_application(&self, application: NewApplication) -> Result<Application> {
        let mut tables = self.tables.write().await;
        if tables
            .applications
            .iter()
            .any(|a| a.job_id == application.job_id && a.freelancer_id == application.freelancer_id)
        {
            return Err(Error::Conflict("Resource already exists".into()));
        }
        let now = Utc::now();
        let row = Application {
            id: Uuid::new_v4(),
            job_id: application.job_id,
            freelancer_id: application.freelancer_id,
            status: ApplicationStatus::Pending,
            cover_letter: application.cover_letter,
            proposed_rate: application.proposed_rate,
            phone_number: application.phone_number,
            resume_key: application.resume_key,
            interview_date: None,
            interview_time: None,
            interview_notes: None,
            created_at: now,
            updated_at: now,
        };
        tables.applications.push(row.clone());
        Ok(row)
    }

    async fn get_application(&self, id: Uuid) -> Result<Option<Application>> {
        let tables = self.tables.read().await;
        Ok(tables.applications.iter().find(|a| a.id == id).cloned())
    }

    async fn find_application(&self, job_id: Uuid, freelancer_id: Uuid) -> Result<Option<Application>> {
        let tables = self.tables.read().await;
        Ok(tables
            .applications
            .iter()
            .find(|a| a.job_id == job_id && a.freelancer_id == freelancer_id)
            .cloned())
    }

    async fn update_review(&self, id: Uuid, update: &ReviewUpdate) -> Result<Application> {
        let mut tables = self.tables.write().await;
        let app = tables
            .applications
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| Error::NotFound("Application not found".into()))?;
        if app.status != update.expected {
            return Err(Error::Conflict(
                "Application status changed concurrently; reload and retry".into(),
            ));
        }
        app.status = update.status;
        app.interview_date = update.interview.as_ref().map(|i| i.date);
        app.interview_time = update.interview.as_ref().map(|i| i.time);
        app.interview_notes = update.interview.as_ref().and_then(|i| i.notes.clone());
        app.updated_at = Utc::now();
        Ok(app.clone())
    }

    async fn list_for_employer(
        &self,
        employer_id: Uuid,
        filter: &ApplicationFilter,
    ) -> Result<Vec<EmployerApplicationRow>> {
        let tables = self.tables.read().await;
        let rows = tables
            .applications
            .iter()
            .rev()
            .filter(|a| filter.matches(a))
            .filter_map(|a| {
                let job = tables.job(a.job_id).filter(|j| j.employer_id == employer_id)?;
                let freelancer = tables.profiles.get(&a.freelancer_id)?;
                Some(EmployerApplicationRow {
                    application: a.clone(),
                    freelancer_name: freelancer.full_name.clone(),
                    freelancer_email: freelancer.email.clone(),
                    job_title: job.title.clone(),
                })
            })
            .collect();
        Ok(rows)
    }

    async fn list_for_freelancer(&self, freelancer_id: Uuid) -> Result<Vec<FreelancerApplicationRow>> {
        let tables = self.tables.read().await;
        let rows = tables
            .applications
            .iter()
            .rev()
            .filter(|a| a.freelancer_id == freelancer_id)
            .filter_map(|a| {
                let job = tables.job(a.job_id)?;
                Some(FreelancerApplicationRow {
                    application: a.clone(),
                    job_title: job.title.clone(),
                    job_status: job.status,
                    job_budget_min: job.budget_min,
                    job_budget_max: job.budget_max,
                })
            })
            .collect();
        Ok(rows)
    }
}

#[async_trait]
impl NotificationStore for InMemoryStore {
    async fn insert_notification(&self, notification: NewNotification) -> Result<Notification> {
        let row = Notification {
            id: Uuid::new_v4(),
            user_id: notification.user_id,
            title: notification.title,
            message: notification.message,
            kind: notification.kind,
            read: false,
            related_application_id: notification.related_application_id,
            created_at: Utc::now(),
        };
        self.tables.write().await.notifications.push(row.clone());
        Ok(row)
    }

    async fn list_recent_notifications(&self, user_id: Uuid, limit: i64) -> Result<Vec<Notification>> {
        let tables = self.tables.read().await;
        Ok(tables
            .notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn mark_notification_read(&self, id: Uuid, user_id: Uuid) -> Result<Option<Notification>> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
            .map(|n| {
                n.read = true;
                n.clone()
            }))
    }

    async fn mark_all_notifications_read(&self, user_id: Uuid) -> Result<u64> {
        let mut tables = self.tables.write().await;
        let mut updated = 0;
        for n in tables
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id && !n.read)
        {
            n.read = true;
            updated += 1;
        }
        Ok(updated)
    }

    async fn unread_notification_count(&self, user_id: Uuid) -> Result<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && !n.read)
            .count() as i64)
    }
}

#[async_trait]
impl ProfileStore for InMemoryStore {
    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>> {
        Ok(self.tables.read().await.profiles.get(&id).cloned())
    }

    async fn ensure_profile(&self, profile: NewProfile) -> Result<Profile> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let row = tables.profiles.entry(profile.id).or_insert_with(|| Profile {
            id: profile.id,
            role: profile.role,
            full_name: None,
            email: profile.email,
            bio: None,
            location: None,
            hourly_rate: None,
            skills: Vec::new(),
            created_at: now,
            updated_at: now,
        });
        Ok(row.clone())
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<Profile> {
        let mut tables = self.tables.write().await;
        let profile = tables
            .profiles
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound("Profile not found".into()))?;
        profile.full_name = update.full_name;
        profile.bio = update.bio;
        profile.location = update.location;
        profile.hourly_rate = update.hourly_rate;
        profile.skills = update.skills;
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }

    async fn get_profiles(&self, ids: &[Uuid]) -> Result<Vec<Profile>> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.profiles.get(id).cloned())
            .collect())
    }

    async fn list_freelancers(&self, search: Option<&str>) -> Result<Vec<Profile>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Profile> = tables
            .profiles
            .values()
            .filter(|p| p.role == UserRole::Freelancer)
            .filter(|p| search.map_or(true, |term| p.matches_search(term)))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}
