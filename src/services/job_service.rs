use std::collections::HashMap;

use tracing::info;
use uuid::Uuid;

use crate::database::DynStore;
use crate::dto::job_dto::{CreateJobPayload, JobListQuery};
use crate::error::{Error, Result};
use crate::middleware::auth::AuthContext;
use crate::models::job::{ApplicationCounts, Job, JobStatus, JobWithEmployer, NewJob, Page};
use crate::models::profile::{normalize_skills, UserRole};
use crate::services::profile_service::ensure_caller;

#[derive(Clone)]
pub struct JobService {
    store: DynStore,
}

pub struct JobList {
    pub items: Vec<JobWithEmployer>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl JobService {
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }

    pub async fn create_job(&self, ctx: &AuthContext, payload: CreateJobPayload) -> Result<Job> {
        ctx.require_role(UserRole::Employer)?;
        ensure_caller(&self.store, ctx).await?;

        let title = payload.title.trim().to_string();
        if title.is_empty() {
            return Err(Error::BadRequest("Title is required".into()));
        }

        let job = self
            .store
            .insert_job(NewJob {
                employer_id: ctx.user_id,
                title,
                description: payload.description.trim().to_string(),
                budget_min: payload.budget_min,
                budget_max: payload.budget_max,
                location: trimmed(payload.location),
                job_type: trimmed(payload.job_type),
                experience_level: trimmed(payload.experience_level),
                skills_required: normalize_skills(payload.skills_required),
            })
            .await?;

        info!(job_id = %job.id, employer_id = %ctx.user_id, "job posted");
        Ok(job)
    }

    pub async fn list_open_jobs(&self, query: JobListQuery) -> Result<JobList> {
        let page = Page::new(query.page, query.per_page);
        let filter = query.filter();
        let (items, total) = self.store.list_open_jobs(&filter, page).await?;
        let total_pages = if total == 0 {
            0
        } else {
            (total + page.per_page - 1) / page.per_page
        };
        Ok(JobList {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
            total_pages,
        })
    }

    pub async fn get_job(&self, id: Uuid) -> Result<Job> {
        self.store
            .get_job(id)
            .await?
            .ok_or_else(|| Error::NotFound("Job not found".into()))
    }

    /// The employer's own jobs, newest first, each with its application tallies.
    pub async fn list_employer_jobs(&self, ctx: &AuthContext) -> Result<Vec<(Job, ApplicationCounts)>> {
        ctx.require_role(UserRole::Employer)?;
        let jobs = self.store.list_jobs_by_employer(ctx.user_id).await?;
        let ids: Vec<Uuid> = jobs.iter().map(|j| j.id).collect();
        let mut counts: HashMap<Uuid, ApplicationCounts> = self
            .store
            .application_counts(&ids)
            .await?
            .into_iter()
            .map(|c| (c.job_id, c))
            .collect();

        Ok(jobs
            .into_iter()
            .map(|job| {
                let tally = counts.remove(&job.id).unwrap_or_else(|| ApplicationCounts {
                    job_id: job.id,
                    ..Default::default()
                });
                (job, tally)
            })
            .collect())
    }

    pub async fn close_job(&self, ctx: &AuthContext, id: Uuid) -> Result<Job> {
        ctx.require_role(UserRole::Employer)?;
        let job = self.get_job(id).await?;
        if job.employer_id != ctx.user_id {
            return Err(Error::Forbidden("You do not own this job".into()));
        }
        if job.status == JobStatus::Closed {
            return Ok(job);
        }
        let job = self.store.set_job_status(id, JobStatus::Closed).await?;
        info!(job_id = %id, "job closed");
        Ok(job)
    }
}
