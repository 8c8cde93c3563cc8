use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::job::{ApplicationCounts, Job, JobFilter, JobStatus, JobWithEmployer};
use crate::utils::validation::validate_non_negative;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_budget_range"))]
pub struct CreateJobPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(custom(function = "validate_non_negative"))]
    pub budget_min: Option<Decimal>,
    #[validate(custom(function = "validate_non_negative"))]
    pub budget_max: Option<Decimal>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
    #[serde(default)]
    pub skills_required: Vec<String>,
}

fn validate_budget_range(payload: &CreateJobPayload) -> Result<(), ValidationError> {
    if let (Some(min), Some(max)) = (payload.budget_min, payload.budget_max) {
        if max < min {
            let mut err = ValidationError::new("budget_range");
            err.message = Some("budget_max must be greater than or equal to budget_min".into());
            return Err(err);
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct JobListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub search: Option<String>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
    pub budget_min: Option<Decimal>,
    pub budget_max: Option<Decimal>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl JobListQuery {
    pub fn filter(&self) -> JobFilter {
        JobFilter {
            search: non_blank(self.search.clone()),
            job_type: non_blank(self.job_type.clone()),
            experience_level: non_blank(self.experience_level.clone()),
            budget_min: self.budget_min,
            budget_max: self.budget_max,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JobResponse {
    pub id: Uuid,
    pub employer_id: Uuid,
    pub employer_name: Option<String>,
    pub title: String,
    pub description: String,
    pub budget_min: Option<Decimal>,
    pub budget_max: Option<Decimal>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
    pub skills_required: Vec<String>,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Job> for JobResponse {
    fn from(value: Job) -> Self {
        Self {
            id: value.id,
            employer_id: value.employer_id,
            employer_name: None,
            title: value.title,
            description: value.description,
            budget_min: value.budget_min,
            budget_max: value.budget_max,
            location: value.location,
            job_type: value.job_type,
            experience_level: value.experience_level,
            skills_required: value.skills_required,
            status: value.status,
            created_at: value.created_at,
        }
    }
}

impl From<JobWithEmployer> for JobResponse {
    fn from(value: JobWithEmployer) -> Self {
        Self {
            employer_name: value.employer_name,
            ..JobResponse::from(value.job)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JobListResponse {
    pub items: Vec<JobResponse>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ApplicationCountsResponse {
    pub total: i64,
    pub pending: i64,
    pub shortlisted: i64,
    pub accepted: i64,
    pub rejected: i64,
}

impl From<ApplicationCounts> for ApplicationCountsResponse {
    fn from(value: ApplicationCounts) -> Self {
        Self {
            total: value.total,
            pending: value.pending,
            shortlisted: value.shortlisted,
            accepted: value.accepted,
            rejected: value.rejected,
        }
    }
}

/// A job on the employer dashboard with its application tallies.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EmployerJobResponse {
    #[serde(flatten)]
    pub job: JobResponse,
    pub applications: ApplicationCountsResponse,
}
