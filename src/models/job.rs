use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "job_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Open,
    InProgress,
    Closed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Open => "open",
            JobStatus::InProgress => "in_progress",
            JobStatus::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: Uuid,
    pub employer_id: Uuid,
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

/// Job row joined with the posting employer's display name.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobWithEmployer {
    #[sqlx(flatten)]
    pub job: Job,
    pub employer_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewJob {
    pub employer_id: Uuid,
    pub title: String,
    pub description: String,
    pub budget_min: Option<Decimal>,
    pub budget_max: Option<Decimal>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
    pub skills_required: Vec<String>,
}

/// Browse filters for open jobs. Empty fields do not constrain.
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub search: Option<String>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
    pub budget_min: Option<Decimal>,
    pub budget_max: Option<Decimal>,
}

impl JobFilter {
    /// In-process evaluation of the filter; the SQL store expresses the same predicate.
    pub fn matches(&self, job: &Job) -> bool {
        if let Some(term) = self.search.as_deref() {
            let term = term.to_lowercase();
            let hit = job.title.to_lowercase().contains(&term)
                || job.description.to_lowercase().contains(&term)
                || job
                    .skills_required
                    .iter()
                    .any(|s| s.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }
        if let Some(job_type) = self.job_type.as_deref() {
            if job.job_type.as_deref() != Some(job_type) {
                return false;
            }
        }
        if let Some(level) = self.experience_level.as_deref() {
            if job.experience_level.as_deref() != Some(level) {
                return false;
            }
        }
        if let Some(min) = self.budget_min {
            match job.budget_min {
                Some(v) if v >= min => {}
                _ => return false,
            }
        }
        if let Some(max) = self.budget_max {
            match job.budget_max {
                Some(v) if v <= max => {}
                _ => return false,
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub page: i64,
    pub per_page: i64,
}

impl Page {
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(20).clamp(1, 100),
        }
    }

    /// Saturates instead of overflowing for absurd page numbers.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// Per-job application tallies for the employer dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ApplicationCounts {
    pub job_id: Uuid,
    pub total: i64,
    pub pending: i64,
    pub shortlisted: i64,
    pub accepted: i64,
    pub rejected: i64,
}
