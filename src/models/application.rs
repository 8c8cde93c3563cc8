use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::job::JobStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "application_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Shortlisted,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ApplicationStatus::Accepted | ApplicationStatus::Rejected)
    }

    /// Checks an employer-initiated move from `self` to `next`.
    ///
    /// Interview data may only travel with a shortlist, and staying on
    /// `shortlisted` is only meaningful when an interview is being (re)scheduled.
    pub fn check_transition(
        self,
        next: ApplicationStatus,
        with_interview: bool,
    ) -> Result<(), TransitionError> {
        if next == ApplicationStatus::Pending {
            return Err(TransitionError::InvalidTarget(next));
        }
        if with_interview && next != ApplicationStatus::Shortlisted {
            return Err(TransitionError::InterviewRequiresShortlist(next));
        }
        if self.is_terminal() {
            return Err(TransitionError::Terminal(self));
        }
        if self == ApplicationStatus::Shortlisted && next == ApplicationStatus::Shortlisted && !with_interview {
            return Err(TransitionError::AlreadyShortlisted);
        }
        Ok(())
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("application is already {0} and cannot be changed")]
    Terminal(ApplicationStatus),
    #[error("cannot move an application to {0}")]
    InvalidTarget(ApplicationStatus),
    #[error("interview details can only be set when shortlisting, not when moving to {0}")]
    InterviewRequiresShortlist(ApplicationStatus),
    #[error("application is already shortlisted")]
    AlreadyShortlisted,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub freelancer_id: Uuid,
    pub status: ApplicationStatus,
    pub cover_letter: String,
    pub proposed_rate: Option<Decimal>,
    pub phone_number: String,
    pub resume_key: Option<String>,
    pub interview_date: Option<NaiveDate>,
    pub interview_time: Option<NaiveTime>,
    pub interview_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    pub fn interview(&self) -> Option<Interview> {
        match (self.interview_date, self.interview_time) {
            (Some(date), Some(time)) => Some(Interview {
                date,
                time,
                notes: self.interview_notes.clone(),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interview {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub job_id: Uuid,
    pub freelancer_id: Uuid,
    pub cover_letter: String,
    pub proposed_rate: Option<Decimal>,
    pub phone_number: String,
    pub resume_key: Option<String>,
}

/// Fields written by the review workflow in a single row update.
/// `interview: None` clears any previously scheduled interview.
#[derive(Debug, Clone)]
pub struct ReviewUpdate {
    /// Status the row must still have for the write to apply.
    pub expected: ApplicationStatus,
    pub status: ApplicationStatus,
    pub interview: Option<Interview>,
}

/// Application joined with applicant and job details for the employer dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmployerApplicationRow {
    #[sqlx(flatten)]
    pub application: Application,
    pub freelancer_name: Option<String>,
    pub freelancer_email: String,
    pub job_title: String,
}

/// Application joined with job details for the freelancer's own list.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FreelancerApplicationRow {
    #[sqlx(flatten)]
    pub application: Application,
    pub job_title: String,
    pub job_status: JobStatus,
    pub job_budget_min: Option<Decimal>,
    pub job_budget_max: Option<Decimal>,
}

#[derive(Debug, Clone, Default)]
pub struct ApplicationFilter {
    pub job_id: Option<Uuid>,
    pub status: Option<ApplicationStatus>,
}

impl ApplicationFilter {
    pub fn matches(&self, app: &Application) -> bool {
        self.job_id.map_or(true, |id| app.job_id == id)
            && self.status.map_or(true, |s| app.status == s)
    }
}
