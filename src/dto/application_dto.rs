use bytes::Bytes;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::application::{
    Application, ApplicationStatus, EmployerApplicationRow, FreelancerApplicationRow, Interview,
};
use crate::models::job::JobStatus;
use crate::utils::validation::{validate_cover_letter, validate_non_negative, validate_phone};

/// Form fields of an application; collected from multipart and validated server-side.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct SubmitApplicationPayload {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    #[validate(custom(function = "validate_cover_letter"))]
    pub cover_letter: String,
    #[validate(custom(function = "validate_non_negative"))]
    pub proposed_rate: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub filename: String,
    pub data: Bytes,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InterviewPayload {
    #[schema(example = "2025-06-01")]
    pub date: String,
    #[schema(example = "14:00")]
    pub time: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateApplicationStatusPayload {
    pub status: ApplicationStatus,
    pub interview: Option<InterviewPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EmployerApplicationsQuery {
    pub job_id: Option<Uuid>,
    pub status: Option<ApplicationStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InterviewResponse {
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    #[schema(value_type = String, example = "14:00")]
    #[serde(with = "hh_mm")]
    pub time: NaiveTime,
    pub notes: Option<String>,
}

/// Interview times travel as `HH:MM`, the same shape the review form sends.
mod hh_mm {
    use chrono::NaiveTime;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(D::Error::custom)
    }
}

impl From<Interview> for InterviewResponse {
    fn from(value: Interview) -> Self {
        Self {
            date: value.date,
            time: value.time,
            notes: value.notes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApplicationResponse {
    pub id: Uuid,
    pub job_id: Uuid,
    pub freelancer_id: Uuid,
    pub status: ApplicationStatus,
    pub cover_letter: String,
    pub proposed_rate: Option<Decimal>,
    pub phone_number: String,
    pub has_resume: bool,
    pub interview: Option<InterviewResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Application> for ApplicationResponse {
    fn from(value: Application) -> Self {
        let interview = value.interview().map(Into::into);
        Self {
            id: value.id,
            job_id: value.job_id,
            freelancer_id: value.freelancer_id,
            status: value.status,
            cover_letter: value.cover_letter,
            proposed_rate: value.proposed_rate,
            phone_number: value.phone_number,
            has_resume: value.resume_key.is_some(),
            interview,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EmployerApplicationResponse {
    #[serde(flatten)]
    pub application: ApplicationResponse,
    pub freelancer_name: Option<String>,
    pub freelancer_email: String,
    pub job_title: String,
}

impl From<EmployerApplicationRow> for EmployerApplicationResponse {
    fn from(value: EmployerApplicationRow) -> Self {
        Self {
            application: value.application.into(),
            freelancer_name: value.freelancer_name,
            freelancer_email: value.freelancer_email,
            job_title: value.job_title,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MyApplicationResponse {
    #[serde(flatten)]
    pub application: ApplicationResponse,
    pub job_title: String,
    pub job_status: JobStatus,
    pub job_budget_min: Option<Decimal>,
    pub job_budget_max: Option<Decimal>,
}

impl From<FreelancerApplicationRow> for MyApplicationResponse {
    fn from(value: FreelancerApplicationRow) -> Self {
        Self {
            application: value.application.into(),
            job_title: value.job_title,
            job_status: value.job_status,
            job_budget_min: value.job_budget_min,
            job_budget_max: value.job_budget_max,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReviewOutcomeResponse {
    pub application: ApplicationResponse,
    pub job_status: JobStatus,
    pub notification_id: Option<Uuid>,
    pub email_sent: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResumeLinkResponse {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}
