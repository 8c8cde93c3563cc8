//! Employer review of applications: status transitions, interview
//! scheduling and the notification/email fan-out that follows.
//!
//! Only the application update is load-bearing. The job status change, the
//! notification insert and the email are attempted in that order after it
//! commits; their failures are logged and reflected in [`ReviewOutcome`],
//! never rolled back and never retried.

use chrono::{NaiveDate, NaiveTime};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::database::DynStore;
use crate::dto::application_dto::InterviewPayload;
use crate::error::{Error, Result};
use crate::middleware::auth::AuthContext;
use crate::models::application::{Application, ApplicationStatus, Interview, ReviewUpdate};
use crate::models::job::{Job, JobStatus};
use crate::models::notification::{NewNotification, NotificationType};
use crate::models::profile::{Profile, UserRole};
use crate::services::email_service::{interview_email, status_email, DynEmailSender, EmailMessage};
use crate::services::notification_service::NotificationService;

pub const MAX_INTERVIEW_NOTES: usize = 2000;

#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    pub application: Application,
    pub job_status: JobStatus,
    pub notification_id: Option<Uuid>,
    pub email_sent: bool,
}

/// Parses `YYYY-MM-DD` / `HH:MM` interview input; blank notes become `None`.
pub fn parse_interview(payload: &InterviewPayload) -> Result<Interview> {
    let date = NaiveDate::parse_from_str(payload.date.trim(), "%Y-%m-%d")
        .map_err(|_| Error::BadRequest("Interview date must be YYYY-MM-DD".into()))?;
    let raw_time = payload.time.trim();
    let time = NaiveTime::parse_from_str(raw_time, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw_time, "%H:%M:%S"))
        .map_err(|_| Error::BadRequest("Interview time must be HH:MM".into()))?;
    let notes = payload
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);
    if notes.as_ref().map_or(false, |n| n.chars().count() > MAX_INTERVIEW_NOTES) {
        return Err(Error::BadRequest("Interview notes must be 2000 characters or fewer".into()));
    }
    Ok(Interview { date, time, notes })
}

fn notification_for(job: &Job, application: &Application) -> NewNotification {
    let (title, message, kind) = match (application.status, application.interview()) {
        (ApplicationStatus::Shortlisted, Some(interview)) => (
            "Interview Scheduled".to_string(),
            format!(
                "Your interview for \"{}\" is scheduled on {} at {}.",
                job.title,
                interview.date.format("%Y-%m-%d"),
                interview.time.format("%H:%M")
            ),
            NotificationType::Info,
        ),
        (status, _) => (
            format!("Application {}", status),
            format!("Your application for \"{}\" has been {}.", job.title, status),
            match status {
                ApplicationStatus::Accepted => NotificationType::Success,
                ApplicationStatus::Rejected => NotificationType::Error,
                _ => NotificationType::Info,
            },
        ),
    };
    NewNotification {
        user_id: application.freelancer_id,
        title,
        message,
        kind,
        related_application_id: Some(application.id),
    }
}

#[derive(Clone)]
pub struct ReviewService {
    store: DynStore,
    notifications: NotificationService,
    email: DynEmailSender,
}

impl ReviewService {
    pub fn new(store: DynStore, notifications: NotificationService, email: DynEmailSender) -> Self {
        Self { store, notifications, email }
    }

    pub async fn update_application_status(
        &self,
        ctx: &AuthContext,
        application_id: Uuid,
        new_status: ApplicationStatus,
        interview: Option<InterviewPayload>,
    ) -> Result<ReviewOutcome> {
        ctx.require_role(UserRole::Employer)?;

        let current = self
            .store
            .get_application(application_id)
            .await?
            .ok_or_else(|| Error::NotFound("Application not found".into()))?;
        let job = self
            .store
            .get_job(current.job_id)
            .await?
            .ok_or_else(|| Error::NotFound("Job not found".into()))?;
        if job.employer_id != ctx.user_id {
            return Err(Error::Forbidden("You do not own this job".into()));
        }

        let interview = interview.as_ref().map(parse_interview).transpose()?;
        current
            .status
            .check_transition(new_status, interview.is_some())?;

        let application = self
            .store
            .update_review(
                application_id,
                &ReviewUpdate {
                    expected: current.status,
                    status: new_status,
                    interview,
                },
            )
            .await?;
        info!(
            application_id = %application_id,
            from = %current.status,
            to = %new_status,
            interview = application.interview().is_some(),
            "application status updated"
        );

        let mut job_status = job.status;
        if new_status == ApplicationStatus::Accepted {
            match self.store.set_job_status(job.id, JobStatus::InProgress).await {
                Ok(updated) => job_status = updated.status,
                Err(e) => error!(job_id = %job.id, error = %e, "failed to move job to in_progress"),
            }
        }

        let notification_id = match self.notifications.create(notification_for(&job, &application)).await {
            Ok(row) => Some(row.id),
            Err(e) => {
                error!(application_id = %application_id, error = %e, "failed to create notification");
                None
            }
        };

        let email_sent = self.dispatch_email(&job, &application).await;

        Ok(ReviewOutcome {
            application,
            job_status,
            notification_id,
            email_sent,
        })
    }

    async fn dispatch_email(&self, job: &Job, application: &Application) -> bool {
        let message = match self.compose_email(job, application).await {
            Ok(Some(message)) => message,
            Ok(None) => {
                warn!(application_id = %application.id, "freelancer has no email address, skipping email");
                return false;
            }
            Err(e) => {
                warn!(application_id = %application.id, error = %e, "failed to load email recipients");
                return false;
            }
        };

        match self.email.send(&message).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    application_id = %application.id,
                    sender = self.email.name(),
                    error = %e,
                    "failed to send application email"
                );
                false
            }
        }
    }

    async fn compose_email(&self, job: &Job, application: &Application) -> Result<Option<EmailMessage>> {
        let profiles = self
            .store
            .get_profiles(&[application.freelancer_id, job.employer_id])
            .await?;
        let find = |id: Uuid| profiles.iter().find(|p| p.id == id);

        let Some(freelancer) = find(application.freelancer_id).filter(|p| !p.email.is_empty()) else {
            return Ok(None);
        };
        let employer_name = find(job.employer_id).map(Profile::display_name);

        let message = match application.interview() {
            Some(interview) if application.status == ApplicationStatus::Shortlisted => interview_email(
                &freelancer.email,
                &freelancer.display_name(),
                &job.title,
                employer_name.as_deref(),
                &interview,
            ),
            _ => status_email(
                &freelancer.email,
                &job.title,
                application.status,
                employer_name.as_deref(),
            ),
        };
        Ok(Some(message))
    }
}
