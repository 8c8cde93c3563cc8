use axum::response::{IntoResponse, Json};
use utoipa::OpenApi;

use crate::dto::{
    application_dto::{
        ApplicationResponse, EmployerApplicationResponse, InterviewPayload, InterviewResponse,
        MyApplicationResponse, ResumeLinkResponse, ReviewOutcomeResponse, SubmitApplicationPayload,
        UpdateApplicationStatusPayload,
    },
    job_dto::{
        ApplicationCountsResponse, CreateJobPayload, EmployerJobResponse, JobListResponse,
        JobResponse,
    },
    notification_dto::{
        MarkAllReadResponse, NotificationListResponse, NotificationResponse, UnreadCountResponse,
    },
    profile_dto::{
        ContactFreelancerPayload, ContactResponse, ProfileResponse, TalentResponse,
        UpdateProfilePayload,
    },
};
use crate::models::{
    application::ApplicationStatus, job::JobStatus, notification::NotificationType,
    profile::UserRole,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::jobs::list_jobs,
        crate::routes::jobs::get_job,
        crate::routes::jobs::create_job,
        crate::routes::jobs::list_employer_jobs,
        crate::routes::jobs::close_job,
        crate::routes::applications::submit_application,
        crate::routes::applications::list_my_applications,
        crate::routes::applications::list_employer_applications,
        crate::routes::applications::update_application_status,
        crate::routes::applications::resume_link,
        crate::routes::notifications::list_notifications,
        crate::routes::notifications::mark_read,
        crate::routes::notifications::mark_all_read,
        crate::routes::profile::get_my_profile,
        crate::routes::profile::update_my_profile,
        crate::routes::profile::browse_talent,
        crate::routes::profile::contact_freelancer,
    ),
    components(schemas(
        ApplicationStatus,
        JobStatus,
        NotificationType,
        UserRole,
        CreateJobPayload,
        JobResponse,
        JobListResponse,
        ApplicationCountsResponse,
        EmployerJobResponse,
        InterviewPayload,
        InterviewResponse,
        SubmitApplicationPayload,
        UpdateApplicationStatusPayload,
        ApplicationResponse,
        EmployerApplicationResponse,
        MyApplicationResponse,
        ReviewOutcomeResponse,
        ResumeLinkResponse,
        NotificationResponse,
        NotificationListResponse,
        UnreadCountResponse,
        MarkAllReadResponse,
        UpdateProfilePayload,
        ContactFreelancerPayload,
        ContactResponse,
        ProfileResponse,
        TalentResponse,
    )),
    tags((name = "marketplace", description = "Jobs, applications, reviews and notifications"))
)]
pub struct ApiDoc;

pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
