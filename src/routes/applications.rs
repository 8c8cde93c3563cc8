use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    dto::application_dto::{
        ApplicationResponse, EmployerApplicationResponse, EmployerApplicationsQuery,
        MyApplicationResponse, ResumeLinkResponse, ResumeUpload, ReviewOutcomeResponse,
        SubmitApplicationPayload, UpdateApplicationStatusPayload,
    },
    error::{Error, Result},
    middleware::auth::AuthContext,
    models::application::ApplicationFilter,
    services::review_service::ReviewOutcome,
    AppState,
};

impl From<ReviewOutcome> for ReviewOutcomeResponse {
    fn from(value: ReviewOutcome) -> Self {
        Self {
            application: value.application.into(),
            job_status: value.job_status,
            notification_id: value.notification_id,
            email_sent: value.email_sent,
        }
    }
}

/// Reads the application form: text fields plus an optional `resume` file.
async fn read_application_form(
    mut multipart: Multipart,
) -> Result<(SubmitApplicationPayload, Option<ResumeUpload>)> {
    let mut form = SubmitApplicationPayload::default();
    let mut resume = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!("Failed to read multipart field: {}", e);
        Error::BadRequest(e.to_string())
    })? {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "name" => form.name = field.text().await?,
            "email" => form.email = field.text().await?,
            "phone" => form.phone = field.text().await?,
            "cover_letter" => form.cover_letter = field.text().await?,
            "proposed_rate" => {
                let raw = field.text().await?;
                let raw = raw.trim();
                if !raw.is_empty() {
                    let rate = raw
                        .parse::<Decimal>()
                        .map_err(|_| Error::BadRequest("Proposed rate must be a number".into()))?;
                    form.proposed_rate = Some(rate);
                }
            }
            "resume" => {
                let filename = field.file_name().unwrap_or("resume.bin").to_string();
                let data = field.bytes().await.map_err(|e| {
                    tracing::warn!("Failed to read resume bytes: {}", e);
                    Error::BadRequest("Failed to read file upload".into())
                })?;
                if !data.is_empty() {
                    resume = Some(ResumeUpload { filename, data });
                }
            }
            _ => {}
        }
    }

    Ok((form, resume))
}

#[utoipa::path(
    post,
    path = "/api/jobs/{id}/apply",
    params(("id" = Uuid, Path, description = "Job ID")),
    request_body(
        content = SubmitApplicationPayload,
        content_type = "multipart/form-data",
        description = "Form fields plus an optional `resume` file (pdf, doc, docx, txt, rtf; max 10MB)"
    ),
    responses(
        (status = 201, description = "Application submitted", body = ApplicationResponse),
        (status = 400, description = "Invalid form, resume, or job not open"),
        (status = 409, description = "Already applied")
    )
)]
#[axum::debug_handler]
pub async fn submit_application(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(job_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let (form, resume) = read_application_form(multipart).await?;
    let application = state
        .application_service
        .submit_application(&ctx, job_id, form, resume)
        .await?;
    Ok((StatusCode::CREATED, Json(ApplicationResponse::from(application))))
}

#[utoipa::path(
    get,
    path = "/api/me/applications",
    responses(
        (status = 200, description = "The freelancer's applications", body = [MyApplicationResponse])
    )
)]
#[axum::debug_handler]
pub async fn list_my_applications(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> Result<impl IntoResponse> {
    let rows = state.application_service.list_my_applications(&ctx).await?;
    let body: Vec<MyApplicationResponse> = rows.into_iter().map(Into::into).collect();
    Ok(Json(body))
}

#[utoipa::path(
    get,
    path = "/api/employer/applications",
    params(
        ("job_id" = Option<Uuid>, Query, description = "Only applications to this job"),
        ("status" = Option<String>, Query, description = "pending, shortlisted, accepted or rejected")
    ),
    responses(
        (status = 200, description = "Applications to the employer's jobs", body = [EmployerApplicationResponse])
    )
)]
#[axum::debug_handler]
pub async fn list_employer_applications(
    State(state): State<AppState>,
    ctx: AuthContext,
    Query(query): Query<EmployerApplicationsQuery>,
) -> Result<impl IntoResponse> {
    let filter = ApplicationFilter {
        job_id: query.job_id,
        status: query.status,
    };
    let rows = state
        .application_service
        .list_employer_applications(&ctx, filter)
        .await?;
    let body: Vec<EmployerApplicationResponse> = rows.into_iter().map(Into::into).collect();
    Ok(Json(body))
}

#[utoipa::path(
    put,
    path = "/api/applications/{id}/status",
    params(("id" = Uuid, Path, description = "Application ID")),
    request_body = UpdateApplicationStatusPayload,
    responses(
        (status = 200, description = "Status updated", body = ReviewOutcomeResponse),
        (status = 400, description = "Invalid target or interview data"),
        (status = 403, description = "Not the job owner"),
        (status = 404, description = "Application not found"),
        (status = 409, description = "Application already decided")
    )
)]
#[axum::debug_handler]
pub async fn update_application_status(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateApplicationStatusPayload>,
) -> Result<impl IntoResponse> {
    let outcome = state
        .review_service
        .update_application_status(&ctx, id, payload.status, payload.interview)
        .await?;
    Ok(Json(ReviewOutcomeResponse::from(outcome)))
}

#[utoipa::path(
    get,
    path = "/api/applications/{id}/resume",
    params(("id" = Uuid, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Signed link valid for 60 seconds", body = ResumeLinkResponse),
        (status = 403, description = "Neither the applicant nor the job owner"),
        (status = 404, description = "No resume attached")
    )
)]
#[axum::debug_handler]
pub async fn resume_link(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let signed = state.application_service.resume_link(&ctx, id).await?;
    Ok(Json(ResumeLinkResponse {
        url: signed.url,
        expires_at: signed.expires_at,
    }))
}
