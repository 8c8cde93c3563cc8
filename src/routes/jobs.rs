use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::job_dto::{
        CreateJobPayload, EmployerJobResponse, JobListQuery, JobListResponse, JobResponse,
    },
    error::Result,
    middleware::auth::AuthContext,
    services::job_service::JobList,
    AppState,
};

impl From<JobList> for JobListResponse {
    fn from(value: JobList) -> Self {
        Self {
            items: value.items.into_iter().map(JobResponse::from).collect(),
            total: value.total,
            page: value.page,
            per_page: value.per_page,
            total_pages: value.total_pages,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/jobs",
    params(
        ("page" = Option<i64>, Query, description = "Page number, starting at 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page (1-100)"),
        ("search" = Option<String>, Query, description = "Matches title, description or skills"),
        ("job_type" = Option<String>, Query, description = "Exact job type"),
        ("experience_level" = Option<String>, Query, description = "Exact experience level"),
        ("budget_min" = Option<String>, Query, description = "Minimum of the job's lower budget"),
        ("budget_max" = Option<String>, Query, description = "Maximum of the job's upper budget")
    ),
    responses(
        (status = 200, description = "Open jobs", body = JobListResponse)
    )
)]
#[axum::debug_handler]
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobListQuery>,
) -> Result<impl IntoResponse> {
    let result = state.job_service.list_open_jobs(query).await?;
    Ok(Json(JobListResponse::from(result)))
}

#[utoipa::path(
    get,
    path = "/api/jobs/{id}",
    params(("id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job found", body = JobResponse),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let job = state.job_service.get_job(id).await?;
    Ok(Json(JobResponse::from(job)))
}

#[utoipa::path(
    post,
    path = "/api/employer/jobs",
    request_body = CreateJobPayload,
    responses(
        (status = 201, description = "Job posted", body = JobResponse),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Caller is not an employer")
    )
)]
#[axum::debug_handler]
pub async fn create_job(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(payload): Json<CreateJobPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let job = state.job_service.create_job(&ctx, payload).await?;
    Ok((StatusCode::CREATED, Json(JobResponse::from(job))))
}

#[utoipa::path(
    get,
    path = "/api/employer/jobs",
    responses(
        (status = 200, description = "The employer's jobs with application counts", body = [EmployerJobResponse])
    )
)]
#[axum::debug_handler]
pub async fn list_employer_jobs(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> Result<impl IntoResponse> {
    let jobs = state.job_service.list_employer_jobs(&ctx).await?;
    let body: Vec<EmployerJobResponse> = jobs
        .into_iter()
        .map(|(job, counts)| EmployerJobResponse {
            job: job.into(),
            applications: counts.into(),
        })
        .collect();
    Ok(Json(body))
}

#[utoipa::path(
    post,
    path = "/api/employer/jobs/{id}/close",
    params(("id" = Uuid, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job closed", body = JobResponse),
        (status = 403, description = "Not the job owner"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn close_job(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let job = state.job_service.close_job(&ctx, id).await?;
    Ok(Json(JobResponse::from(job)))
}
