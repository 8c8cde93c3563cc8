pub mod applications;
pub mod docs;
pub mod files;
pub mod health;
pub mod jobs;
pub mod notifications;
pub mod profile;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::middleware::auth::require_auth;
use crate::AppState;

/// Largest request body accepted; a 10 MiB resume plus the form fields.
pub const MAX_BODY_BYTES: usize = 12 * 1024 * 1024;

/// Every route of the service with state applied. Cross-cutting layers
/// (tracing, CORS) are added by the binary.
pub fn api_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health::health))
        .route("/api-docs/openapi.json", get(docs::openapi_json))
        .route("/api/jobs", get(jobs::list_jobs))
        .route("/api/jobs/:id", get(jobs::get_job))
        .route("/api/talent", get(profile::browse_talent))
        .route("/files/resumes/*key", get(files::download_resume));

    let protected = Router::new()
        .route(
            "/api/employer/jobs",
            get(jobs::list_employer_jobs).post(jobs::create_job),
        )
        .route("/api/employer/jobs/:id/close", post(jobs::close_job))
        .route(
            "/api/employer/applications",
            get(applications::list_employer_applications),
        )
        .route("/api/jobs/:id/apply", post(applications::submit_application))
        .route("/api/me/applications", get(applications::list_my_applications))
        .route(
            "/api/applications/:id/status",
            put(applications::update_application_status),
        )
        .route("/api/applications/:id/resume", get(applications::resume_link))
        .route("/api/notifications", get(notifications::list_notifications))
        .route("/api/notifications/read-all", post(notifications::mark_all_read))
        .route("/api/notifications/stream", get(notifications::stream_notifications))
        .route("/api/notifications/:id/read", post(notifications::mark_read))
        .route(
            "/api/profile",
            get(profile::get_my_profile).put(profile::update_my_profile),
        )
        .route("/api/talent/:id/contact", post(profile::contact_freelancer))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    public
        .merge(protected)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
