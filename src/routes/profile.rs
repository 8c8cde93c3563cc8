use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::profile_dto::{
        ContactFreelancerPayload, ContactResponse, ProfileResponse, TalentQuery, TalentResponse,
        UpdateProfilePayload,
    },
    error::Result,
    middleware::auth::AuthContext,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/profile",
    responses((status = 200, description = "The caller's profile", body = ProfileResponse))
)]
#[axum::debug_handler]
pub async fn get_my_profile(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> Result<impl IntoResponse> {
    let profile = state.profile_service.get_my_profile(&ctx).await?;
    Ok(Json(ProfileResponse::from(profile)))
}

#[utoipa::path(
    put,
    path = "/api/profile",
    request_body = UpdateProfilePayload,
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn update_my_profile(
    State(state): State<AppState>,
    ctx: AuthContext,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let profile = state.profile_service.update_my_profile(&ctx, payload).await?;
    Ok(Json(ProfileResponse::from(profile)))
}

#[utoipa::path(
    get,
    path = "/api/talent",
    params(("search" = Option<String>, Query, description = "Matches name, location, bio or skills")),
    responses((status = 200, description = "Freelancer profiles", body = [TalentResponse]))
)]
#[axum::debug_handler]
pub async fn browse_talent(
    State(state): State<AppState>,
    Query(query): Query<TalentQuery>,
) -> Result<impl IntoResponse> {
    let profiles = state
        .profile_service
        .browse_talent(query.search.as_deref())
        .await?;
    let body: Vec<TalentResponse> = profiles.into_iter().map(Into::into).collect();
    Ok(Json(body))
}

#[utoipa::path(
    post,
    path = "/api/talent/{id}/contact",
    params(("id" = Uuid, Path, description = "Freelancer ID")),
    request_body = ContactFreelancerPayload,
    responses(
        (status = 200, description = "Message sent", body = ContactResponse),
        (status = 400, description = "Invalid message"),
        (status = 404, description = "Freelancer not found"),
        (status = 502, description = "Email delivery failed")
    )
)]
#[axum::debug_handler]
pub async fn contact_freelancer(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<ContactFreelancerPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    state
        .profile_service
        .contact_freelancer(&ctx, id, payload)
        .await?;
    Ok(Json(ContactResponse { sent: true }))
}
