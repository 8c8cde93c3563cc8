use tracing::info;
use uuid::Uuid;

use crate::database::DynStore;
use crate::dto::profile_dto::{ContactFreelancerPayload, UpdateProfilePayload};
use crate::error::{Error, Result};
use crate::middleware::auth::AuthContext;
use crate::models::profile::{NewProfile, Profile, UserRole};
use crate::services::email_service::{contact_email, DynEmailSender};

/// Loads the caller's profile, inserting an empty one on first sight.
pub(crate) async fn ensure_caller(store: &DynStore, ctx: &AuthContext) -> Result<Profile> {
    if let Some(profile) = store.get_profile(ctx.user_id).await? {
        return Ok(profile);
    }
    let profile = store
        .ensure_profile(NewProfile {
            id: ctx.user_id,
            role: ctx.role,
            email: ctx.email.clone().unwrap_or_default(),
        })
        .await?;
    info!(user_id = %ctx.user_id, role = ctx.role.as_str(), "created profile on first access");
    Ok(profile)
}

#[derive(Clone)]
pub struct ProfileService {
    store: DynStore,
    email: DynEmailSender,
}

impl ProfileService {
    pub fn new(store: DynStore, email: DynEmailSender) -> Self {
        Self { store, email }
    }

    pub async fn get_my_profile(&self, ctx: &AuthContext) -> Result<Profile> {
        ensure_caller(&self.store, ctx).await
    }

    pub async fn update_my_profile(&self, ctx: &AuthContext, payload: UpdateProfilePayload) -> Result<Profile> {
        ensure_caller(&self.store, ctx).await?;
        self.store.update_profile(ctx.user_id, payload.into()).await
    }

    pub async fn browse_talent(&self, search: Option<&str>) -> Result<Vec<Profile>> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        self.store.list_freelancers(search).await
    }

    /// Emails a freelancer on behalf of the caller. Delivery failure is the
    /// caller's error here, unlike the review workflow.
    pub async fn contact_freelancer(
        &self,
        ctx: &AuthContext,
        freelancer_id: Uuid,
        payload: ContactFreelancerPayload,
    ) -> Result<()> {
        if payload.message.trim().is_empty() {
            return Err(Error::BadRequest("Message is required".into()));
        }
        let freelancer = self
            .store
            .get_profile(freelancer_id)
            .await?
            .filter(|p| p.role == UserRole::Freelancer)
            .ok_or_else(|| Error::NotFound("Freelancer not found".into()))?;
        if freelancer.email.is_empty() {
            return Err(Error::BadRequest("Freelancer has no contact email".into()));
        }

        let sender = ensure_caller(&self.store, ctx).await?;
        let sender_email = ctx.email.clone().unwrap_or_else(|| sender.email.clone());
        if sender_email.is_empty() {
            return Err(Error::BadRequest("Your profile has no email address".into()));
        }

        let message = contact_email(
            &freelancer.email,
            &sender.display_name(),
            &sender_email,
            &payload.message,
        );
        self.email.send(&message).await.map_err(|e| match e {
            Error::Email(_) => e,
            other => Error::Email(other.to_string()),
        })?;

        info!(from = %ctx.user_id, to = %freelancer_id, "contact email sent");
        Ok(())
    }
}
