use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::profile::{normalize_skills, Profile, ProfileUpdate, UserRole};
use crate::utils::validation::validate_non_negative;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProfilePayload {
    #[validate(length(max = 200))]
    pub full_name: Option<String>,
    #[validate(length(max = 5000))]
    pub bio: Option<String>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
    #[validate(custom(function = "validate_non_negative"))]
    pub hourly_rate: Option<Decimal>,
    #[serde(default)]
    pub skills: Vec<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl From<UpdateProfilePayload> for ProfileUpdate {
    fn from(value: UpdateProfilePayload) -> Self {
        Self {
            full_name: non_blank(value.full_name),
            bio: non_blank(value.bio),
            location: non_blank(value.location),
            hourly_rate: value.hourly_rate,
            skills: normalize_skills(value.skills),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TalentQuery {
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ContactFreelancerPayload {
    #[validate(length(min = 1, max = 2000, message = "Message must be 1-2000 characters"))]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub role: UserRole,
    pub full_name: Option<String>,
    pub display_name: String,
    pub email: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub hourly_rate: Option<Decimal>,
    pub skills: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Profile> for ProfileResponse {
    fn from(value: Profile) -> Self {
        let display_name = value.display_name();
        Self {
            id: value.id,
            role: value.role,
            full_name: value.full_name,
            display_name,
            email: value.email,
            bio: value.bio,
            location: value.location,
            hourly_rate: value.hourly_rate,
            skills: value.skills,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Public card for the talent browser; omits the email address.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TalentResponse {
    pub id: Uuid,
    pub display_name: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub hourly_rate: Option<Decimal>,
    pub skills: Vec<String>,
}

impl From<Profile> for TalentResponse {
    fn from(value: Profile) -> Self {
        let display_name = value.display_name();
        Self {
            id: value.id,
            display_name,
            bio: value.bio,
            location: value.location,
            hourly_rate: value.hourly_rate,
            skills: value.skills,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContactResponse {
    pub sent: bool,
}
