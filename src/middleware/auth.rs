use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::profile::UserRole;
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
    pub email: Option<String>,
}

/// Authenticated caller identity, resolved once per request from the bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: UserRole,
    pub email: Option<String>,
}

impl AuthContext {
    pub fn new(user_id: Uuid, role: UserRole, email: Option<String>) -> Self {
        Self { user_id, role, email }
    }

    pub fn require_role(&self, role: UserRole) -> Result<()> {
        if self.role == role {
            Ok(())
        } else {
            Err(Error::Forbidden(format!("Only {}s can do this", role.as_str())))
        }
    }

    fn from_claims(claims: &Claims) -> Result<Self> {
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| Error::Unauthorized("invalid_subject".into()))?;
        let role = claims
            .role
            .as_deref()
            .ok_or_else(|| Error::Unauthorized("missing_role".into()))?
            .parse::<UserRole>()
            .map_err(|_| Error::Unauthorized("invalid_role".into()))?;
        Ok(Self::new(user_id, role, claims.email.clone()))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| Error::Unauthorized("missing_authorization".into()))
    }
}

fn reject(code: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": code }))).into_response()
}

pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return reject("missing_authorization");
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return reject("bad_authorization");
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return reject("unsupported_scheme");
    };

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let claims = match decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => data.claims,
        Err(e) => {
            tracing::debug!(error = %e, "rejected bearer token");
            return reject("invalid_token");
        }
    };

    match AuthContext::from_claims(&claims) {
        Ok(ctx) => {
            tracing::Span::current().record("user_id", tracing::field::display(ctx.user_id));
            req.extensions_mut().insert(ctx);
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

/// Mints an HS256 token for the given identity. Token issuance belongs to the
/// identity provider; this exists for local tooling and tests.
pub fn issue_token(
    secret: &str,
    user_id: Uuid,
    role: UserRole,
    email: Option<&str>,
    ttl: chrono::Duration,
) -> Result<String> {
    let exp = (chrono::Utc::now() + ttl).timestamp().max(0) as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        exp,
        role: Some(role.as_str().to_string()),
        email: email.map(str::to_string),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("Failed to sign token: {}", e)))
}
