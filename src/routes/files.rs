use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;

use crate::{
    error::{Error, Result},
    storage::content_type_for,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct SignedQuery {
    pub expires: Option<i64>,
    pub signature: Option<String>,
}

/// Serves a stored resume when the link's signature and expiry check out.
#[axum::debug_handler]
pub async fn download_resume(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<SignedQuery>,
) -> Result<Response> {
    let (Some(expires), Some(signature)) = (query.expires, query.signature.as_deref()) else {
        return Err(Error::Forbidden("Missing signature".into()));
    };
    state.signer.verify(&key, expires, signature, Utc::now())?;

    let body = state.storage.open(&key).await?;
    tracing::debug!(key = %key, "serving resume");
    Ok((
        [
            (header::CONTENT_TYPE, content_type_for(&key)),
            (header::CACHE_CONTROL, "private, no-store"),
        ],
        Body::from_stream(body),
    )
        .into_response())
}
