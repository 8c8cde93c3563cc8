use axum::{
    extract::{Path, State},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json,
    },
};
use futures::{Stream, StreamExt};
use uuid::Uuid;

use crate::{
    dto::notification_dto::{
        MarkAllReadResponse, NotificationListResponse, NotificationResponse, UnreadCountResponse,
    },
    error::Result,
    middleware::auth::AuthContext,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/notifications",
    responses(
        (status = 200, description = "20 most recent notifications, newest first", body = NotificationListResponse)
    )
)]
#[axum::debug_handler]
pub async fn list_notifications(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> Result<impl IntoResponse> {
    let (rows, unread_count) = state.notification_service.list_recent(&ctx).await?;
    Ok(Json(NotificationListResponse {
        items: rows.into_iter().map(NotificationResponse::from).collect(),
        unread_count,
    }))
}

#[utoipa::path(
    post,
    path = "/api/notifications/{id}/read",
    params(("id" = Uuid, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Marked read", body = UnreadCountResponse),
        (status = 404, description = "Notification not found")
    )
)]
#[axum::debug_handler]
pub async fn mark_read(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let unread_count = state.notification_service.mark_read(&ctx, id).await?;
    Ok(Json(UnreadCountResponse { unread_count }))
}

#[utoipa::path(
    post,
    path = "/api/notifications/read-all",
    responses(
        (status = 200, description = "All unread notifications marked read", body = MarkAllReadResponse)
    )
)]
#[axum::debug_handler]
pub async fn mark_all_read(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> Result<impl IntoResponse> {
    let updated = state.notification_service.mark_all_read(&ctx).await?;
    Ok(Json(MarkAllReadResponse { updated }))
}

/// Server-sent events carrying the caller's newly created notifications.
pub async fn stream_notifications(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> Sse<impl Stream<Item = std::result::Result<Event, axum::Error>>> {
    tracing::debug!(user_id = %ctx.user_id, "notification stream opened");
    let events = state.notification_service.subscribe(&ctx).map(|notification| {
        Event::default()
            .event("notification")
            .json_data(NotificationResponse::from(notification))
    });
    Sse::new(events).keep_alive(KeepAlive::default())
}
