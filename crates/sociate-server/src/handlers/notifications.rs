use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use sociate_shared::constants::NOTIFICATION_LIMIT;

use crate::api::AppState;
use crate::auth::Caller;
use crate::dto::{CountResponse, NotificationDto, ReadAllResponse, SuccessResponse};
use crate::error::ApiError;
use crate::extract::{non_empty, JsonBody, QueryParams};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiverQuery {
    user_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadAllRequest {
    user_id: Option<String>,
}

fn receiver(user_id: Option<String>) -> Result<String, ApiError> {
    non_empty(user_id).ok_or_else(|| ApiError::validation("User ID required"))
}

/// `GET /api/notifications?userId=`
pub async fn list(
    State(state): State<AppState>,
    caller: Caller,
    QueryParams(query): QueryParams<ReceiverQuery>,
) -> Result<Json<Vec<NotificationDto>>, ApiError> {
    let user_id = receiver(query.user_id)?;
    caller.authorize(&user_id)?;

    let notifications = state
        .store
        .run(move |db| db.notifications_for_user(&user_id, NOTIFICATION_LIMIT))
        .await?;
    Ok(Json(
        notifications.into_iter().map(NotificationDto::from).collect(),
    ))
}

/// `GET /api/notifications/unread-count?userId=`
pub async fn unread_count(
    State(state): State<AppState>,
    caller: Caller,
    QueryParams(query): QueryParams<ReceiverQuery>,
) -> Result<Json<CountResponse>, ApiError> {
    let user_id = receiver(query.user_id)?;
    caller.authorize(&user_id)?;

    let count = state
        .store
        .run(move |db| db.unread_notification_count(&user_id))
        .await?;
    Ok(Json(CountResponse { count }))
}

/// `POST /api/notifications/:id/read`
pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
    caller: Caller,
) -> Result<Json<SuccessResponse>, ApiError> {
    let lookup = id.clone();
    let notification = state
        .store
        .run(move |db| db.get_notification(&lookup))
        .await?;
    caller.authorize(&notification.receiver_id)?;

    let updated = state
        .store
        .run(move |db| db.mark_notification_read(&id))
        .await?;
    if !updated {
        return Err(ApiError::NotFound("Notification not found".into()));
    }
    Ok(Json(SuccessResponse::ok()))
}

/// `POST /api/notifications/read-all`
pub async fn mark_all_read(
    State(state): State<AppState>,
    caller: Caller,
    JsonBody(req): JsonBody<ReadAllRequest>,
) -> Result<Json<ReadAllResponse>, ApiError> {
    let user_id = receiver(req.user_id)?;
    caller.authorize(&user_id)?;

    let updated = state
        .store
        .run(move |db| db.mark_all_notifications_read(&user_id))
        .await?;
    tracing::debug!(updated, "notifications marked read");
    Ok(Json(ReadAllResponse {
        success: true,
        updated,
    }))
}
