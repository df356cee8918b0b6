use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use sociate_store::EdgeOutcome;

use crate::api::AppState;
use crate::auth::Caller;
use crate::dto::SuccessResponse;
use crate::error::ApiError;
use crate::extract::{non_empty, JsonBody};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest {
    follower_id: Option<String>,
    following_id: Option<String>,
}

/// `POST /api/follow`
pub async fn follow(
    State(state): State<AppState>,
    caller: Caller,
    JsonBody(req): JsonBody<FollowRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let (follower, following) = match (non_empty(req.follower_id), non_empty(req.following_id)) {
        (Some(a), Some(b)) if a != b => (a, b),
        _ => return Err(ApiError::validation("Invalid follow request")),
    };
    caller.authorize(&follower)?;

    let outcome = state
        .store
        .run(move |db| db.follow(&follower, &following))
        .await?;

    Ok(Json(match outcome {
        EdgeOutcome::Created => SuccessResponse::ok(),
        EdgeOutcome::AlreadyExisted => SuccessResponse::with_message("Already following"),
    }))
}

/// `POST /api/unfollow`
pub async fn unfollow(
    State(state): State<AppState>,
    caller: Caller,
    JsonBody(req): JsonBody<FollowRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let (Some(follower), Some(following)) = (non_empty(req.follower_id), non_empty(req.following_id))
    else {
        return Err(ApiError::validation("Invalid unfollow request"));
    };
    caller.authorize(&follower)?;

    let removed = state
        .store
        .run(move |db| db.unfollow(&follower, &following))
        .await?;
    if !removed {
        tracing::debug!("unfollow of a missing edge");
    }

    Ok(Json(SuccessResponse::ok()))
}
