use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;

use crate::api::AppState;
use crate::auth::Caller;
use crate::dto::{CommentDto, PostDto, SuccessResponse};
use crate::enrich;
use crate::error::ApiError;
use crate::extract::{media_kind, non_empty, JsonBody, QueryParams};
use crate::feed;
use crate::response::short_lived;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    author_id: Option<String>,
    caption: Option<String>,
    media_url: Option<String>,
    media_type: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedQuery {
    user_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest {
    user_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    author_id: Option<String>,
    content: Option<String>,
}

/// `POST /api/posts`
pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    JsonBody(req): JsonBody<CreatePostRequest>,
) -> Result<Json<PostDto>, ApiError> {
    let author_id =
        non_empty(req.author_id).ok_or_else(|| ApiError::validation("Author ID required"))?;
    let kind = media_kind(req.media_type)?;
    let caption = non_empty(req.caption);
    let media_url = non_empty(req.media_url);
    caller.authorize(&author_id)?;

    let (post, author) = state
        .store
        .run(move |db| {
            let post = db.create_post(&author_id, caption.as_deref(), media_url.as_deref(), kind)?;
            let author = db.get_user(&post.author_id)?;
            Ok((post, author))
        })
        .await?;

    Ok(Json(PostDto::new(post, Some(&author), Vec::new(), Vec::new())))
}

/// `GET /api/feed?userId=` (also served at `GET /api/posts`)
pub async fn get_feed(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<FeedQuery>,
) -> Result<Response, ApiError> {
    let posts = feed::load(&state.store, non_empty(query.user_id)).await?;
    let enriched = enrich::posts(&state.store, posts).await?;
    Ok(short_lived(enriched))
}

/// `POST /api/posts/:id/like`
pub async fn like(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    caller: Caller,
    JsonBody(req): JsonBody<LikeRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let user_id = non_empty(req.user_id).ok_or_else(|| ApiError::validation("User ID required"))?;
    caller.authorize(&user_id)?;

    state
        .store
        .run(move |db| db.like_post(&post_id, &user_id))
        .await?;
    Ok(Json(SuccessResponse::ok()))
}

/// `POST /api/posts/:id/unlike`
pub async fn unlike(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    caller: Caller,
    JsonBody(req): JsonBody<LikeRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let user_id = non_empty(req.user_id).ok_or_else(|| ApiError::validation("User ID required"))?;
    caller.authorize(&user_id)?;

    state
        .store
        .run(move |db| db.unlike_post(&post_id, &user_id))
        .await?;
    Ok(Json(SuccessResponse::ok()))
}

/// `GET /api/posts/:id/comments`
pub async fn comments(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Response, ApiError> {
    let comments = state
        .store
        .run(move |db| db.comments_for_post(&post_id))
        .await?;
    let enriched = enrich::comments(&state.store, comments).await?;
    Ok(short_lived(enriched))
}

/// `POST /api/posts/:id/comments`
pub async fn create_comment(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    caller: Caller,
    JsonBody(req): JsonBody<CreateCommentRequest>,
) -> Result<Json<CommentDto>, ApiError> {
    let (Some(author_id), Some(content)) = (non_empty(req.author_id), non_empty(req.content)) else {
        return Err(ApiError::validation("Author ID and content required"));
    };
    caller.authorize(&author_id)?;

    let (comment, author) = state
        .store
        .run(move |db| {
            let comment = db.create_comment(&post_id, &author_id, &content)?;
            let author = db.get_user(&author_id)?;
            Ok((comment, author))
        })
        .await?;

    Ok(Json(CommentDto::new(comment, Some(&author))))
}
