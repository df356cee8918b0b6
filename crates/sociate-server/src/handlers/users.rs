use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;

use sociate_shared::constants::SEARCH_LIMIT;
use sociate_store::{Database, StoreError, User, UserSync};

use crate::api::AppState;
use crate::auth::Caller;
use crate::dto::{PostDto, UserProfile, UserRow};
use crate::enrich;
use crate::error::ApiError;
use crate::extract::{non_empty, JsonBody, QueryParams};
use crate::response::short_lived;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    id: Option<String>,
    username: Option<String>,
    name: Option<String>,
    email: Option<String>,
    nickname: Option<String>,
    dob: Option<String>,
    address: Option<String>,
    bio: Option<String>,
    profile_picture: Option<String>,
}

impl SyncRequest {
    fn into_sync(self) -> Result<UserSync, ApiError> {
        let missing = || ApiError::validation("Missing required fields");
        Ok(UserSync {
            id: non_empty(self.id).ok_or_else(missing)?,
            username: non_empty(self.username).ok_or_else(missing)?,
            name: non_empty(self.name).ok_or_else(missing)?,
            email: non_empty(self.email).ok_or_else(missing)?,
            nickname: non_empty(self.nickname),
            dob: non_empty(self.dob),
            address: non_empty(self.address),
            bio: non_empty(self.bio),
            profile_picture: non_empty(self.profile_picture),
        })
    }
}

#[derive(Deserialize)]
pub struct SearchQuery {
    q: Option<String>,
}

/// `POST /api/users/sync`
pub async fn sync(
    State(state): State<AppState>,
    caller: Caller,
    JsonBody(req): JsonBody<SyncRequest>,
) -> Result<Json<UserRow>, ApiError> {
    let input = req.into_sync()?;
    caller.authorize(&input.id)?;

    let user = state.store.run(move |db| db.upsert_user(&input)).await?;
    Ok(Json(user.into()))
}

/// `GET /api/users/:id`
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let profile = state
        .store
        .run(move |db| {
            let user = db.get_user(&id)?;
            profile(db, user)
        })
        .await?;
    Ok(short_lived(profile))
}

/// `GET /api/users/by-username/:username`
pub async fn get_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Response, ApiError> {
    let profile = state
        .store
        .run(move |db| {
            let user = db.get_user_by_username(&username)?;
            profile(db, user)
        })
        .await?;
    Ok(short_lived(profile))
}

fn profile(db: &Database, user: User) -> Result<UserProfile, StoreError> {
    let counts = db.user_counts(&user.id)?;
    Ok(UserProfile::new(user, counts))
}

/// `GET /api/users/search?q=`
pub async fn search(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SearchQuery>,
) -> Result<Json<Vec<UserRow>>, ApiError> {
    let q = non_empty(query.q).ok_or_else(|| ApiError::validation("Query parameter required"))?;

    let users = state
        .store
        .run(move |db| db.search_users(&q, SEARCH_LIMIT))
        .await?;
    Ok(Json(users.into_iter().map(UserRow::from).collect()))
}

/// `GET /api/users/:id/followers`
pub async fn followers(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<UserRow>>, ApiError> {
    let users = state.store.run(move |db| db.list_followers(&id)).await?;
    Ok(Json(users.into_iter().map(UserRow::from).collect()))
}

/// `GET /api/users/:id/following`
pub async fn following(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<UserRow>>, ApiError> {
    let users = state.store.run(move |db| db.list_following(&id)).await?;
    Ok(Json(users.into_iter().map(UserRow::from).collect()))
}

/// `GET /api/users/:id/posts`
pub async fn posts(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<PostDto>>, ApiError> {
    let posts = state.store.run(move |db| db.posts_by_author(&id)).await?;
    Ok(Json(enrich::posts(&state.store, posts).await?))
}
