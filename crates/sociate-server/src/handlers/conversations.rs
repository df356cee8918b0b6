use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use sociate_shared::constants::{DEFAULT_MESSAGE_LIMIT, MAX_MESSAGE_LIMIT};
use sociate_shared::{time, CanonicalPair};

use crate::api::AppState;
use crate::auth::Caller;
use crate::dto::{ConversationDto, ConversationRow, MessageDto};
use crate::enrich;
use crate::error::ApiError;
use crate::extract::{media_kind, non_empty, JsonBody, QueryParams};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversationRequest {
    user_a_id: Option<String>,
    user_b_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    user_id: Option<String>,
}

#[derive(Deserialize)]
pub struct MessagesQuery {
    limit: Option<String>,
    before: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    sender_id: Option<String>,
    content: Option<String>,
    media_url: Option<String>,
    media_type: Option<String>,
}

/// `POST /api/conversations`
pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    JsonBody(req): JsonBody<CreateConversationRequest>,
) -> Result<Json<ConversationRow>, ApiError> {
    let invalid = || ApiError::validation("Invalid conversation request");
    let a = non_empty(req.user_a_id).ok_or_else(invalid)?;
    let b = non_empty(req.user_b_id).ok_or_else(invalid)?;
    let pair = CanonicalPair::new(&a, &b).map_err(|_| invalid())?;
    caller.authorize_any(&[pair.first(), pair.second()])?;

    let (conversation, _created) = state
        .store
        .run(move |db| db.get_or_create_conversation(&pair))
        .await?;
    Ok(Json(conversation.into()))
}

/// `GET /api/conversations?userId=`
pub async fn list(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListQuery>,
) -> Result<Json<Vec<ConversationDto>>, ApiError> {
    let user_id = non_empty(query.user_id).ok_or_else(|| ApiError::validation("User ID required"))?;

    let viewer = user_id.clone();
    let conversations = state
        .store
        .run(move |db| db.conversations_for_user(&viewer))
        .await?;
    Ok(Json(
        enrich::conversations(&state.store, &user_id, conversations).await?,
    ))
}

/// `GET /api/conversations/:id/messages?limit=&before=`
pub async fn messages(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    QueryParams(query): QueryParams<MessagesQuery>,
) -> Result<Json<Vec<MessageDto>>, ApiError> {
    let limit = page_limit(non_empty(query.limit))?;
    let before = non_empty(query.before)
        .map(|raw| time::parse_cursor(&raw))
        .transpose()
        .map_err(|e| ApiError::validation(e.to_string()))?;

    let messages = state
        .store
        .run(move |db| db.messages_page(&conversation_id, limit, before))
        .await?;
    Ok(Json(enrich::messages(&state.store, messages).await?))
}

/// `POST /api/conversations/:id/messages`
pub async fn send(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    caller: Caller,
    JsonBody(req): JsonBody<SendMessageRequest>,
) -> Result<Json<MessageDto>, ApiError> {
    let sender_id = non_empty(req.sender_id);
    let content = non_empty(req.content);
    let media_url = non_empty(req.media_url);
    let sender_id = match sender_id {
        Some(id) if content.is_some() || media_url.is_some() => id,
        _ => return Err(ApiError::validation("Sender ID and content or media required")),
    };
    let kind = media_kind(req.media_type)?;
    caller.authorize(&sender_id)?;

    let (message, sender) = state
        .store
        .run(move |db| {
            let message = db.create_message(
                &conversation_id,
                &sender_id,
                content.as_deref(),
                media_url.as_deref(),
                kind,
            )?;
            let sender = db.get_user(&sender_id)?;
            Ok((message, sender))
        })
        .await?;

    Ok(Json(MessageDto::new(message, Some(&sender))))
}

/// Default when absent, clamped to [`MAX_MESSAGE_LIMIT`].
fn page_limit(raw: Option<String>) -> Result<u32, ApiError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_MESSAGE_LIMIT);
    };
    match raw.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n.min(MAX_MESSAGE_LIMIT)),
        _ => Err(ApiError::validation("limit must be a positive integer")),
    }
}
