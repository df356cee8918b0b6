//! Body and query extractors whose rejections use the `{error}` envelope
//! instead of axum's plain-text defaults.

use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::http::StatusCode;
use serde::de::DeserializeOwned;

use sociate_shared::MediaKind;

use crate::error::ApiError;

/// JSON request body. The content type is not checked.
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, ApiError> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::PayloadTooLarge("Request body too large".into())
            } else {
                ApiError::validation(rejection.body_text())
            }
        })?;

        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|e| ApiError::validation(format!("Invalid JSON body: {e}")))
    }
}

/// Query string parameters.
pub struct QueryParams<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, ApiError> {
        let Query(params) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::validation(rejection.body_text()))?;
        Ok(QueryParams(params))
    }
}

/// Absent and empty strings are both "not given".
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Parse an optional `mediaType` field; only `image` and `video` are valid.
pub fn media_kind(value: Option<String>) -> Result<Option<MediaKind>, ApiError> {
    non_empty(value)
        .map(|raw| raw.parse::<MediaKind>())
        .transpose()
        .map_err(|e| ApiError::validation(e.to_string()))
}
