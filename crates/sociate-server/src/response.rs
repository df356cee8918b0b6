use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use sociate_shared::constants::SHORT_CACHE_MAX_AGE_SECS;

/// JSON body that edge caches may keep for a few seconds.
pub fn short_lived<T: Serialize>(body: T) -> Response {
    (
        [(
            header::CACHE_CONTROL,
            format!("max-age={SHORT_CACHE_MAX_AGE_SECS}"),
        )],
        Json(body),
    )
        .into_response()
}
