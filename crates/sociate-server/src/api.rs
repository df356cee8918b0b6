use std::any::Any;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::IdentityVerifier;
use crate::db::StoreHandle;
use crate::dto::HealthResponse;
use crate::error::ApiError;
use crate::handlers::{conversations, follows, notifications, posts, users};
use crate::middleware::{default_headers, preflight};

#[derive(Clone)]
pub struct AppState {
    pub store: StoreHandle,
    pub identity: IdentityVerifier,
}

pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/health", get(health_check))
        // Users
        .route("/api/users/sync", post(users::sync))
        .route("/api/users/search", get(users::search))
        .route("/api/users/by-username/:username", get(users::get_by_username))
        .route("/api/users/:id", get(users::get_by_id))
        .route("/api/users/:id/followers", get(users::followers))
        .route("/api/users/:id/following", get(users::following))
        .route("/api/users/:id/posts", get(users::posts))
        // Follow graph
        .route("/api/follow", post(follows::follow))
        .route("/api/unfollow", post(follows::unfollow))
        // Posts
        .route("/api/posts", get(posts::get_feed).post(posts::create))
        .route("/api/feed", get(posts::get_feed))
        .route("/api/posts/:id/like", post(posts::like))
        .route("/api/posts/:id/unlike", post(posts::unlike))
        .route(
            "/api/posts/:id/comments",
            get(posts::comments).post(posts::create_comment),
        )
        // Direct messages
        .route(
            "/api/conversations",
            get(conversations::list).post(conversations::create),
        )
        .route(
            "/api/conversations/:id/messages",
            get(conversations::messages).post(conversations::send),
        )
        // Notifications
        .route("/api/notifications", get(notifications::list))
        .route("/api/notifications/unread-count", get(notifications::unread_count))
        .route("/api/notifications/read-all", post(notifications::mark_all_read))
        .route("/api/notifications/:id/read", post(notifications::mark_read))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn(default_headers))
        .layer(cors)
        .layer(middleware::from_fn(preflight))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Not found".into())
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Internal server error".to_string()
    };
    ApiError::Internal(message).into_response()
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr, max_body_bytes: usize) -> anyhow::Result<()> {
    let app = build_router(state, max_body_bytes);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
