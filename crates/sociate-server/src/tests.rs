//! End-to-end tests that drive the full router (middleware included)
//! against a throwaway database.

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use sociate_store::Database;

use crate::api::{build_router, AppState};
use crate::auth::IdentityVerifier;
use crate::db::StoreHandle;

struct TestApp {
    router: Router,
    _dir: TempDir,
}

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

impl TestApp {
    fn new() -> Self {
        Self::with_identity(IdentityVerifier::new(None, false))
    }

    fn with_identity(identity: IdentityVerifier) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api.db");
        Database::init(&path).unwrap();
        let state = AppState {
            store: StoreHandle::new(path),
            identity,
        };
        Self {
            router: build_router(state, 64 * 1024),
            _dir: dir,
        }
    }

    async fn send(&self, method: Method, uri: &str, bearer: Option<&str>, body: Option<Value>) -> Reply {
        let mut req = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::ORIGIN, "http://localhost:5173");
        if let Some(token) = bearer {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(json) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };

        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        Reply {
            status,
            headers,
            body,
        }
    }

    async fn get(&self, uri: &str) -> Reply {
        self.send(Method::GET, uri, None, None).await
    }

    async fn post(&self, uri: &str, body: Value) -> Reply {
        self.send(Method::POST, uri, None, Some(body)).await
    }

    async fn sync(&self, id: &str, username: &str) -> Value {
        let reply = self
            .post(
                "/api/users/sync",
                json!({
                    "id": id,
                    "username": username,
                    "name": username.to_uppercase(),
                    "email": format!("{username}@example.com"),
                }),
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
        reply.body
    }

    async fn create_post(&self, author: &str, caption: &str) -> String {
        let reply = self
            .post("/api/posts", json!({ "authorId": author, "caption": caption }))
            .await;
        assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
        reply.body["id"].as_str().unwrap().to_string()
    }

    async fn follow(&self, follower: &str, following: &str) -> Reply {
        self.post(
            "/api/follow",
            json!({ "followerId": follower, "followingId": following }),
        )
        .await
    }
}

fn cache_control(reply: &Reply) -> &str {
    reply
        .headers
        .get(header::CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn ids(list: &Value, key: &str) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|v| v[key].as_str().unwrap().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Users and the follow graph
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sync_returns_snake_case_row() {
    let app = TestApp::new();
    let row = app.sync("u1", "ann").await;
    assert_eq!(row["id"], "u1");
    assert_eq!(row["username"], "ann");
    assert!(row["created_at"].as_str().unwrap().ends_with('Z'));
    assert!(row.get("profile_picture").is_some());
}

#[tokio::test]
async fn sync_rejects_missing_fields_and_taken_usernames() {
    let app = TestApp::new();
    let reply = app.post("/api/users/sync", json!({ "id": "u1", "username": "ann" })).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["error"], "Missing required fields");

    app.sync("u1", "ann").await;
    let reply = app
        .post(
            "/api/users/sync",
            json!({ "id": "u2", "username": "ann", "name": "Other", "email": "o@example.com" }),
        )
        .await;
    assert_eq!(reply.status, StatusCode::CONFLICT);
    assert_eq!(reply.body["error"], "Username already taken");
}

#[tokio::test]
async fn following_twice_keeps_one_edge() {
    let app = TestApp::new();
    app.sync("u1", "ann").await;
    app.sync("u2", "bob").await;

    let first = app.follow("u2", "u1").await;
    assert_eq!(first.body, json!({ "success": true }));
    let second = app.follow("u2", "u1").await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.body["message"], "Already following");

    let profile = app.get("/api/users/u1").await;
    assert_eq!(profile.body["followersCount"], 1);
    assert_eq!(profile.body["followingCount"], 0);
    assert_eq!(cache_control(&profile), "max-age=5");

    let followers = app.get("/api/users/u1/followers").await;
    assert_eq!(ids(&followers.body, "id"), vec!["u2"]);
    let following = app.get("/api/users/u2/following").await;
    assert_eq!(ids(&following.body, "id"), vec!["u1"]);

    // Only one follow notification despite two requests.
    let notes = app.get("/api/notifications?userId=u1").await;
    assert_eq!(notes.body.as_array().unwrap().len(), 1);
    assert_eq!(notes.body[0]["type"], "follow");

    let unfollow = app
        .post("/api/unfollow", json!({ "followerId": "u2", "followingId": "u1" }))
        .await;
    assert_eq!(unfollow.body["success"], true);
    // Removing an absent edge still succeeds.
    let again = app
        .post("/api/unfollow", json!({ "followerId": "u2", "followingId": "u1" }))
        .await;
    assert_eq!(again.status, StatusCode::OK);
    assert_eq!(app.get("/api/users/u1").await.body["followersCount"], 0);
}

#[tokio::test]
async fn follow_validation() {
    let app = TestApp::new();
    app.sync("u1", "ann").await;

    let self_follow = app.follow("u1", "u1").await;
    assert_eq!(self_follow.status, StatusCode::BAD_REQUEST);
    assert_eq!(self_follow.body["error"], "Invalid follow request");

    let missing = app.post("/api/follow", json!({ "followerId": "u1" })).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);

    let unknown = app.follow("u1", "ghost").await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn profile_lookup_by_username_and_missing_user() {
    let app = TestApp::new();
    app.sync("u1", "ann").await;
    app.create_post("u1", "one").await;

    let profile = app.get("/api/users/by-username/ann").await;
    assert_eq!(profile.status, StatusCode::OK);
    assert_eq!(profile.body["id"], "u1");
    assert_eq!(profile.body["postsCount"], 1);

    let missing = app.get("/api/users/nobody").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["error"], "User not found");
}

#[tokio::test]
async fn search_matches_username_or_name_substrings() {
    let app = TestApp::new();
    app.sync("u1", "annika").await;
    app.sync("u2", "joanne").await;
    app.sync("u3", "bob").await;

    let reply = app.get("/api/users/search?q=ann").await;
    let mut found = ids(&reply.body, "id");
    found.sort();
    assert_eq!(found, vec!["u1", "u2"]);

    let empty = app.get("/api/users/search?q=").await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
    assert_eq!(empty.body["error"], "Query parameter required");
}

// ---------------------------------------------------------------------------
// Posts, likes, comments and the feed
// ---------------------------------------------------------------------------

#[tokio::test]
async fn like_unlike_like_leaves_single_like() {
    let app = TestApp::new();
    app.sync("u1", "ann").await;
    app.sync("u2", "bob").await;
    let post = app.create_post("u1", "hello").await;
    let like_uri = format!("/api/posts/{post}/like");

    app.post(&like_uri, json!({ "userId": "u2" })).await;
    app.post(&like_uri, json!({ "userId": "u2" })).await;
    let unlike = app
        .post(&format!("/api/posts/{post}/unlike"), json!({ "userId": "u2" }))
        .await;
    assert_eq!(unlike.body["success"], true);
    let like = app.post(&like_uri, json!({ "userId": "u2" })).await;
    assert_eq!(like.body["success"], true);

    let posts = app.get("/api/users/u1/posts").await;
    assert_eq!(posts.body[0]["likes"], json!(["u2"]));
}

#[tokio::test]
async fn liking_missing_post_is_not_found() {
    let app = TestApp::new();
    app.sync("u1", "ann").await;
    let reply = app.post("/api/posts/nope/like", json!({ "userId": "u1" })).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body["error"], "Post not found");
}

#[tokio::test]
async fn create_post_validates_media_type() {
    let app = TestApp::new();
    app.sync("u1", "ann").await;

    let reply = app
        .post(
            "/api/posts",
            json!({ "authorId": "u1", "mediaUrl": "https://cdn/x.gif", "mediaType": "gif" }),
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let ok = app
        .post(
            "/api/posts",
            json!({ "authorId": "u1", "mediaUrl": "https://cdn/x.mp4", "mediaType": "video" }),
        )
        .await;
    assert_eq!(ok.status, StatusCode::OK);
    assert_eq!(ok.body["mediaType"], "video");
    assert_eq!(ok.body["caption"], "");
    assert_eq!(ok.body["visibility"], "public");
    assert_eq!(ok.body["savedBy"], json!([]));

    let missing_author = app.post("/api/posts", json!({ "caption": "x" })).await;
    assert_eq!(missing_author.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing_author.body["error"], "Author ID required");
}

#[tokio::test]
async fn feed_only_contains_viewer_and_followed_authors() {
    let app = TestApp::new();
    for (id, name) in [("u1", "ann"), ("u2", "bob"), ("u3", "cat"), ("u4", "dan")] {
        app.sync(id, name).await;
    }
    app.follow("u1", "u2").await;
    app.follow("u1", "u3").await;

    app.create_post("u1", "mine").await;
    app.create_post("u2", "bob's").await;
    app.create_post("u3", "cat's").await;
    app.create_post("u4", "stranger").await;

    let feed = app.get("/api/feed?userId=u1").await;
    assert_eq!(cache_control(&feed), "max-age=5");
    let mut authors = ids(&feed.body, "userId");
    authors.sort();
    assert_eq!(authors, vec!["u1", "u2", "u3"]);

    let created = ids(&feed.body, "createdAt");
    assert!(created.windows(2).all(|w| w[0] >= w[1]));

    // Without a viewer the feed is the global recent list.
    let global = app.get("/api/posts").await;
    assert_eq!(global.body.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn comments_are_listed_oldest_first() {
    let app = TestApp::new();
    app.sync("u1", "ann").await;
    app.sync("u2", "bob").await;
    let post = app.create_post("u1", "hello").await;
    let uri = format!("/api/posts/{post}/comments");

    let first = app.post(&uri, json!({ "authorId": "u2", "content": "first" })).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["username"], "bob");
    app.post(&uri, json!({ "authorId": "u1", "content": "second" })).await;

    let list = app.get(&uri).await;
    assert_eq!(cache_control(&list), "max-age=5");
    assert_eq!(ids(&list.body, "text"), vec!["first", "second"]);

    let empty = app.post(&uri, json!({ "authorId": "u2", "content": "" })).await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn acting_on_own_content_never_notifies() {
    let app = TestApp::new();
    app.sync("u1", "ann").await;
    let post = app.create_post("u1", "me").await;

    app.post(&format!("/api/posts/{post}/like"), json!({ "userId": "u1" }))
        .await;
    app.post(
        &format!("/api/posts/{post}/comments"),
        json!({ "authorId": "u1", "content": "talking to myself" }),
    )
    .await;

    let notes = app.get("/api/notifications?userId=u1").await;
    assert_eq!(notes.body, json!([]));
}

// ---------------------------------------------------------------------------
// Conversations and messages
// ---------------------------------------------------------------------------

#[tokio::test]
async fn conversation_is_shared_regardless_of_argument_order() {
    let app = TestApp::new();
    app.sync("u1", "ann").await;
    app.sync("u2", "bob").await;

    let ab = app
        .post("/api/conversations", json!({ "userAId": "u2", "userBId": "u1" }))
        .await;
    let ba = app
        .post("/api/conversations", json!({ "userAId": "u1", "userBId": "u2" }))
        .await;
    assert_eq!(ab.body["id"], ba.body["id"]);
    assert_eq!(ab.body["user_a_id"], "u1");
    assert_eq!(ab.body["user_b_id"], "u2");

    let same = app
        .post("/api/conversations", json!({ "userAId": "u1", "userBId": "u1" }))
        .await;
    assert_eq!(same.status, StatusCode::BAD_REQUEST);
    assert_eq!(same.body["error"], "Invalid conversation request");

    let unknown = app
        .post("/api/conversations", json!({ "userAId": "u1", "userBId": "ghost" }))
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn outsiders_cannot_post_into_a_conversation() {
    let app = TestApp::new();
    app.sync("u1", "ann").await;
    app.sync("u2", "bob").await;
    app.sync("u3", "eve").await;
    let conv = app
        .post("/api/conversations", json!({ "userAId": "u1", "userBId": "u2" }))
        .await;
    let uri = format!("/api/conversations/{}/messages", conv.body["id"].as_str().unwrap());

    let reply = app.post(&uri, json!({ "senderId": "u3", "content": "hi" })).await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let empty = app.post(&uri, json!({ "senderId": "u1" })).await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);

    let missing = app
        .post("/api/conversations/nope/messages", json!({ "senderId": "u1", "content": "hi" }))
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/api/conversations/nope/messages").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn message_query_validation() {
    let app = TestApp::new();
    app.sync("u1", "ann").await;
    app.sync("u2", "bob").await;
    let conv = app
        .post("/api/conversations", json!({ "userAId": "u1", "userBId": "u2" }))
        .await;
    let base = format!("/api/conversations/{}/messages", conv.body["id"].as_str().unwrap());

    assert_eq!(app.get(&format!("{base}?limit=ten")).await.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        app.get(&format!("{base}?before=yesterday")).await.status,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(app.get(&base).await.body, json!([]));
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[tokio::test]
async fn notification_read_flow() {
    let app = TestApp::new();
    app.sync("u1", "ann").await;
    app.sync("u2", "bob").await;
    app.sync("u3", "cat").await;
    app.follow("u2", "u1").await;
    app.follow("u3", "u1").await;

    let count = app.get("/api/notifications/unread-count?userId=u1").await;
    assert_eq!(count.body, json!({ "count": 2 }));

    let notes = app.get("/api/notifications?userId=u1").await;
    let newest = notes.body[0]["id"].as_str().unwrap().to_string();
    assert_eq!(notes.body[0]["fromUserId"], "u3");
    assert_eq!(notes.body[0]["read"], false);

    let read = app
        .send(Method::POST, &format!("/api/notifications/{newest}/read"), None, None)
        .await;
    assert_eq!(read.body["success"], true);
    let count = app.get("/api/notifications/unread-count?userId=u1").await;
    assert_eq!(count.body["count"], 1);

    let all = app.post("/api/notifications/read-all", json!({ "userId": "u1" })).await;
    assert_eq!(all.body, json!({ "success": true, "updated": 1 }));
    let count = app.get("/api/notifications/unread-count?userId=u1").await;
    assert_eq!(count.body["count"], 0);

    let missing = app
        .send(Method::POST, "/api/notifications/nope/read", None, None)
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let no_user = app.get("/api/notifications").await;
    assert_eq!(no_user.status, StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Full user journeys
// ---------------------------------------------------------------------------

#[tokio::test]
async fn follow_post_like_shows_up_in_feed_and_notifications() {
    let app = TestApp::new();
    app.sync("u1", "ann").await;
    let post = app.create_post("u1", "hello").await;
    app.sync("u2", "bob").await;
    app.follow("u2", "u1").await;
    app.post(&format!("/api/posts/{post}/like"), json!({ "userId": "u2" }))
        .await;

    let feed = app.get("/api/feed?userId=u2").await;
    let items = feed.body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], post.as_str());
    assert_eq!(items[0]["caption"], "hello");
    assert_eq!(items[0]["username"], "ann");
    assert_eq!(items[0]["likes"], json!(["u2"]));
    assert_eq!(items[0]["comments"], json!([]));

    let notes = app.get("/api/notifications?userId=u1").await;
    let like = notes
        .body
        .as_array()
        .unwrap()
        .iter()
        .find(|n| n["type"] == "like")
        .expect("like notification");
    assert_eq!(like["fromUserId"], "u2");
    assert_eq!(like["fromUsername"], "bob");
    assert_eq!(like["postId"], post.as_str());
}

#[tokio::test]
async fn direct_messages_page_backwards() {
    let app = TestApp::new();
    app.sync("u1", "ann").await;
    app.sync("u2", "bob").await;
    let conv = app
        .post("/api/conversations", json!({ "userAId": "u1", "userBId": "u2" }))
        .await;
    let conv_id = conv.body["id"].as_str().unwrap().to_string();
    let uri = format!("/api/conversations/{conv_id}/messages");

    let hi = app.post(&uri, json!({ "senderId": "u1", "content": "hi" })).await;
    assert_eq!(hi.body["sender"]["username"], "ann");
    // Keep the two timestamps apart so the cursor splits them.
    tokio::time::sleep(Duration::from_millis(5)).await;
    let yo = app.post(&uri, json!({ "senderId": "u2", "content": "yo" })).await;
    let yo_at = yo.body["createdAt"].as_str().unwrap().to_string();

    let all = app.get(&uri).await;
    assert_eq!(ids(&all.body, "content"), vec!["hi", "yo"]);

    let latest = app.get(&format!("{uri}?limit=1")).await;
    assert_eq!(ids(&latest.body, "content"), vec!["yo"]);

    let older = app.get(&format!("{uri}?before={yo_at}")).await;
    assert_eq!(ids(&older.body, "content"), vec!["hi"]);

    let list = app.get("/api/conversations?userId=u1").await;
    assert_eq!(list.body[0]["id"], conv_id.as_str());
    assert_eq!(list.body[0]["otherUser"]["id"], "u2");
    assert_eq!(list.body[0]["lastMessage"]["content"], "yo");
}

// ---------------------------------------------------------------------------
// Transport behaviour
// ---------------------------------------------------------------------------

#[tokio::test]
async fn preflight_is_answered_for_any_path() {
    let app = TestApp::new();
    for uri in ["/api/feed", "/api/does/not/exist"] {
        let reply = app.send(Method::OPTIONS, uri, None, None).await;
        assert_eq!(reply.status, StatusCode::NO_CONTENT);
        assert_eq!(reply.body, Value::Null);
        assert_eq!(reply.headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(cache_control(&reply), "no-store");
    }
}

#[tokio::test]
async fn unknown_routes_and_methods_are_json_404s() {
    let app = TestApp::new();
    let unknown = app.get("/api/nothing-here").await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.body, json!({ "error": "Not found" }));
    assert_eq!(unknown.headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

    assert_eq!(
        unknown.headers[header::ACCESS_CONTROL_ALLOW_METHODS],
        "GET, POST, OPTIONS"
    );
    assert_eq!(
        unknown.headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
        "Content-Type, Authorization"
    );

    let wrong_method = app.get("/api/follow").await;
    assert_eq!(wrong_method.status, StatusCode::NOT_FOUND);
    assert_eq!(wrong_method.body, json!({ "error": "Not found" }));
}

#[tokio::test]
async fn malformed_json_is_a_json_400() {
    let app = TestApp::new();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/follow")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn mutations_are_not_cached() {
    let app = TestApp::new();
    app.sync("u1", "ann").await;
    let reply = app.post("/api/posts", json!({ "authorId": "u1", "caption": "x" })).await;
    assert_eq!(cache_control(&reply), "no-store");

    assert_eq!(reply.headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert!(reply.headers.contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));

    let health = app.get("/health").await;
    assert_eq!(health.body["status"], "ok");
    assert_eq!(cache_control(&health), "no-store");
}

// ---------------------------------------------------------------------------
// Caller identity
// ---------------------------------------------------------------------------

#[tokio::test]
async fn trusted_bearer_cannot_act_for_someone_else() {
    let app = TestApp::new();
    app.sync("u1", "ann").await;
    app.sync("u2", "bob").await;

    let reply = app
        .send(
            Method::POST,
            "/api/follow",
            Some("u2"),
            Some(json!({ "followerId": "u1", "followingId": "u2" })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let own = app
        .send(
            Method::POST,
            "/api/follow",
            Some("u1"),
            Some(json!({ "followerId": "u1", "followingId": "u2" })),
        )
        .await;
    assert_eq!(own.status, StatusCode::OK);
}

#[tokio::test]
async fn verified_mode_requires_signed_tokens() {
    use chrono::Utc;
    use ed25519_dalek::SigningKey;
    use rand::rngs::OsRng;
    use sociate_shared::identity::IdentityToken;

    let issuer = SigningKey::generate(&mut OsRng);
    let app = TestApp::with_identity(IdentityVerifier::new(
        Some(issuer.verifying_key().to_bytes()),
        true,
    ));
    let token = IdentityToken::issue("u1", Utc::now() + chrono::Duration::hours(1), &issuer).to_bearer();
    let sync_body = json!({ "id": "u1", "username": "ann", "name": "Ann", "email": "a@example.com" });

    let anonymous = app
        .send(Method::POST, "/api/users/sync", None, Some(sync_body.clone()))
        .await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let forged = app
        .send(Method::POST, "/api/users/sync", Some("u1"), Some(sync_body.clone()))
        .await;
    assert_eq!(forged.status, StatusCode::UNAUTHORIZED);

    let signed = app
        .send(Method::POST, "/api/users/sync", Some(&token), Some(sync_body))
        .await;
    assert_eq!(signed.status, StatusCode::OK);

    let other = app
        .send(Method::GET, "/api/notifications?userId=u2", Some(&token), None)
        .await;
    assert_eq!(other.status, StatusCode::FORBIDDEN);

    // Reads of public data stay open.
    assert_eq!(app.get("/api/users/u1").await.status, StatusCode::OK);
}

#[tokio::test]
async fn verified_mode_turns_away_anonymous_callers() {
    use ed25519_dalek::SigningKey;
    use rand::rngs::OsRng;

    let issuer = SigningKey::generate(&mut OsRng);
    let app = TestApp::with_identity(IdentityVerifier::new(
        Some(issuer.verifying_key().to_bytes()),
        false,
    ));

    let follow = app.follow("u1", "u2").await;
    assert_eq!(follow.status, StatusCode::UNAUTHORIZED);
    assert_eq!(follow.body["error"], "Authentication required");

    let notes = app.get("/api/notifications?userId=u1").await;
    assert_eq!(notes.status, StatusCode::UNAUTHORIZED);

    let post = app.post("/api/posts", json!({ "authorId": "u1", "caption": "x" })).await;
    assert_eq!(post.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn feed_is_capped_and_newest_first() {
    let app = TestApp::new();
    app.sync("u1", "ann").await;
    app.sync("u2", "bob").await;
    app.follow("u1", "u2").await;
    for i in 0..55 {
        let author = if i % 2 == 0 { "u1" } else { "u2" };
        app.create_post(author, &format!("post-{i}")).await;
    }

    for uri in ["/api/feed?userId=u1", "/api/feed"] {
        let feed = app.get(uri).await;
        let items = feed.body.as_array().unwrap();
        assert_eq!(items.len(), 50);
        assert_eq!(items[0]["caption"], "post-54");
        assert_eq!(items[49]["caption"], "post-5");

        let created = ids(&feed.body, "createdAt");
        assert!(created.windows(2).all(|w| w[0] >= w[1]));
    }
}
