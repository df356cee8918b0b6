//! Wire shapes.
//!
//! Bare rows (a synced user, a created conversation) keep their column
//! names; enriched objects built for the client use camelCase. Timestamps
//! are ISO-8601 with milliseconds.

use chrono::{DateTime, Utc};
use serde::Serialize;

use sociate_shared::time::serialize_wire;
use sociate_shared::{MediaKind, NotificationKind};
use sociate_store::{Comment, Conversation, Message, Notification, Post, User, UserCounts};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub name: String,
    pub email: String,
    pub nickname: Option<String>,
    pub dob: Option<String>,
    pub address: Option<String>,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    #[serde(serialize_with = "serialize_wire")]
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserRow {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
            email: user.email,
            nickname: user.nickname,
            dob: user.dob,
            address: user.address,
            bio: user.bio,
            profile_picture: user.profile_picture,
            created_at: user.created_at,
        }
    }
}

/// A user row plus counters computed at request time.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: UserRow,
    pub followers_count: u64,
    pub following_count: u64,
    pub posts_count: u64,
}

impl UserProfile {
    pub fn new(user: User, counts: UserCounts) -> Self {
        Self {
            user: user.into(),
            followers_count: counts.followers,
            following_count: counts.following,
            posts_count: counts.posts,
        }
    }
}

/// Public profile inlined into messages and conversations.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub name: String,
    pub profile_picture: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            name: user.name.clone(),
            profile_picture: user.profile_picture.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Posts and comments
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDto {
    pub id: String,
    pub user_id: String,
    /// Empty when the author row is gone.
    pub username: String,
    pub text: String,
    #[serde(serialize_with = "serialize_wire")]
    pub created_at: DateTime<Utc>,
}

impl CommentDto {
    pub fn new(comment: Comment, author: Option<&User>) -> Self {
        Self {
            id: comment.id,
            user_id: comment.author_id,
            username: author.map(|u| u.username.clone()).unwrap_or_default(),
            text: comment.content,
            created_at: comment.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDto {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub user_avatar: String,
    pub caption: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaKind>,
    /// Ids of the users who liked the post, in like order.
    pub likes: Vec<String>,
    pub comments: Vec<CommentDto>,
    #[serde(serialize_with = "serialize_wire")]
    pub created_at: DateTime<Utc>,
    /// Posts are always public.
    pub visibility: &'static str,
    pub saved_by: Vec<String>,
}

impl PostDto {
    pub fn new(
        post: Post,
        author: Option<&User>,
        likes: Vec<String>,
        comments: Vec<CommentDto>,
    ) -> Self {
        Self {
            id: post.id,
            user_id: post.author_id,
            username: author.map(|u| u.username.clone()).unwrap_or_default(),
            user_avatar: author
                .and_then(|u| u.profile_picture.clone())
                .unwrap_or_default(),
            caption: post.caption.unwrap_or_default(),
            media_url: post.media_url,
            media_type: post.media_kind,
            likes,
            comments,
            created_at: post.created_at,
            visibility: "public",
            saved_by: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Conversations and messages
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ConversationRow {
    pub id: String,
    pub user_a_id: String,
    pub user_b_id: String,
    #[serde(serialize_with = "serialize_wire")]
    pub created_at: DateTime<Utc>,
}

impl From<Conversation> for ConversationRow {
    fn from(c: Conversation) -> Self {
        Self {
            id: c.id,
            user_a_id: c.user_a_id,
            user_b_id: c.user_b_id,
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastMessage {
    pub id: String,
    pub content: Option<String>,
    #[serde(serialize_with = "serialize_wire")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDto {
    pub id: String,
    pub user_a_id: String,
    pub user_b_id: String,
    #[serde(serialize_with = "serialize_wire")]
    pub created_at: DateTime<Utc>,
    pub other_user: Option<UserSummary>,
    pub last_message: Option<LastMessage>,
}

impl ConversationDto {
    pub fn new(c: Conversation, other: Option<&User>, last: Option<Message>) -> Self {
        Self {
            id: c.id,
            user_a_id: c.user_a_id,
            user_b_id: c.user_b_id,
            created_at: c.created_at,
            other_user: other.map(UserSummary::from),
            last_message: last.map(|m| LastMessage {
                id: m.id,
                content: m.content,
                created_at: m.created_at,
            }),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaKind>,
    #[serde(serialize_with = "serialize_wire")]
    pub created_at: DateTime<Utc>,
    pub sender: Option<UserSummary>,
}

impl MessageDto {
    pub fn new(m: Message, sender: Option<&User>) -> Self {
        Self {
            id: m.id,
            conversation_id: m.conversation_id,
            sender_id: m.sender_id,
            content: m.content,
            media_url: m.media_url,
            media_type: m.media_kind,
            created_at: m.created_at,
            sender: sender.map(UserSummary::from),
        }
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDto {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub from_user_id: String,
    pub from_username: String,
    pub from_user_avatar: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<String>,
    pub read: bool,
    #[serde(serialize_with = "serialize_wire")]
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationDto {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            user_id: n.receiver_id,
            kind: n.kind,
            from_user_id: n.actor_id,
            from_username: n.actor_username,
            from_user_avatar: n.actor_avatar,
            post_id: n.post_id,
            comment_id: n.comment_id,
            read: n.read,
            created_at: n.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Small envelopes
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn with_message(message: &'static str) -> Self {
        Self {
            success: true,
            message: Some(message),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReadAllResponse {
    pub success: bool,
    pub updated: usize,
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
