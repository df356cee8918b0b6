//! Domain model structs persisted in the SQLite database.
//!
//! These are normalized rows. The HTTP layer owns the enriched wire shapes;
//! nothing here knows about JSON field names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sociate_shared::{MediaKind, NotificationKind};

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A registered user. The id is issued by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    /// Unique, mutable handle.
    pub username: String,
    /// Display name.
    pub name: String,
    pub email: String,
    pub nickname: Option<String>,
    /// Date of birth as entered by the user (`YYYY-MM-DD`).
    pub dob: Option<String>,
    pub address: Option<String>,
    pub bio: Option<String>,
    /// URL or opaque blob reference of the avatar.
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input of a user sync: everything but `created_at`, which the store owns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserSync {
    pub id: String,
    pub username: String,
    pub name: String,
    pub email: String,
    pub nickname: Option<String>,
    pub dob: Option<String>,
    pub address: Option<String>,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
}

/// Derived counters shown on a profile.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserCounts {
    pub followers: u64,
    pub following: u64,
    pub posts: u64,
}

// ---------------------------------------------------------------------------
// Post
// ---------------------------------------------------------------------------

/// A post. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    pub id: String,
    pub author_id: String,
    pub caption: Option<String>,
    pub media_url: Option<String>,
    pub media_kind: Option<MediaKind>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Comment
// ---------------------------------------------------------------------------

/// A comment on a post. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    pub author_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

/// A direct conversation between two users, participants in canonical order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Conversation {
    pub id: String,
    pub user_a_id: String,
    pub user_b_id: String,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn has_participant(&self, user_id: &str) -> bool {
        self.user_a_id == user_id || self.user_b_id == user_id
    }

    /// The participant that is not `user_id`. Falls back to `user_a_id` when
    /// `user_id` is not a participant at all.
    pub fn other_participant(&self, user_id: &str) -> &str {
        if self.user_a_id == user_id {
            &self.user_b_id
        } else {
            &self.user_a_id
        }
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A single direct message. At least one of `content` / `media_url` is set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub content: Option<String>,
    pub media_url: Option<String>,
    pub media_kind: Option<MediaKind>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Notification
// ---------------------------------------------------------------------------

/// A notification delivered to `receiver_id` because `actor_id` liked,
/// commented on, or followed something of theirs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    pub id: String,
    pub receiver_id: String,
    pub kind: NotificationKind,
    pub actor_id: String,
    /// Snapshot of the actor's username when the notification was created.
    pub actor_username: String,
    /// Snapshot of the actor's avatar, empty when they had none.
    pub actor_avatar: String,
    pub post_id: Option<String>,
    pub comment_id: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Mutation outcomes
// ---------------------------------------------------------------------------

/// Result of an idempotent edge insert (follow, like).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeOutcome {
    Created,
    AlreadyExisted,
}

