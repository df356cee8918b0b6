//! v001 -- Initial schema creation.
//!
//! Creates the seven core tables: `users`, `posts`, `likes`, `comments`,
//! `follows`, `conversations` and `messages`.
//!
//! Timestamps are epoch milliseconds (`INTEGER`). Composite primary keys on
//! `likes` and `follows` make duplicate edges impossible regardless of what
//! the application checks beforehand.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Users
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS users (
    id              TEXT PRIMARY KEY NOT NULL,   -- issued by the identity provider
    username        TEXT NOT NULL,
    name            TEXT NOT NULL,
    email           TEXT NOT NULL,
    nickname        TEXT,
    dob             TEXT,
    address         TEXT,
    bio             TEXT,
    profile_picture TEXT,
    created_at      INTEGER NOT NULL             -- epoch ms
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_users_username ON users(username);

-- ----------------------------------------------------------------
-- Posts
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS posts (
    id         TEXT PRIMARY KEY NOT NULL,        -- UUID v4
    author_id  TEXT NOT NULL,                    -- FK -> users(id)
    caption    TEXT,
    media_url  TEXT,
    media_type TEXT,                             -- 'image' | 'video'
    created_at INTEGER NOT NULL,

    FOREIGN KEY (author_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_posts_author_ts ON posts(author_id, created_at DESC);
CREATE INDEX IF NOT EXISTS idx_posts_ts ON posts(created_at DESC);

-- ----------------------------------------------------------------
-- Likes
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS likes (
    user_id    TEXT NOT NULL,                    -- FK -> users(id)
    post_id    TEXT NOT NULL,                    -- FK -> posts(id)
    created_at INTEGER NOT NULL,

    PRIMARY KEY (user_id, post_id),
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (post_id) REFERENCES posts(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_likes_post ON likes(post_id);

-- ----------------------------------------------------------------
-- Comments
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS comments (
    id         TEXT PRIMARY KEY NOT NULL,        -- UUID v4
    post_id    TEXT NOT NULL,                    -- FK -> posts(id)
    author_id  TEXT NOT NULL,                    -- FK -> users(id)
    content    TEXT NOT NULL,
    created_at INTEGER NOT NULL,

    FOREIGN KEY (post_id) REFERENCES posts(id) ON DELETE CASCADE,
    FOREIGN KEY (author_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_comments_post_ts ON comments(post_id, created_at ASC);

-- ----------------------------------------------------------------
-- Follows (directed edges)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS follows (
    follower_id  TEXT NOT NULL,                  -- FK -> users(id)
    following_id TEXT NOT NULL,                  -- FK -> users(id)
    created_at   INTEGER NOT NULL,

    PRIMARY KEY (follower_id, following_id),
    CHECK (follower_id <> following_id),
    FOREIGN KEY (follower_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (following_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_follows_following ON follows(following_id);

-- ----------------------------------------------------------------
-- Conversations (one row per unordered pair, smaller id first)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS conversations (
    id         TEXT PRIMARY KEY NOT NULL,        -- UUID v4
    user_a_id  TEXT NOT NULL,                    -- FK -> users(id)
    user_b_id  TEXT NOT NULL,                    -- FK -> users(id)
    created_at INTEGER NOT NULL,

    CHECK (user_a_id < user_b_id),
    UNIQUE (user_a_id, user_b_id),
    FOREIGN KEY (user_a_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (user_b_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_conversations_user_b ON conversations(user_b_id);

-- ----------------------------------------------------------------
-- Messages
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS messages (
    id              TEXT PRIMARY KEY NOT NULL,   -- UUID v4
    conversation_id TEXT NOT NULL,               -- FK -> conversations(id)
    sender_id       TEXT NOT NULL,               -- FK -> users(id)
    content         TEXT,
    media_url       TEXT,
    media_type      TEXT,
    created_at      INTEGER NOT NULL,

    CHECK (content IS NOT NULL OR media_url IS NOT NULL),
    FOREIGN KEY (conversation_id) REFERENCES conversations(id) ON DELETE CASCADE,
    FOREIGN KEY (sender_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_messages_conversation_ts
    ON messages(conversation_id, created_at DESC);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
