//! v002 -- Notifications.
//!
//! Actor username and avatar are snapshots taken when the notification is
//! generated; they are not kept in sync with later profile edits.

use rusqlite::Connection;

const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS notifications (
    id             TEXT PRIMARY KEY NOT NULL,    -- UUID v4
    receiver_id    TEXT NOT NULL,                -- FK -> users(id)
    kind           TEXT NOT NULL,                -- 'like' | 'comment' | 'follow'
    actor_id       TEXT NOT NULL,
    actor_username TEXT NOT NULL,
    actor_avatar   TEXT NOT NULL DEFAULT '',
    post_id        TEXT,
    comment_id     TEXT,
    read           INTEGER NOT NULL DEFAULT 0,   -- boolean 0/1
    created_at     INTEGER NOT NULL,

    FOREIGN KEY (receiver_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_notifications_receiver_ts
    ON notifications(receiver_id, created_at DESC);
"#;

pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
